use diesel::result::{DatabaseErrorKind, Error as DbError};
use rocket::serde::json::Json;
use thiserror::Error;

use crate::{ApiError, ErrorDetail};

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ServiceError::BadRequest(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        ServiceError::NotFound(detail.into())
    }
}

impl From<DbError> for ServiceError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound => ServiceError::NotFound("Record not found".to_string()),
            DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ServiceError::Conflict(info.message().to_string())
            }
            DbError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                ServiceError::BadRequest("Referenced user or task does not exist".to_string())
            }
            other => ServiceError::InternalError(format!("Database error: {}", other)),
        }
    }
}

impl From<diesel::r2d2::PoolError> for ServiceError {
    fn from(error: diesel::r2d2::PoolError) -> Self {
        ServiceError::InternalError(format!("DB Connection error: {}", error))
    }
}

impl From<bcrypt::BcryptError> for ServiceError {
    fn from(error: bcrypt::BcryptError) -> Self {
        ServiceError::InternalError(format!("Password hashing failed: {}", error))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            // Duplicates are reported as plain validation failures
            ServiceError::BadRequest(detail) | ServiceError::Conflict(detail) => {
                ApiError::BadRequest(Json(ErrorDetail::new(detail)))
            }
            ServiceError::NotFound(detail) => ApiError::NotFound(Json(ErrorDetail::new(detail))),
            ServiceError::Unauthorized(detail) => {
                ApiError::Unauthorized(Json(ErrorDetail::new(detail)))
            }
            ServiceError::InternalError(detail) => {
                log::error!("internal error: {}", detail);
                ApiError::InternalError(Json(ErrorDetail::with_details(
                    "Internal server error",
                    detail,
                )))
            }
        }
    }
}
