use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, routes, Request, Responder};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod cors;
pub mod db;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use config::AppConfig;
use cors::Cors;
use services::DynStore;

// Serializable error body shared by every failing response
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ErrorDetail {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorDetail {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        ErrorDetail {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Responder, Debug)]
pub enum ApiError {
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<ErrorDetail>),
    #[response(status = 401, content_type = "json")]
    Unauthorized(Json<ErrorDetail>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<ErrorDetail>),
    #[response(status = 500, content_type = "json")]
    InternalError(Json<ErrorDetail>),
}

#[catch(404)]
fn not_found_catcher(req: &Request<'_>) -> Json<ErrorDetail> {
    Json(ErrorDetail::with_details(
        "Not found",
        format!("No route for {} {}", req.method(), req.uri()),
    ))
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> Json<ErrorDetail> {
    Json(ErrorDetail::new(
        status.reason().unwrap_or("Request failed").to_string(),
    ))
}

/// Builds the application around an already opened store. Used by the server
/// binary and by the integration tests.
pub fn rocket_instance(store: DynStore, config: AppConfig) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.host))
        .merge(("port", config.port));
    let cors = Cors::new(config.allowed_origins.clone());

    rocket::custom(figment)
        .manage(store)
        .manage(config)
        .attach(cors)
        .attach(AdHoc::on_liftoff("Startup banner", |rocket| {
            Box::pin(async move {
                let config = rocket.config();
                log::info!("TaskMasters API listening on {}:{}", config.address, config.port);
            })
        }))
        .mount("/", routes::auth_routes())
        .mount("/", routes![cors::preflight])
        .mount("/tasks", routes::task_routes())
        .mount("/users", routes::user_routes())
        .mount("/friends", routes::friend_routes())
        .mount("/messages", routes::message_routes())
        .register("/", catchers![not_found_catcher, default_catcher])
}
