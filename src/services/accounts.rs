use bcrypt::{hash, verify};

use crate::models::{AuthRequest, UserInfo};

use super::error::ServiceError;
use super::store::Store;
use super::{required, required_text};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 4;

pub fn register_user(
    store: &dyn Store,
    hash_cost: u32,
    auth_req: AuthRequest,
) -> Result<UserInfo, ServiceError> {
    let username = required_text(auth_req.username, "username")?;
    let password = required(auth_req.password, "password")?;

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ServiceError::BadRequest(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash(&password, hash_cost)?;
    let user = store.create_user(&username, &password_hash)?;
    log::info!("registered user {} ({})", user.username, user.id);
    Ok(user)
}

pub fn login_user(store: &dyn Store, auth_req: AuthRequest) -> Result<UserInfo, ServiceError> {
    let username = required_text(auth_req.username, "username")?;
    let password = required(auth_req.password, "password")?;

    // Unknown user and wrong password look the same to the caller
    let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());
    let user = store.find_user_by_username(&username)?.ok_or_else(invalid)?;
    if !verify(&password, &user.password_hash)? {
        return Err(invalid());
    }
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    const TEST_COST: u32 = 4;

    fn auth(username: &str, password: &str) -> AuthRequest {
        AuthRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn register_then_login() {
        let store = MemoryStore::new();
        let user = register_user(&store, TEST_COST, auth("alice", "secret")).unwrap();
        assert_eq!(user.username, "alice");

        let logged_in = login_user(&store, auth("alice", "secret")).unwrap();
        assert_eq!(logged_in, user);
    }

    #[test]
    fn duplicate_username_is_a_conflict_and_keeps_first_user() {
        let store = MemoryStore::new();
        register_user(&store, TEST_COST, auth("alice", "secret")).unwrap();

        let err = register_user(&store, TEST_COST, auth("alice", "other")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(login_user(&store, auth("alice", "secret")).is_ok());
    }

    #[test]
    fn short_credentials_are_rejected() {
        let store = MemoryStore::new();
        let err = register_user(&store, TEST_COST, auth("al", "secret")).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        let err = register_user(&store, TEST_COST, auth("alice", "abc")).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        let err = register_user(&store, TEST_COST, AuthRequest::default()).unwrap_err();
        assert_eq!(err, ServiceError::BadRequest("username is required".to_string()));
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let store = MemoryStore::new();
        register_user(&store, TEST_COST, auth("alice", "secret")).unwrap();

        let wrong_password = login_user(&store, auth("alice", "nope!")).unwrap_err();
        assert!(matches!(wrong_password, ServiceError::Unauthorized(_)));
        let unknown = login_user(&store, auth("nobody", "secret")).unwrap_err();
        assert!(matches!(unknown, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let store = MemoryStore::new();
        register_user(&store, TEST_COST, auth("alice", "secret")).unwrap();
        let stored = store.find_user_by_username("alice").unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret");
    }
}
