use crate::models::{
    Friend, FriendRequestBody, Friendship, IncomingRequest, OutgoingRequest, RespondRequest,
    UserInfo,
};

use super::error::ServiceError;
use super::store::Store;
use super::{required, required_text};

pub fn search_users(
    store: &dyn Store,
    query: &str,
    current_user_id: Option<i32>,
) -> Result<Vec<UserInfo>, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::bad_request("Search query is required"));
    }
    store.search_users(query, current_user_id)
}

pub fn send_request(store: &dyn Store, body: FriendRequestBody) -> Result<Friendship, ServiceError> {
    let from_user_id = required(body.from_user_id, "fromUserId")?;
    let to_username = required_text(body.to_username, "toUsername")?;

    let recipient = store
        .find_user_by_username(&to_username)?
        .ok_or_else(|| ServiceError::bad_request("User not found"))?;
    if recipient.id == from_user_id {
        return Err(ServiceError::bad_request(
            "You cannot send a friend request to yourself",
        ));
    }

    let request = store.create_friend_request(from_user_id, recipient.id)?;
    log::debug!(
        "friend request {} from user {} to user {}",
        request.id,
        from_user_id,
        recipient.id
    );
    Ok(request)
}

pub fn accept_request(
    store: &dyn Store,
    request_id: i32,
    body: RespondRequest,
) -> Result<Friendship, ServiceError> {
    let user_id = required(body.user_id, "userId")?;
    store.accept_friend_request(request_id, user_id)
}

pub fn decline_request(store: &dyn Store, request_id: i32) -> Result<(), ServiceError> {
    store.decline_friend_request(request_id)
}

pub fn incoming_requests(store: &dyn Store, user_id: i32) -> Result<Vec<IncomingRequest>, ServiceError> {
    store.list_incoming_requests(user_id)
}

pub fn outgoing_requests(store: &dyn Store, user_id: i32) -> Result<Vec<OutgoingRequest>, ServiceError> {
    store.list_outgoing_requests(user_id)
}

pub fn list_friends(store: &dyn Store, user_id: i32) -> Result<Vec<Friend>, ServiceError> {
    store.list_friends(user_id)
}

/// Share grants between the two users outlive the friendship.
pub fn remove_friend(store: &dyn Store, user_id: i32, friend_id: i32) -> Result<(), ServiceError> {
    store.remove_friend(user_id, friend_id)?;
    log::info!("user {} removed friend {}", user_id, friend_id);
    Ok(())
}
