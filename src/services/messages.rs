use crate::models::{MarkReadRequest, Message, SendMessageRequest};

use super::error::ServiceError;
use super::store::Store;
use super::{required, required_text};

pub fn send_message(
    store: &dyn Store,
    max_length: usize,
    send_req: SendMessageRequest,
) -> Result<Message, ServiceError> {
    let sender_id = required(send_req.sender_id, "sender_id")?;
    let receiver_id = required(send_req.receiver_id, "receiver_id")?;
    let text = required_text(send_req.message, "message")?;
    if text.chars().count() > max_length {
        return Err(ServiceError::BadRequest(format!(
            "Message must be at most {} characters",
            max_length
        )));
    }
    store.create_message(sender_id, receiver_id, &text)
}

pub fn conversation(store: &dyn Store, user_id: i32, friend_id: i32) -> Result<Vec<Message>, ServiceError> {
    store.list_conversation(user_id, friend_id)
}

/// Marks what `friendId` sent to `userId` as read. Returns how many changed.
pub fn mark_read(store: &dyn Store, read_req: MarkReadRequest) -> Result<usize, ServiceError> {
    let user_id = required(read_req.user_id, "userId")?;
    let friend_id = required(read_req.friend_id, "friendId")?;
    store.mark_read(user_id, friend_id)
}
