use std::sync::Arc;

use crate::models::{
    Friend, Friendship, IncomingRequest, Message, NewTask, OutgoingRequest, SharedTaskView, Task,
    User, UserInfo,
};

use super::error::ServiceError;

/// Shared handle to the storage backend, managed by Rocket and handed to
/// every request handler.
pub type DynStore = Arc<dyn Store>;

/// Storage access used by the service layer.
///
/// Inputs are already validated by the caller. Implementations enforce the
/// relational rules (uniqueness, ownership, friendship) and report a miss as
/// [`ServiceError::NotFound`]. Every method that writes more than one row is
/// all-or-nothing.
pub trait Store: Send + Sync {
    // users
    fn create_user(&self, username: &str, password_hash: &str) -> Result<UserInfo, ServiceError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    /// Substring search on usernames, ordered by username. Case is compared
    /// with Unicode lowercasing, so `élo` finds `Élodie`.
    fn search_users(
        &self,
        query: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<Vec<UserInfo>, ServiceError>;

    // tasks
    fn list_tasks(&self, user_id: i32) -> Result<Vec<Task>, ServiceError>;
    fn create_task(&self, task: &NewTask) -> Result<i32, ServiceError>;
    /// Updates the flag when `user_id` owns the task or holds a share grant on it.
    fn set_task_completion(
        &self,
        task_id: i32,
        user_id: i32,
        completed: bool,
    ) -> Result<Task, ServiceError>;
    fn delete_task(&self, task_id: i32, owner_id: i32) -> Result<(), ServiceError>;
    /// Grants `recipients` access to the task. Fails without writing anything
    /// if one of them is not an accepted friend of the owner.
    fn share_task(
        &self,
        task_id: i32,
        owner_id: i32,
        recipients: &[i32],
    ) -> Result<usize, ServiceError>;
    fn list_shared_tasks(&self, user_id: i32) -> Result<Vec<SharedTaskView>, ServiceError>;
    /// Removes the task itself, and with it every grant on it.
    fn delete_shared_task(&self, task_id: i32) -> Result<(), ServiceError>;

    // friendships
    fn create_friend_request(&self, from_user_id: i32, to_user_id: i32)
        -> Result<Friendship, ServiceError>;
    fn accept_friend_request(
        &self,
        request_id: i32,
        responding_user_id: i32,
    ) -> Result<Friendship, ServiceError>;
    fn decline_friend_request(&self, request_id: i32) -> Result<(), ServiceError>;
    fn list_incoming_requests(&self, user_id: i32) -> Result<Vec<IncomingRequest>, ServiceError>;
    fn list_outgoing_requests(&self, user_id: i32) -> Result<Vec<OutgoingRequest>, ServiceError>;
    fn list_friends(&self, user_id: i32) -> Result<Vec<Friend>, ServiceError>;
    fn remove_friend(&self, user_id: i32, friend_id: i32) -> Result<(), ServiceError>;

    // messages
    fn create_message(
        &self,
        sender_id: i32,
        receiver_id: i32,
        text: &str,
    ) -> Result<Message, ServiceError>;
    fn list_conversation(&self, user_id: i32, friend_id: i32) -> Result<Vec<Message>, ServiceError>;
    fn mark_read(&self, user_id: i32, friend_id: i32) -> Result<usize, ServiceError>;
}

// Messages shared by both backends so callers see the same text
pub(crate) const USERNAME_TAKEN: &str = "Username already exists";
pub(crate) const TASK_NOT_FOUND: &str = "Task not found";
pub(crate) const NON_FRIEND_SHARE: &str = "Cannot share with non-friends";
pub(crate) const ALREADY_SHARED: &str = "Task is already shared with one of the selected friends";
pub(crate) const ALREADY_FRIENDS: &str = "You are already friends with this user";
pub(crate) const REQUEST_EXISTS: &str = "A friend request already exists between you and this user";
pub(crate) const REQUEST_NOT_FOUND: &str = "Friend request not found";
pub(crate) const FRIENDSHIP_NOT_FOUND: &str = "Friendship not found";
