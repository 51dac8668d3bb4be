// taskmasters_backend/src/models.rs
use crate::schema::{friendships, messages, shared_tasks, tasks, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::FromForm;
use rocket::FromFormField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Queryable, Identifiable, Selectable, Debug, PartialEq, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: NaiveDateTime,
}

// Public view of a user, the password hash never leaves the store
#[derive(Queryable, Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Sort rank, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(format!(
                "Invalid priority '{}', expected one of High, Medium, Low",
                other
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Queryable, Identifiable, Selectable, Associations, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[diesel(belongs_to(User))]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub date: String,
    pub time: Option<String>,
    pub priority: String,
    pub workload: Option<String>,
    pub completed: bool,
}

impl Task {
    pub fn priority(&self) -> Option<Priority> {
        self.priority.parse().ok()
    }
}

// A validated task ready to be stored
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub user_id: i32,
    pub name: String,
    pub date: String,
    pub time: Option<String>,
    pub priority: String,
    pub workload: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: i32,
    pub user1_id: i32,
    pub user2_id: i32,
    pub status: String,
    pub action_user_id: i32,
    pub created_at: NaiveDateTime,
}

impl Friendship {
    pub fn is_accepted(&self) -> bool {
        self.status == FriendshipStatus::Accepted.as_str()
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendshipStatus::Pending.as_str()
    }

    /// True when the row links `a` and `b`, whichever side requested.
    pub fn connects(&self, a: i32, b: i32) -> bool {
        (self.user1_id == a && self.user2_id == b) || (self.user1_id == b && self.user2_id == a)
    }
}

#[derive(Insertable)]
#[diesel(table_name = friendships)]
pub struct NewFriendship<'a> {
    pub user1_id: i32,
    pub user2_id: i32,
    pub status: &'a str,
    pub action_user_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Selectable, Associations, Debug, PartialEq, Clone)]
#[diesel(belongs_to(Task))]
#[diesel(table_name = shared_tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SharedTask {
    pub id: i32,
    pub task_id: i32,
    pub owner_id: i32,
    pub shared_with_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = shared_tasks)]
pub struct NewSharedTask {
    pub task_id: i32,
    pub owner_id: i32,
    pub shared_with_id: i32,
    pub created_at: NaiveDateTime,
}

// A task as seen by a user it was shared with
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SharedTaskView {
    #[serde(flatten)]
    pub task: Task,
    pub owner_username: String,
    pub shared_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Message {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub is_read: bool,
}

#[derive(Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage<'a> {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub message: &'a str,
    pub timestamp: NaiveDateTime,
    pub is_read: bool,
}

#[derive(Queryable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    pub id: i32,
    pub from_user_id: i32,
    pub from_username: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRequest {
    pub id: i32,
    pub to_user_id: i32,
    pub to_username: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: i32,
    pub username: String,
    pub friends_since: NaiveDateTime,
}

// --- Request bodies ---
// Fields are optional so that a missing field is reported as a validation
// error instead of a body parse failure.

#[derive(Deserialize, Debug, Default)]
pub struct AuthRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateTaskRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub priority: Option<String>,
    pub workload: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateTaskRequest {
    pub id: Option<i32>,
    pub completed: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShareTaskRequest {
    pub task_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub shared_with_ids: Option<Vec<i32>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub from_user_id: Option<i32>,
    pub to_username: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub user_id: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SendMessageRequest {
    pub sender_id: Option<i32>,
    pub receiver_id: Option<i32>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub user_id: Option<i32>,
    pub friend_id: Option<i32>,
}

// --- Responses ---

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedResponse {
    pub id: i32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        ActionResponse {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ShareResponse {
    pub success: bool,
    pub shared: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: usize,
}

// --- Query strings ---

#[derive(FromFormField, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusFilter {
    All,
    Completed,
    Pending,
    Overdue,
}

#[derive(FromFormField, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    Date,
    Priority,
    Name,
}

#[derive(FromForm, Debug, Default, Clone)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub status: Option<TaskStatusFilter>,
    pub sort: Option<TaskSort>,
}

#[derive(FromForm, Debug, Default)]
pub struct UserSearchQuery {
    #[field(name = "currentUserId")]
    pub current_user_id: Option<i32>,
}

#[derive(FromForm, Debug, Default)]
pub struct OwnerQuery {
    #[field(name = "userId")]
    pub user_id: Option<i32>,
}
