use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};
use dashmap::DashMap;

use crate::models::{
    Friend, Friendship, FriendshipStatus, IncomingRequest, Message, NewTask, OutgoingRequest,
    SharedTask, SharedTaskView, Task, User, UserInfo,
};

use super::error::ServiceError;
use super::store::{
    Store, ALREADY_FRIENDS, ALREADY_SHARED, FRIENDSHIP_NOT_FOUND, NON_FRIEND_SHARE,
    REQUEST_EXISTS, REQUEST_NOT_FOUND, TASK_NOT_FOUND, USERNAME_TAKEN,
};

#[derive(Default)]
struct Sequence(AtomicI32);

impl Sequence {
    fn next(&self) -> i32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// In-process [`Store`] with the same observable rules as the SQLite one.
/// Ids start at 1 per table, like `AUTOINCREMENT`.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i32, User>,
    tasks: DashMap<i32, Task>,
    friendships: DashMap<i32, Friendship>,
    shared_tasks: DashMap<i32, SharedTask>,
    messages: DashMap<i32, Message>,
    user_ids: Sequence,
    task_ids: Sequence,
    friendship_ids: Sequence,
    share_ids: Sequence,
    message_ids: Sequence,
    // Held by every operation that checks state before writing it
    writes: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.writes
            .lock()
            .map_err(|_| ServiceError::InternalError("Memory store lock poisoned".to_string()))
    }

    fn friendship_between(&self, a: i32, b: i32) -> Option<Friendship> {
        self.friendships
            .iter()
            .find(|entry| entry.value().connects(a, b))
            .map(|entry| entry.value().clone())
    }

    fn username_of(&self, user_id: i32) -> Option<String> {
        self.users.get(&user_id).map(|user| user.username.clone())
    }

    fn user_exists(&self, user_id: i32) -> bool {
        self.users.contains_key(&user_id)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn missing_reference() -> ServiceError {
    ServiceError::bad_request("Referenced user or task does not exist")
}

impl Store for MemoryStore {
    fn create_user(&self, username: &str, password_hash: &str) -> Result<UserInfo, ServiceError> {
        let _guard = self.write_guard()?;
        if self.users.iter().any(|entry| entry.value().username == username) {
            return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let user = User {
            id: self.user_ids.next(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user.into())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
            .map(|entry| entry.value().clone()))
    }

    fn search_users(
        &self,
        query: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<Vec<UserInfo>, ServiceError> {
        let needle = query.to_lowercase();
        let mut found: Vec<UserInfo> = self
            .users
            .iter()
            .filter(|entry| Some(entry.value().id) != exclude_user_id)
            .filter(|entry| entry.value().username.to_lowercase().contains(&needle))
            .map(|entry| entry.value().clone().into())
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(found)
    }

    fn list_tasks(&self, user_id: i32) -> Result<Vec<Task>, ServiceError> {
        let mut items: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|task| task.id);
        Ok(items)
    }

    fn create_task(&self, task: &NewTask) -> Result<i32, ServiceError> {
        if !self.user_exists(task.user_id) {
            return Err(missing_reference());
        }
        let id = self.task_ids.next();
        self.tasks.insert(
            id,
            Task {
                id,
                user_id: task.user_id,
                name: task.name.clone(),
                date: task.date.clone(),
                time: task.time.clone(),
                priority: task.priority.clone(),
                workload: task.workload.clone(),
                completed: task.completed,
            },
        );
        Ok(id)
    }

    fn set_task_completion(
        &self,
        task_id: i32,
        user_id: i32,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        let _guard = self.write_guard()?;
        let granted = self.shared_tasks.iter().any(|entry| {
            entry.value().task_id == task_id && entry.value().shared_with_id == user_id
        });

        let mut task = self
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| ServiceError::not_found(TASK_NOT_FOUND))?;
        if task.user_id != user_id && !granted {
            return Err(ServiceError::not_found(TASK_NOT_FOUND));
        }
        task.completed = completed;
        Ok(task.clone())
    }

    fn delete_task(&self, task_id: i32, owner_id: i32) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        match self
            .tasks
            .remove_if(&task_id, |_, task| task.user_id == owner_id)
        {
            Some(_) => {
                self.shared_tasks.retain(|_, share| share.task_id != task_id);
                Ok(())
            }
            None => Err(ServiceError::not_found(TASK_NOT_FOUND)),
        }
    }

    fn share_task(
        &self,
        task_id: i32,
        owner_id: i32,
        recipients: &[i32],
    ) -> Result<usize, ServiceError> {
        let _guard = self.write_guard()?;
        let owned = self
            .tasks
            .get(&task_id)
            .map(|task| task.user_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return Err(ServiceError::not_found(TASK_NOT_FOUND));
        }

        let wanted: HashSet<i32> = recipients.iter().copied().collect();
        let friends = self
            .friendships
            .iter()
            .filter(|entry| entry.value().is_accepted())
            .filter(|entry| {
                let row = entry.value();
                (row.user1_id == owner_id && wanted.contains(&row.user2_id))
                    || (row.user2_id == owner_id && wanted.contains(&row.user1_id))
            })
            .count();
        if friends < recipients.len() {
            return Err(ServiceError::bad_request(NON_FRIEND_SHARE));
        }

        // Validate every grant before inserting any of them
        let duplicate = self.shared_tasks.iter().any(|entry| {
            entry.value().task_id == task_id && wanted.contains(&entry.value().shared_with_id)
        });
        if duplicate || wanted.len() < recipients.len() {
            return Err(ServiceError::Conflict(ALREADY_SHARED.to_string()));
        }

        let created_at = now();
        for &shared_with_id in recipients {
            let id = self.share_ids.next();
            self.shared_tasks.insert(
                id,
                SharedTask {
                    id,
                    task_id,
                    owner_id,
                    shared_with_id,
                    created_at,
                },
            );
        }
        Ok(recipients.len())
    }

    fn list_shared_tasks(&self, user_id: i32) -> Result<Vec<SharedTaskView>, ServiceError> {
        let mut grants: Vec<SharedTask> = self
            .shared_tasks
            .iter()
            .filter(|entry| entry.value().shared_with_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        grants.sort_by_key(|grant| grant.id);

        Ok(grants
            .into_iter()
            .filter_map(|grant| {
                let task = self.tasks.get(&grant.task_id)?.clone();
                let owner_username = self.username_of(grant.owner_id)?;
                Some(SharedTaskView {
                    task,
                    owner_username,
                    shared_at: grant.created_at,
                })
            })
            .collect())
    }

    fn delete_shared_task(&self, task_id: i32) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        match self.tasks.remove(&task_id) {
            Some(_) => {
                self.shared_tasks.retain(|_, share| share.task_id != task_id);
                Ok(())
            }
            None => Err(ServiceError::not_found(TASK_NOT_FOUND)),
        }
    }

    fn create_friend_request(
        &self,
        from_user_id: i32,
        to_user_id: i32,
    ) -> Result<Friendship, ServiceError> {
        let _guard = self.write_guard()?;
        if !self.user_exists(from_user_id) || !self.user_exists(to_user_id) {
            return Err(missing_reference());
        }
        if let Some(existing) = self.friendship_between(from_user_id, to_user_id) {
            let detail = if existing.is_accepted() {
                ALREADY_FRIENDS
            } else {
                REQUEST_EXISTS
            };
            return Err(ServiceError::Conflict(detail.to_string()));
        }

        let request = Friendship {
            id: self.friendship_ids.next(),
            user1_id: from_user_id,
            user2_id: to_user_id,
            status: FriendshipStatus::Pending.as_str().to_string(),
            action_user_id: from_user_id,
            created_at: now(),
        };
        self.friendships.insert(request.id, request.clone());
        Ok(request)
    }

    fn accept_friend_request(
        &self,
        request_id: i32,
        responding_user_id: i32,
    ) -> Result<Friendship, ServiceError> {
        let _guard = self.write_guard()?;
        let mut request = self
            .friendships
            .get_mut(&request_id)
            .filter(|row| row.is_pending() && row.user2_id == responding_user_id)
            .ok_or_else(|| ServiceError::not_found(REQUEST_NOT_FOUND))?;
        request.status = FriendshipStatus::Accepted.as_str().to_string();
        request.action_user_id = responding_user_id;
        Ok(request.clone())
    }

    fn decline_friend_request(&self, request_id: i32) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        self.friendships
            .remove_if(&request_id, |_, row| row.is_pending())
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(REQUEST_NOT_FOUND))
    }

    fn list_incoming_requests(&self, user_id: i32) -> Result<Vec<IncomingRequest>, ServiceError> {
        let mut requests: Vec<IncomingRequest> = self
            .friendships
            .iter()
            .filter(|entry| entry.value().is_pending() && entry.value().user2_id == user_id)
            .filter_map(|entry| {
                let row = entry.value();
                Some(IncomingRequest {
                    id: row.id,
                    from_user_id: row.user1_id,
                    from_username: self.username_of(row.user1_id)?,
                    created_at: row.created_at,
                })
            })
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    fn list_outgoing_requests(&self, user_id: i32) -> Result<Vec<OutgoingRequest>, ServiceError> {
        let mut requests: Vec<OutgoingRequest> = self
            .friendships
            .iter()
            .filter(|entry| entry.value().is_pending() && entry.value().user1_id == user_id)
            .filter_map(|entry| {
                let row = entry.value();
                Some(OutgoingRequest {
                    id: row.id,
                    to_user_id: row.user2_id,
                    to_username: self.username_of(row.user2_id)?,
                    created_at: row.created_at,
                })
            })
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    fn list_friends(&self, user_id: i32) -> Result<Vec<Friend>, ServiceError> {
        let mut friends: Vec<Friend> = self
            .friendships
            .iter()
            .filter(|entry| entry.value().is_accepted())
            .filter_map(|entry| {
                let row = entry.value();
                let other = if row.user1_id == user_id {
                    row.user2_id
                } else if row.user2_id == user_id {
                    row.user1_id
                } else {
                    return None;
                };
                Some(Friend {
                    id: other,
                    username: self.username_of(other)?,
                    friends_since: row.created_at,
                })
            })
            .collect();
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(friends)
    }

    fn remove_friend(&self, user_id: i32, friend_id: i32) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        let row = self
            .friendship_between(user_id, friend_id)
            .filter(|row| row.is_accepted())
            .ok_or_else(|| ServiceError::not_found(FRIENDSHIP_NOT_FOUND))?;
        self.friendships.remove(&row.id);
        Ok(())
    }

    fn create_message(
        &self,
        sender_id: i32,
        receiver_id: i32,
        text: &str,
    ) -> Result<Message, ServiceError> {
        if !self.user_exists(sender_id) || !self.user_exists(receiver_id) {
            return Err(missing_reference());
        }
        let message = Message {
            id: self.message_ids.next(),
            sender_id,
            receiver_id,
            message: text.to_string(),
            timestamp: now(),
            is_read: false,
        };
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    fn list_conversation(&self, user_id: i32, friend_id: i32) -> Result<Vec<Message>, ServiceError> {
        let mut conversation: Vec<Message> = self
            .messages
            .iter()
            .filter(|entry| {
                let m = entry.value();
                (m.sender_id == user_id && m.receiver_id == friend_id)
                    || (m.sender_id == friend_id && m.receiver_id == user_id)
            })
            .map(|entry| entry.value().clone())
            .collect();
        conversation.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(conversation)
    }

    fn mark_read(&self, user_id: i32, friend_id: i32) -> Result<usize, ServiceError> {
        let mut updated = 0;
        for mut entry in self.messages.iter_mut() {
            let m = entry.value_mut();
            if m.sender_id == friend_id && m.receiver_id == user_id && !m.is_read {
                m.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
