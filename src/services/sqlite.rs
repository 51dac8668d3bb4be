use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DbError};
use diesel::sqlite::SqliteConnection;

use crate::db::{self, PooledConn, SqlitePool};
use crate::models::{
    Friend, Friendship, FriendshipStatus, IncomingRequest, Message, NewFriendship, NewMessage,
    NewSharedTask, NewTask, NewUser, OutgoingRequest, SharedTaskView, Task, User, UserInfo,
};
use crate::schema::{friendships, messages, shared_tasks, tasks, users};

use super::error::ServiceError;
use super::store::{
    Store, ALREADY_FRIENDS, ALREADY_SHARED, FRIENDSHIP_NOT_FOUND, NON_FRIEND_SHARE,
    REQUEST_EXISTS, REQUEST_NOT_FOUND, TASK_NOT_FOUND, USERNAME_TAKEN,
};

const PENDING: &str = "pending";
const ACCEPTED: &str = "accepted";

/// [`Store`] backed by a single SQLite file through a Diesel r2d2 pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    /// Opens (or creates) the database file and brings the schema up to date.
    pub fn open(database_url: &str, pool_size: u32) -> anyhow::Result<Self> {
        let pool = db::init_pool(database_url, pool_size)?;
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
        Ok(SqliteStore::new(pool))
    }

    fn conn(&self) -> Result<PooledConn, ServiceError> {
        Ok(self.pool.get()?)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn is_unique_violation(err: &DbError) -> bool {
    matches!(
        err,
        DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

fn find_friendship_between(
    conn: &mut SqliteConnection,
    a: i32,
    b: i32,
) -> QueryResult<Option<Friendship>> {
    friendships::table
        .filter(
            friendships::user1_id
                .eq(a)
                .and(friendships::user2_id.eq(b))
                .or(friendships::user1_id.eq(b).and(friendships::user2_id.eq(a))),
        )
        .select(Friendship::as_select())
        .first(conn)
        .optional()
}

impl Store for SqliteStore {
    fn create_user(&self, username: &str, password_hash: &str) -> Result<UserInfo, ServiceError> {
        let mut conn = self.conn()?;

        // Check if user already exists
        let existing = users::table
            .filter(users::username.eq(username))
            .select(users::id)
            .first::<i32>(&mut conn)
            .optional()?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let new_user = NewUser {
            username,
            password_hash,
            created_at: now(),
        };
        // The unique index still guards against a concurrent registration
        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::Conflict(USERNAME_TAKEN.to_string())
                } else {
                    ServiceError::from(e)
                }
            })?;
        Ok(user.into())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    fn search_users(
        &self,
        query: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<Vec<UserInfo>, ServiceError> {
        let mut conn = self.conn()?;
        let mut statement = users::table
            .select((users::id, users::username))
            .into_boxed();
        if let Some(exclude) = exclude_user_id {
            statement = statement.filter(users::id.ne(exclude));
        }
        let candidates = statement
            .order(users::username.asc())
            .load::<UserInfo>(&mut conn)?;

        // SQLite's LIKE only folds ASCII, so matching happens here
        let needle = query.to_lowercase();
        Ok(candidates
            .into_iter()
            .filter(|user| user.username.to_lowercase().contains(&needle))
            .collect())
    }

    fn list_tasks(&self, user_id: i32) -> Result<Vec<Task>, ServiceError> {
        let mut conn = self.conn()?;
        let items = tasks::table
            .filter(tasks::user_id.eq(user_id))
            .order(tasks::id.asc())
            .select(Task::as_select())
            .load(&mut conn)?;
        Ok(items)
    }

    fn create_task(&self, task: &NewTask) -> Result<i32, ServiceError> {
        let mut conn = self.conn()?;
        let id = diesel::insert_into(tasks::table)
            .values(task)
            .returning(tasks::id)
            .get_result::<i32>(&mut conn)?;
        Ok(id)
    }

    fn set_task_completion(
        &self,
        task_id: i32,
        user_id: i32,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<Task, ServiceError, _>(|conn| {
            let owner = tasks::table
                .find(task_id)
                .select(tasks::user_id)
                .first::<i32>(conn)
                .optional()?
                .ok_or_else(|| ServiceError::not_found(TASK_NOT_FOUND))?;

            if owner != user_id {
                let grants = shared_tasks::table
                    .filter(shared_tasks::task_id.eq(task_id))
                    .filter(shared_tasks::shared_with_id.eq(user_id))
                    .count()
                    .get_result::<i64>(conn)?;
                if grants == 0 {
                    return Err(ServiceError::not_found(TASK_NOT_FOUND));
                }
            }

            let updated = diesel::update(tasks::table.find(task_id))
                .set(tasks::completed.eq(completed))
                .returning(Task::as_returning())
                .get_result(conn)?;
            Ok(updated)
        })
    }

    fn delete_task(&self, task_id: i32, owner_id: i32) -> Result<(), ServiceError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(owner_id)),
        )
        .execute(&mut conn)?;

        match deleted {
            0 => Err(ServiceError::not_found(TASK_NOT_FOUND)),
            _ => Ok(()),
        }
    }

    fn share_task(
        &self,
        task_id: i32,
        owner_id: i32,
        recipients: &[i32],
    ) -> Result<usize, ServiceError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<usize, ServiceError, _>(|conn| {
            let owned = tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(owner_id))
                .count()
                .get_result::<i64>(conn)?;
            if owned == 0 {
                return Err(ServiceError::not_found(TASK_NOT_FOUND));
            }

            let friends = friendships::table
                .filter(friendships::status.eq(ACCEPTED))
                .filter(
                    friendships::user1_id
                        .eq(owner_id)
                        .and(friendships::user2_id.eq_any(recipients))
                        .or(friendships::user2_id
                            .eq(owner_id)
                            .and(friendships::user1_id.eq_any(recipients))),
                )
                .count()
                .get_result::<i64>(conn)?;
            if (friends as usize) < recipients.len() {
                return Err(ServiceError::bad_request(NON_FRIEND_SHARE));
            }

            let created_at = now();
            let grants: Vec<NewSharedTask> = recipients
                .iter()
                .map(|&shared_with_id| NewSharedTask {
                    task_id,
                    owner_id,
                    shared_with_id,
                    created_at,
                })
                .collect();

            diesel::insert_into(shared_tasks::table)
                .values(&grants)
                .execute(conn)
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        ServiceError::Conflict(ALREADY_SHARED.to_string())
                    } else {
                        ServiceError::from(e)
                    }
                })
        })
    }

    fn list_shared_tasks(&self, user_id: i32) -> Result<Vec<SharedTaskView>, ServiceError> {
        let mut conn = self.conn()?;
        let rows = shared_tasks::table
            .inner_join(tasks::table.on(tasks::id.eq(shared_tasks::task_id)))
            .inner_join(users::table.on(users::id.eq(shared_tasks::owner_id)))
            .filter(shared_tasks::shared_with_id.eq(user_id))
            .order(shared_tasks::id.asc())
            .select((Task::as_select(), users::username, shared_tasks::created_at))
            .load::<(Task, String, NaiveDateTime)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(task, owner_username, shared_at)| SharedTaskView {
                task,
                owner_username,
                shared_at,
            })
            .collect())
    }

    fn delete_shared_task(&self, task_id: i32) -> Result<(), ServiceError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(task_id))).execute(&mut conn)?;
        match deleted {
            0 => Err(ServiceError::not_found(TASK_NOT_FOUND)),
            _ => Ok(()),
        }
    }

    fn create_friend_request(
        &self,
        from_user_id: i32,
        to_user_id: i32,
    ) -> Result<Friendship, ServiceError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<Friendship, ServiceError, _>(|conn| {
            if let Some(existing) = find_friendship_between(conn, from_user_id, to_user_id)? {
                let detail = if existing.is_accepted() {
                    ALREADY_FRIENDS
                } else {
                    REQUEST_EXISTS
                };
                return Err(ServiceError::Conflict(detail.to_string()));
            }

            let request = NewFriendship {
                user1_id: from_user_id,
                user2_id: to_user_id,
                status: FriendshipStatus::Pending.as_str(),
                action_user_id: from_user_id,
                created_at: now(),
            };
            let created = diesel::insert_into(friendships::table)
                .values(&request)
                .returning(Friendship::as_returning())
                .get_result(conn)?;
            Ok(created)
        })
    }

    fn accept_friend_request(
        &self,
        request_id: i32,
        responding_user_id: i32,
    ) -> Result<Friendship, ServiceError> {
        let mut conn = self.conn()?;
        let accepted = diesel::update(
            friendships::table
                .filter(friendships::id.eq(request_id))
                .filter(friendships::status.eq(PENDING))
                .filter(friendships::user2_id.eq(responding_user_id)),
        )
        .set((
            friendships::status.eq(ACCEPTED),
            friendships::action_user_id.eq(responding_user_id),
        ))
        .returning(Friendship::as_returning())
        .get_result(&mut conn)
        .optional()?;

        accepted.ok_or_else(|| ServiceError::not_found(REQUEST_NOT_FOUND))
    }

    fn decline_friend_request(&self, request_id: i32) -> Result<(), ServiceError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            friendships::table
                .filter(friendships::id.eq(request_id))
                .filter(friendships::status.eq(PENDING)),
        )
        .execute(&mut conn)?;

        match deleted {
            0 => Err(ServiceError::not_found(REQUEST_NOT_FOUND)),
            _ => Ok(()),
        }
    }

    fn list_incoming_requests(&self, user_id: i32) -> Result<Vec<IncomingRequest>, ServiceError> {
        let mut conn = self.conn()?;
        let requests = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::user1_id)))
            .filter(friendships::user2_id.eq(user_id))
            .filter(friendships::status.eq(PENDING))
            .order(friendships::id.desc())
            .select((
                friendships::id,
                users::id,
                users::username,
                friendships::created_at,
            ))
            .load::<IncomingRequest>(&mut conn)?;
        Ok(requests)
    }

    fn list_outgoing_requests(&self, user_id: i32) -> Result<Vec<OutgoingRequest>, ServiceError> {
        let mut conn = self.conn()?;
        let requests = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::user2_id)))
            .filter(friendships::user1_id.eq(user_id))
            .filter(friendships::status.eq(PENDING))
            .order(friendships::id.desc())
            .select((
                friendships::id,
                users::id,
                users::username,
                friendships::created_at,
            ))
            .load::<OutgoingRequest>(&mut conn)?;
        Ok(requests)
    }

    fn list_friends(&self, user_id: i32) -> Result<Vec<Friend>, ServiceError> {
        let mut conn = self.conn()?;

        // The counterpart sits on either side of the row
        let mut friends = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::user2_id)))
            .filter(friendships::user1_id.eq(user_id))
            .filter(friendships::status.eq(ACCEPTED))
            .select((users::id, users::username, friendships::created_at))
            .load::<Friend>(&mut conn)?;
        let as_recipient = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::user1_id)))
            .filter(friendships::user2_id.eq(user_id))
            .filter(friendships::status.eq(ACCEPTED))
            .select((users::id, users::username, friendships::created_at))
            .load::<Friend>(&mut conn)?;

        friends.extend(as_recipient);
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(friends)
    }

    fn remove_friend(&self, user_id: i32, friend_id: i32) -> Result<(), ServiceError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            friendships::table
                .filter(friendships::status.eq(ACCEPTED))
                .filter(
                    friendships::user1_id
                        .eq(user_id)
                        .and(friendships::user2_id.eq(friend_id))
                        .or(friendships::user1_id
                            .eq(friend_id)
                            .and(friendships::user2_id.eq(user_id))),
                ),
        )
        .execute(&mut conn)?;

        match deleted {
            0 => Err(ServiceError::not_found(FRIENDSHIP_NOT_FOUND)),
            _ => Ok(()),
        }
    }

    fn create_message(
        &self,
        sender_id: i32,
        receiver_id: i32,
        text: &str,
    ) -> Result<Message, ServiceError> {
        let mut conn = self.conn()?;
        let new_message = NewMessage {
            sender_id,
            receiver_id,
            message: text,
            timestamp: now(),
            is_read: false,
        };
        let stored = diesel::insert_into(messages::table)
            .values(&new_message)
            .returning(Message::as_returning())
            .get_result(&mut conn)?;
        Ok(stored)
    }

    fn list_conversation(&self, user_id: i32, friend_id: i32) -> Result<Vec<Message>, ServiceError> {
        let mut conn = self.conn()?;
        let conversation = messages::table
            .filter(
                messages::sender_id
                    .eq(user_id)
                    .and(messages::receiver_id.eq(friend_id))
                    .or(messages::sender_id
                        .eq(friend_id)
                        .and(messages::receiver_id.eq(user_id))),
            )
            .order((messages::timestamp.asc(), messages::id.asc()))
            .select(Message::as_select())
            .load(&mut conn)?;
        Ok(conversation)
    }

    fn mark_read(&self, user_id: i32, friend_id: i32) -> Result<usize, ServiceError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            messages::table
                .filter(messages::sender_id.eq(friend_id))
                .filter(messages::receiver_id.eq(user_id))
                .filter(messages::is_read.eq(false)),
        )
        .set(messages::is_read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }
}
