use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::{self, Json};
use rocket::{delete, get, post, put, routes, State};

use crate::config::AppConfig;
use crate::models::{
    ActionResponse, AuthRequest, CreateTaskRequest, CreatedResponse, Friend, FriendRequestBody,
    Friendship, IncomingRequest, MarkReadRequest, MarkReadResponse, Message, OutgoingRequest,
    OwnerQuery, RespondRequest, SendMessageRequest, ShareResponse, ShareTaskRequest,
    SharedTaskView, Task, TaskFilter, UpdateTaskRequest, UserInfo, UserSearchQuery,
};
use crate::services::{accounts, friends, messages, tasks, DynStore};
use crate::{ApiError, ErrorDetail};

type ApiResult<T> = Result<T, ApiError>;

/// A JSON body that failed to parse still reaches the handler, so the client
/// gets a 400 with the parser message instead of Rocket's generic 422.
type Body<'r, T> = Result<Json<T>, json::Error<'r>>;

fn parse_body<T>(body: Body<'_, T>) -> ApiResult<T> {
    body.map(Json::into_inner).map_err(|e| {
        let details = match e {
            json::Error::Io(io) => io.to_string(),
            json::Error::Parse(_, parse) => parse.to_string(),
        };
        ApiError::BadRequest(Json(ErrorDetail::with_details(
            "Invalid request body",
            details,
        )))
    })
}

fn created<T>(value: T) -> Custom<Json<T>> {
    Custom(Status::Created, Json(value))
}

// --- accounts ---

#[post("/register", data = "<body>")]
pub fn register(
    body: Body<'_, AuthRequest>,
    store: &State<DynStore>,
    config: &State<AppConfig>,
) -> ApiResult<Custom<Json<UserInfo>>> {
    let user = accounts::register_user(store.inner().as_ref(), config.bcrypt_cost, parse_body(body)?)?;
    Ok(created(user))
}

#[post("/login", data = "<body>")]
pub fn login(body: Body<'_, AuthRequest>, store: &State<DynStore>) -> ApiResult<Json<UserInfo>> {
    let user = accounts::login_user(store.inner().as_ref(), parse_body(body)?)?;
    Ok(Json(user))
}

// --- tasks ---

#[get("/<user_id>?<filter..>")]
pub fn list_tasks(
    user_id: i32,
    filter: TaskFilter,
    store: &State<DynStore>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::list_tasks(store.inner().as_ref(), user_id, &filter)?))
}

#[post("/<user_id>", data = "<body>")]
pub fn create_task(
    user_id: i32,
    body: Body<'_, CreateTaskRequest>,
    store: &State<DynStore>,
) -> ApiResult<Custom<Json<CreatedResponse>>> {
    let id = tasks::create_task(store.inner().as_ref(), user_id, parse_body(body)?)?;
    Ok(created(CreatedResponse { id }))
}

#[put("/<user_id>", data = "<body>")]
pub fn update_task(
    user_id: i32,
    body: Body<'_, UpdateTaskRequest>,
    store: &State<DynStore>,
) -> ApiResult<Json<Task>> {
    let task = tasks::set_completion(store.inner().as_ref(), user_id, parse_body(body)?)?;
    Ok(Json(task))
}

#[delete("/<id>?<owner..>")]
pub fn delete_task(
    id: i32,
    owner: OwnerQuery,
    store: &State<DynStore>,
) -> ApiResult<Json<ActionResponse>> {
    tasks::delete_task(store.inner().as_ref(), id, owner.user_id)?;
    Ok(Json(ActionResponse::ok("Task deleted")))
}

#[post("/share", data = "<body>")]
pub fn share_task(
    body: Body<'_, ShareTaskRequest>,
    store: &State<DynStore>,
) -> ApiResult<Json<ShareResponse>> {
    let shared = tasks::share_task(store.inner().as_ref(), parse_body(body)?)?;
    Ok(Json(ShareResponse {
        success: true,
        shared,
    }))
}

#[get("/shared/<user_id>")]
pub fn list_shared_tasks(user_id: i32, store: &State<DynStore>) -> ApiResult<Json<Vec<SharedTaskView>>> {
    Ok(Json(tasks::list_shared_tasks(store.inner().as_ref(), user_id)?))
}

#[delete("/shared/<task_id>")]
pub fn delete_shared_task(task_id: i32, store: &State<DynStore>) -> ApiResult<Json<ActionResponse>> {
    tasks::delete_shared_task(store.inner().as_ref(), task_id)?;
    Ok(Json(ActionResponse::ok("Shared task deleted")))
}

// --- users & friends ---

#[get("/search/<username>?<query..>")]
pub fn search_users(
    username: &str,
    query: UserSearchQuery,
    store: &State<DynStore>,
) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = friends::search_users(store.inner().as_ref(), username, query.current_user_id)?;
    Ok(Json(users))
}

#[post("/requests", data = "<body>")]
pub fn send_friend_request(
    body: Body<'_, FriendRequestBody>,
    store: &State<DynStore>,
) -> ApiResult<Custom<Json<Friendship>>> {
    let request = friends::send_request(store.inner().as_ref(), parse_body(body)?)?;
    Ok(created(request))
}

#[put("/requests/<id>/accept", data = "<body>")]
pub fn accept_friend_request(
    id: i32,
    body: Body<'_, RespondRequest>,
    store: &State<DynStore>,
) -> ApiResult<Json<Friendship>> {
    let friendship = friends::accept_request(store.inner().as_ref(), id, parse_body(body)?)?;
    Ok(Json(friendship))
}

#[put("/requests/<id>/decline")]
pub fn decline_friend_request(id: i32, store: &State<DynStore>) -> ApiResult<Json<ActionResponse>> {
    friends::decline_request(store.inner().as_ref(), id)?;
    Ok(Json(ActionResponse::ok("Friend request declined")))
}

#[get("/requests/incoming/<user_id>")]
pub fn incoming_requests(user_id: i32, store: &State<DynStore>) -> ApiResult<Json<Vec<IncomingRequest>>> {
    Ok(Json(friends::incoming_requests(store.inner().as_ref(), user_id)?))
}

#[get("/requests/outgoing/<user_id>")]
pub fn outgoing_requests(user_id: i32, store: &State<DynStore>) -> ApiResult<Json<Vec<OutgoingRequest>>> {
    Ok(Json(friends::outgoing_requests(store.inner().as_ref(), user_id)?))
}

#[get("/<user_id>")]
pub fn list_friends(user_id: i32, store: &State<DynStore>) -> ApiResult<Json<Vec<Friend>>> {
    Ok(Json(friends::list_friends(store.inner().as_ref(), user_id)?))
}

#[delete("/<user_id>/<friend_id>")]
pub fn remove_friend(
    user_id: i32,
    friend_id: i32,
    store: &State<DynStore>,
) -> ApiResult<Json<ActionResponse>> {
    friends::remove_friend(store.inner().as_ref(), user_id, friend_id)?;
    Ok(Json(ActionResponse::ok("Friend removed")))
}

// --- messages ---

#[get("/<user_id>/<friend_id>")]
pub fn conversation(
    user_id: i32,
    friend_id: i32,
    store: &State<DynStore>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(messages::conversation(store.inner().as_ref(), user_id, friend_id)?))
}

#[post("/", data = "<body>")]
pub fn send_message(
    body: Body<'_, SendMessageRequest>,
    store: &State<DynStore>,
    config: &State<AppConfig>,
) -> ApiResult<Custom<Json<Message>>> {
    let message = messages::send_message(
        store.inner().as_ref(),
        config.max_message_length,
        parse_body(body)?,
    )?;
    Ok(created(message))
}

#[put("/read", data = "<body>")]
pub fn mark_read(
    body: Body<'_, MarkReadRequest>,
    store: &State<DynStore>,
) -> ApiResult<Json<MarkReadResponse>> {
    let updated = messages::mark_read(store.inner().as_ref(), parse_body(body)?)?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

pub fn auth_routes() -> Vec<rocket::Route> {
    routes![register, login]
}

pub fn task_routes() -> Vec<rocket::Route> {
    routes![
        list_tasks,
        create_task,
        update_task,
        delete_task,
        share_task,
        list_shared_tasks,
        delete_shared_task
    ]
}

pub fn user_routes() -> Vec<rocket::Route> {
    routes![search_users]
}

pub fn friend_routes() -> Vec<rocket::Route> {
    routes![
        send_friend_request,
        accept_friend_request,
        decline_friend_request,
        incoming_requests,
        outgoing_requests,
        list_friends,
        remove_friend
    ]
}

pub fn message_routes() -> Vec<rocket::Route> {
    routes![conversation, send_message, mark_read]
}
