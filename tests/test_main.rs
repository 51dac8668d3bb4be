#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rocket::http::{ContentType, Header, Status};
    use rocket::local::blocking::Client;
    use serde_json::{json, Value};
    use taskmasters_backend::config::AppConfig;
    use taskmasters_backend::models::{
        ActionResponse, CreatedResponse, Friend, Friendship, IncomingRequest, MarkReadResponse,
        Message, OutgoingRequest, SharedTaskView, ShareResponse, Task, UserInfo,
    };
    use taskmasters_backend::services::{DynStore, MemoryStore, SqliteStore, Store};
    use taskmasters_backend::{rocket_instance, ErrorDetail};
    use tempfile::TempDir;
    use uuid::Uuid;

    // Keeps the database directory alive for as long as the client
    struct TestApp {
        client: Client,
        _dir: TempDir,
    }

    fn test_config() -> AppConfig {
        AppConfig {
            bcrypt_cost: 4,
            ..AppConfig::default()
        }
    }

    fn test_app() -> TestApp {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("tasks.db");
        let store = SqliteStore::open(db_path.to_str().expect("utf-8 path"), 2).expect("open store");
        let store: DynStore = Arc::new(store);
        let client = Client::tracked(rocket_instance(store, test_config())).expect("valid rocket instance");
        TestApp { client, _dir: dir }
    }

    fn unique_name(prefix: &str) -> String {
        format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
    }

    fn register(client: &Client, username: &str) -> UserInfo {
        let response = client
            .post("/register")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": "password123" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created, "Registration failed");
        response.into_json::<UserInfo>().unwrap()
    }

    fn create_task(client: &Client, user_id: i32, name: &str, date: &str, priority: &str) -> i32 {
        let response = client
            .post(format!("/tasks/{}", user_id))
            .header(ContentType::JSON)
            .body(json!({ "name": name, "date": date, "priority": priority }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        response.into_json::<CreatedResponse>().unwrap().id
    }

    fn list_tasks(client: &Client, uri: String) -> Vec<Task> {
        let response = client.get(uri).dispatch();
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<Vec<Task>>().unwrap()
    }

    fn befriend(client: &Client, from: &UserInfo, to: &UserInfo) {
        let response = client
            .post("/friends/requests")
            .header(ContentType::JSON)
            .body(json!({ "fromUserId": from.id, "toUsername": to.username }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        let request = response.into_json::<Friendship>().unwrap();

        let response = client
            .put(format!("/friends/requests/{}/accept", request.id))
            .header(ContentType::JSON)
            .body(json!({ "userId": to.id }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }

    fn error_of(response: rocket::local::blocking::LocalResponse<'_>) -> ErrorDetail {
        response.into_json::<ErrorDetail>().expect("JSON error body")
    }

    // --- accounts ---

    #[test]
    fn test_register_and_login() {
        let app = test_app();
        let username = unique_name("alice");
        let user = register(&app.client, &username);
        assert_eq!(user.username, username);

        let response = app
            .client
            .post("/login")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": "password123" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_json::<UserInfo>().unwrap(), user);
    }

    #[test]
    fn test_register_duplicate_username_keeps_first_account() {
        let app = test_app();
        let username = unique_name("dup");
        register(&app.client, &username);

        let response = app
            .client
            .post("/register")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": "another1" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).error, "Username already exists");

        let response = app
            .client
            .post("/login")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": "password123" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }

    #[test]
    fn test_login_bad_credentials() {
        let app = test_app();
        let username = unique_name("bob");
        register(&app.client, &username);

        for (name, password) in [(username.as_str(), "wrongpassword"), ("nobody_here", "password123")] {
            let response = app
                .client
                .post("/login")
                .header(ContentType::JSON)
                .body(json!({ "username": name, "password": password }).to_string())
                .dispatch();
            assert_eq!(response.status(), Status::Unauthorized);
            assert_eq!(error_of(response).error, "Invalid credentials");
        }
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let app = test_app();
        let response = app
            .client
            .post("/register")
            .header(ContentType::JSON)
            .body("{ not json")
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        let error = error_of(response);
        assert_eq!(error.error, "Invalid request body");
        assert!(error.details.is_some());

        let response = app
            .client
            .post("/register")
            .header(ContentType::JSON)
            .body(json!({ "username": "carol" }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).error, "password is required");
    }

    // --- tasks ---

    #[test]
    fn test_create_task_then_list() {
        let app = test_app();
        let user = register(&app.client, &unique_name("owner"));

        let response = app
            .client
            .post(format!("/tasks/{}", user.id))
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Pay bills",
                    "date": "2025-03-01",
                    "priority": "High",
                    "workload": "30min"
                })
                .to_string(),
            )
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        let id = response.into_json::<CreatedResponse>().unwrap().id;

        let tasks = list_tasks(&app.client, format!("/tasks/{}", user.id));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].name, "Pay bills");
        assert_eq!(tasks[0].priority, "High");
        assert_eq!(tasks[0].workload.as_deref(), Some("30min"));
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_task_json_uses_camel_case() {
        let app = test_app();
        let user = register(&app.client, &unique_name("owner"));
        create_task(&app.client, user.id, "Read", "2025-03-01", "Low");

        let body: Value = app
            .client
            .get(format!("/tasks/{}", user.id))
            .dispatch()
            .into_json()
            .unwrap();
        assert_eq!(body[0]["userId"], json!(user.id));
        assert_eq!(body[0]["completed"], json!(false));
    }

    #[test]
    fn test_create_task_validation() {
        let app = test_app();
        let user = register(&app.client, &unique_name("owner"));

        let bad_bodies = [
            json!({ "date": "2025-03-01", "priority": "High" }),
            json!({ "name": "x", "date": "2025-03-01", "priority": "Urgent" }),
            json!({ "name": "x", "date": "March 1st", "priority": "Low" }),
            json!({ "name": "x", "date": 20250301, "priority": "Low" }),
        ];
        for body in bad_bodies {
            let response = app
                .client
                .post(format!("/tasks/{}", user.id))
                .header(ContentType::JSON)
                .body(body.to_string())
                .dispatch();
            assert_eq!(response.status(), Status::BadRequest, "accepted {}", body);
        }
        assert!(list_tasks(&app.client, format!("/tasks/{}", user.id)).is_empty());
    }

    #[test]
    fn test_toggle_completion_twice_restores_state() {
        let app = test_app();
        let user = register(&app.client, &unique_name("owner"));
        let id = create_task(&app.client, user.id, "Laundry", "2025-03-01", "Medium");

        for completed in [true, false] {
            let response = app
                .client
                .put(format!("/tasks/{}", user.id))
                .header(ContentType::JSON)
                .body(json!({ "id": id, "completed": completed }).to_string())
                .dispatch();
            assert_eq!(response.status(), Status::Ok);
            assert_eq!(response.into_json::<Task>().unwrap().completed, completed);
        }
        assert!(!list_tasks(&app.client, format!("/tasks/{}", user.id))[0].completed);
    }

    #[test]
    fn test_other_users_cannot_touch_task() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let other = register(&app.client, &unique_name("other"));
        let id = create_task(&app.client, owner.id, "Private", "2025-03-01", "High");

        let response = app
            .client
            .put(format!("/tasks/{}", other.id))
            .header(ContentType::JSON)
            .body(json!({ "id": id, "completed": true }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);

        let response = app
            .client
            .delete(format!("/tasks/{}?userId={}", id, other.id))
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);

        let response = app.client.delete(format!("/tasks/{}", id)).dispatch();
        assert_eq!(response.status(), Status::BadRequest);

        let response = app
            .client
            .delete(format!("/tasks/{}?userId={}", id, owner.id))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(response.into_json::<ActionResponse>().unwrap().success);
        assert!(list_tasks(&app.client, format!("/tasks/{}", owner.id)).is_empty());
    }

    #[test]
    fn test_list_tasks_with_filter_and_sort() {
        let app = test_app();
        let user = register(&app.client, &unique_name("owner"));
        create_task(&app.client, user.id, "walk dog", "2025-03-02", "Low");
        let done = create_task(&app.client, user.id, "Answer email", "2025-03-03", "High");
        create_task(&app.client, user.id, "cook", "2025-03-01", "Medium");
        app.client
            .put(format!("/tasks/{}", user.id))
            .header(ContentType::JSON)
            .body(json!({ "id": done, "completed": true }).to_string())
            .dispatch();

        let names = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.name).collect::<Vec<_>>();
        assert_eq!(
            names(list_tasks(&app.client, format!("/tasks/{}?sort=priority", user.id))),
            vec!["Answer email", "cook", "walk dog"]
        );
        assert_eq!(
            names(list_tasks(&app.client, format!("/tasks/{}?status=pending&sort=date", user.id))),
            vec!["cook", "walk dog"]
        );
        assert_eq!(
            names(list_tasks(&app.client, format!("/tasks/{}?search=DOG", user.id))),
            vec!["walk dog"]
        );
    }

    // --- sharing ---

    #[test]
    fn test_share_with_non_friend_writes_nothing() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let friend = register(&app.client, &unique_name("friend"));
        let stranger = register(&app.client, &unique_name("stranger"));
        befriend(&app.client, &owner, &friend);
        let id = create_task(&app.client, owner.id, "Plan party", "2025-04-01", "High");

        let response = app
            .client
            .post("/tasks/share")
            .header(ContentType::JSON)
            .body(json!({ "taskId": id, "ownerId": owner.id, "sharedWithIds": [friend.id, stranger.id] }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).error, "Cannot share with non-friends");

        let shared = app
            .client
            .get(format!("/tasks/shared/{}", friend.id))
            .dispatch()
            .into_json::<Vec<SharedTaskView>>()
            .unwrap();
        assert!(shared.is_empty());
    }

    #[test]
    fn test_shared_task_visible_and_toggleable_by_friend() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let friend = register(&app.client, &unique_name("friend"));
        befriend(&app.client, &owner, &friend);
        let id = create_task(&app.client, owner.id, "Plan party", "2025-04-01", "High");

        let response = app
            .client
            .post("/tasks/share")
            .header(ContentType::JSON)
            .body(json!({ "taskId": id, "ownerId": owner.id, "sharedWithIds": [friend.id] }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_json::<ShareResponse>().unwrap().shared, 1);

        let shared = app
            .client
            .get(format!("/tasks/shared/{}", friend.id))
            .dispatch()
            .into_json::<Vec<SharedTaskView>>()
            .unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].task.id, id);
        assert_eq!(shared[0].owner_username, owner.username);

        let response = app
            .client
            .put(format!("/tasks/{}", friend.id))
            .header(ContentType::JSON)
            .body(json!({ "id": id, "completed": true }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(list_tasks(&app.client, format!("/tasks/{}", owner.id))[0].completed);

        // Sharing the same task twice is rejected as a duplicate
        let response = app
            .client
            .post("/tasks/share")
            .header(ContentType::JSON)
            .body(json!({ "taskId": id, "ownerId": owner.id, "sharedWithIds": [friend.id] }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test]
    fn test_delete_shared_task_removes_it_for_everyone() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let friend = register(&app.client, &unique_name("friend"));
        befriend(&app.client, &owner, &friend);
        let id = create_task(&app.client, owner.id, "Shared chore", "2025-04-01", "Low");
        app.client
            .post("/tasks/share")
            .header(ContentType::JSON)
            .body(json!({ "taskId": id, "ownerId": owner.id, "sharedWithIds": [friend.id] }).to_string())
            .dispatch();

        let response = app.client.delete(format!("/tasks/shared/{}", id)).dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(list_tasks(&app.client, format!("/tasks/{}", owner.id)).is_empty());
        let shared = app
            .client
            .get(format!("/tasks/shared/{}", friend.id))
            .dispatch()
            .into_json::<Vec<SharedTaskView>>()
            .unwrap();
        assert!(shared.is_empty());

        let response = app.client.delete(format!("/tasks/shared/{}", id)).dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    fn share(client: &Client, task_id: i32, owner: &UserInfo, with: &[i32]) -> Status {
        client
            .post("/tasks/share")
            .header(ContentType::JSON)
            .body(json!({ "taskId": task_id, "ownerId": owner.id, "sharedWithIds": with }).to_string())
            .dispatch()
            .status()
    }

    fn shared_with(client: &Client, user: &UserInfo) -> Vec<SharedTaskView> {
        client
            .get(format!("/tasks/shared/{}", user.id))
            .dispatch()
            .into_json::<Vec<SharedTaskView>>()
            .unwrap()
    }

    #[test]
    fn test_share_with_existing_grant_rolls_back_new_grants() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let first = register(&app.client, &unique_name("first"));
        let second = register(&app.client, &unique_name("second"));
        befriend(&app.client, &owner, &first);
        befriend(&app.client, &owner, &second);
        let id = create_task(&app.client, owner.id, "Group trip", "2025-05-01", "Medium");

        assert_eq!(share(&app.client, id, &owner, &[first.id]), Status::Ok);

        // The grant for `first` already exists, so nothing is written for `second` either
        assert_eq!(share(&app.client, id, &owner, &[second.id, first.id]), Status::BadRequest);
        assert!(shared_with(&app.client, &second).is_empty());
        assert_eq!(shared_with(&app.client, &first).len(), 1);
    }

    #[test]
    fn test_unfriending_keeps_existing_grants() {
        let app = test_app();
        let owner = register(&app.client, &unique_name("owner"));
        let friend = register(&app.client, &unique_name("friend"));
        befriend(&app.client, &owner, &friend);
        let id = create_task(&app.client, owner.id, "Book venue", "2025-05-01", "High");
        assert_eq!(share(&app.client, id, &owner, &[friend.id]), Status::Ok);

        let response = app
            .client
            .delete(format!("/friends/{}/{}", owner.id, friend.id))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);

        let shared = shared_with(&app.client, &friend);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].task.id, id);
    }

    // --- friends ---

    #[test]
    fn test_friend_request_lifecycle() {
        let app = test_app();
        let alice = register(&app.client, &unique_name("alice"));
        let bob = register(&app.client, &unique_name("bob"));

        let response = app
            .client
            .post("/friends/requests")
            .header(ContentType::JSON)
            .body(json!({ "fromUserId": alice.id, "toUsername": bob.username }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        let request = response.into_json::<Friendship>().unwrap();
        assert_eq!(request.status, "pending");

        let incoming = app
            .client
            .get(format!("/friends/requests/incoming/{}", bob.id))
            .dispatch()
            .into_json::<Vec<IncomingRequest>>()
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].from_username, alice.username);
        let outgoing = app
            .client
            .get(format!("/friends/requests/outgoing/{}", alice.id))
            .dispatch()
            .into_json::<Vec<OutgoingRequest>>()
            .unwrap();
        assert_eq!(outgoing[0].to_user_id, bob.id);

        let accept = || {
            app.client
                .put(format!("/friends/requests/{}/accept", request.id))
                .header(ContentType::JSON)
                .body(json!({ "userId": bob.id }).to_string())
                .dispatch()
                .status()
        };
        assert_eq!(accept(), Status::Ok);
        assert_eq!(accept(), Status::NotFound);

        let incoming = app
            .client
            .get(format!("/friends/requests/incoming/{}", bob.id))
            .dispatch()
            .into_json::<Vec<IncomingRequest>>()
            .unwrap();
        assert!(incoming.is_empty());
        for (user, other) in [(&alice, &bob), (&bob, &alice)] {
            let friends = app
                .client
                .get(format!("/friends/{}", user.id))
                .dispatch()
                .into_json::<Vec<Friend>>()
                .unwrap();
            assert_eq!(friends.len(), 1);
            assert_eq!(friends[0].username, other.username);
        }

        let response = app
            .client
            .delete(format!("/friends/{}/{}", bob.id, alice.id))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let friends = app
            .client
            .get(format!("/friends/{}", alice.id))
            .dispatch()
            .into_json::<Vec<Friend>>()
            .unwrap();
        assert!(friends.is_empty());
    }

    #[test]
    fn test_friend_request_errors() {
        let app = test_app();
        let alice = register(&app.client, &unique_name("alice"));
        let bob = register(&app.client, &unique_name("bob"));

        let send = |from: &UserInfo, to: &str| {
            app.client
                .post("/friends/requests")
                .header(ContentType::JSON)
                .body(json!({ "fromUserId": from.id, "toUsername": to }).to_string())
                .dispatch()
        };
        let response = send(&alice, "no_such_user");
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(error_of(response).error, "User not found");

        assert_eq!(send(&alice, &alice.username).status(), Status::BadRequest);
        assert_eq!(send(&alice, &bob.username).status(), Status::Created);
        let response = send(&bob, &alice.username);
        assert_eq!(response.status(), Status::BadRequest);
        assert_eq!(
            error_of(response).error,
            "A friend request already exists between you and this user"
        );

        let incoming = app
            .client
            .get(format!("/friends/requests/incoming/{}", bob.id))
            .dispatch()
            .into_json::<Vec<IncomingRequest>>()
            .unwrap();
        let response = app
            .client
            .put(format!("/friends/requests/{}/decline", incoming[0].id))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let response = app
            .client
            .put(format!("/friends/requests/{}/decline", incoming[0].id))
            .dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    #[test]
    fn test_user_search_excludes_caller() {
        let app = test_app();
        let tag = unique_name("zed");
        let me = register(&app.client, &format!("{}_me", tag));
        let other = register(&app.client, &format!("{}_you", tag));

        let found = app
            .client
            .get(format!("/users/search/{}?currentUserId={}", tag.to_uppercase(), me.id))
            .dispatch()
            .into_json::<Vec<UserInfo>>()
            .unwrap();
        assert_eq!(found, vec![other]);
    }

    #[test]
    fn test_user_search_folds_non_ascii_case_in_both_stores() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("search.db");
        let sqlite = SqliteStore::open(db_path.to_str().expect("utf-8 path"), 1).expect("open store");
        let memory = MemoryStore::new();
        let stores: [&dyn Store; 2] = [&sqlite, &memory];

        for store in stores {
            let caller = store.create_user("caller", "hash").unwrap();
            store.create_user("Élodie", "hash").unwrap();
            store.create_user("ÉMILE", "hash").unwrap();
            store.create_user("100%_real", "hash").unwrap();

            let names = |query: &str| {
                store
                    .search_users(query, Some(caller.id))
                    .unwrap()
                    .into_iter()
                    .map(|u| u.username)
                    .collect::<Vec<_>>()
            };
            assert_eq!(names("élo"), vec!["Élodie"]);
            assert_eq!(names("é"), vec!["ÉMILE", "Élodie"]);
            assert_eq!(names("%_"), vec!["100%_real"]);
            assert!(names("caller").is_empty());
        }
    }

    // --- messages ---

    #[test]
    fn test_messages_order_and_mark_read() {
        let app = test_app();
        let alice = register(&app.client, &unique_name("alice"));
        let bob = register(&app.client, &unique_name("bob"));

        for (from, to, text) in [(&alice, &bob, "hi"), (&bob, &alice, "hello"), (&alice, &bob, "lunch?")] {
            let response = app
                .client
                .post("/messages")
                .header(ContentType::JSON)
                .body(json!({ "sender_id": from.id, "receiver_id": to.id, "message": text }).to_string())
                .dispatch();
            assert_eq!(response.status(), Status::Created);
            assert!(!response.into_json::<Message>().unwrap().is_read);
        }

        let conversation = app
            .client
            .get(format!("/messages/{}/{}", bob.id, alice.id))
            .dispatch()
            .into_json::<Vec<Message>>()
            .unwrap();
        let texts: Vec<&str> = conversation.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "lunch?"]);
        assert!(conversation.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        let response = app
            .client
            .put("/messages/read")
            .header(ContentType::JSON)
            .body(json!({ "userId": bob.id, "friendId": alice.id }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_json::<MarkReadResponse>().unwrap().updated, 2);

        let conversation = app
            .client
            .get(format!("/messages/{}/{}", alice.id, bob.id))
            .dispatch()
            .into_json::<Vec<Message>>()
            .unwrap();
        for m in conversation {
            assert_eq!(m.is_read, m.receiver_id == bob.id, "message {}", m.message);
        }
    }

    #[test]
    fn test_blank_message_rejected() {
        let app = test_app();
        let alice = register(&app.client, &unique_name("alice"));
        let bob = register(&app.client, &unique_name("bob"));
        let response = app
            .client
            .post("/messages")
            .header(ContentType::JSON)
            .body(json!({ "sender_id": alice.id, "receiver_id": bob.id, "message": "  " }).to_string())
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    // --- plumbing ---

    #[test]
    fn test_unknown_route_returns_json_404() {
        let app = test_app();
        let response = app.client.get("/does/not/exist").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        assert_eq!(error_of(response).error, "Not found");
    }

    #[test]
    fn test_cors_allow_list() {
        let app = test_app();
        let response = app
            .client
            .options("/tasks/1")
            .header(Header::new("Origin", "http://localhost:3000"))
            .dispatch();
        assert_eq!(response.status(), Status::NoContent);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://localhost:3000")
        );

        let response = app
            .client
            .get("/friends/1")
            .header(Header::new("Origin", "http://evil.example"))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(response.headers().get_one("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn test_memory_store_serves_same_api() {
        let store: DynStore = Arc::new(MemoryStore::new());
        let client = Client::tracked(rocket_instance(store, test_config())).expect("valid rocket instance");
        let user = register(&client, "memory_user");
        let id = create_task(&client, user.id, "In memory", "2025-03-01", "Low");
        let tasks = list_tasks(&client, format!("/tasks/{}", user.id));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
    }
}
