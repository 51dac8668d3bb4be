use diesel::prelude::*;
use taskmasters_backend::config::AppConfig;
use taskmasters_backend::db;
use taskmasters_backend::models::{Friendship, Message, SharedTask, Task};
use taskmasters_backend::schema::{friendships, messages, shared_tasks, tasks, users};

fn main() -> anyhow::Result<()> {
    // An explicit path wins over DATABASE_URL
    let database_url = match std::env::args().nth(1) {
        Some(path) => path,
        None => AppConfig::from_env()?.database_url,
    };
    println!("Inspecting {}", database_url);

    let pool = db::init_pool(&database_url, 1)?;
    let mut conn = pool.get()?;
    db::run_migrations(&mut conn)?;

    println!("\n-- users --");
    let rows = users::table
        .select((users::id, users::username, users::created_at))
        .order(users::id)
        .load::<(i32, String, chrono::NaiveDateTime)>(&mut conn)?;
    for (id, username, created_at) in &rows {
        println!("id={} username={} created_at={}", id, username, created_at);
    }

    println!("\n-- tasks --");
    let rows = tasks::table
        .select(Task::as_select())
        .order(tasks::id)
        .load(&mut conn)?;
    for t in &rows {
        println!(
            "id={} user_id={} name={:?} date={} time={} priority={} workload={} completed={}",
            t.id,
            t.user_id,
            t.name,
            t.date,
            t.time.as_deref().unwrap_or("-"),
            t.priority,
            t.workload.as_deref().unwrap_or("-"),
            t.completed
        );
    }

    println!("\n-- friendships --");
    let rows = friendships::table
        .select(Friendship::as_select())
        .order(friendships::id)
        .load(&mut conn)?;
    for f in &rows {
        println!(
            "id={} user1_id={} user2_id={} status={} action_user_id={} created_at={}",
            f.id, f.user1_id, f.user2_id, f.status, f.action_user_id, f.created_at
        );
    }

    println!("\n-- shared_tasks --");
    let rows = shared_tasks::table
        .select(SharedTask::as_select())
        .order(shared_tasks::id)
        .load(&mut conn)?;
    for s in &rows {
        println!(
            "id={} task_id={} owner_id={} shared_with_id={} created_at={}",
            s.id, s.task_id, s.owner_id, s.shared_with_id, s.created_at
        );
    }

    println!("\n-- messages (last 20) --");
    let rows = messages::table
        .select(Message::as_select())
        .order((messages::timestamp.desc(), messages::id.desc()))
        .limit(20)
        .load(&mut conn)?;
    for m in rows.iter().rev() {
        println!(
            "id={} sender_id={} receiver_id={} message_len={} timestamp={} is_read={}",
            m.id,
            m.sender_id,
            m.receiver_id,
            m.message.chars().count(),
            m.timestamp,
            m.is_read
        );
    }

    Ok(())
}
