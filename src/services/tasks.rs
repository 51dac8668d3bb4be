use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{
    CreateTaskRequest, NewTask, Priority, ShareTaskRequest, SharedTaskView, Task, TaskFilter,
    TaskSort, TaskStatusFilter, UpdateTaskRequest,
};

use super::error::ServiceError;
use super::store::Store;
use super::{optional_text, required, required_text};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()
}

/// When the task falls due; a task without a time is due at the end of its day.
fn due_at(task: &Task) -> Option<NaiveDateTime> {
    let date = parse_date(&task.date)?;
    let time = task
        .time
        .as_deref()
        .and_then(parse_time)
        .or_else(|| NaiveTime::from_hms_opt(23, 59, 0))?;
    Some(date.and_time(time))
}

fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    !task.completed && due_at(task).map(|due| due < now).unwrap_or(false)
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.name.to_lowercase().contains(needle)
        || task
            .workload
            .as_deref()
            .map(|w| w.to_lowercase().contains(needle))
            .unwrap_or(false)
}

fn compare_by(sort: TaskSort, a: &Task, b: &Task) -> Ordering {
    match sort {
        TaskSort::Date => (a.date.as_str(), a.time.as_deref().unwrap_or(""))
            .cmp(&(b.date.as_str(), b.time.as_deref().unwrap_or(""))),
        // Unknown priorities sink to the bottom
        TaskSort::Priority => {
            let rank = |t: &Task| t.priority().map(|p| p.rank()).unwrap_or(u8::MAX);
            rank(a).cmp(&rank(b))
        }
        TaskSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Narrows and orders a task list the way the task view presents it.
/// `now` is the reference point for overdue tasks.
pub fn apply_filter(tasks: Vec<Task>, filter: &TaskFilter, now: NaiveDateTime) -> Vec<Task> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let status = filter.status.unwrap_or(TaskStatusFilter::All);

    let mut items: Vec<Task> = tasks
        .into_iter()
        .filter(|task| needle.as_deref().map_or(true, |n| matches_search(task, n)))
        .filter(|task| match status {
            TaskStatusFilter::All => true,
            TaskStatusFilter::Completed => task.completed,
            TaskStatusFilter::Pending => !task.completed,
            TaskStatusFilter::Overdue => is_overdue(task, now),
        })
        .collect();

    if let Some(sort) = filter.sort {
        items.sort_by(|a, b| compare_by(sort, a, b));
    }
    items
}

pub fn list_tasks(
    store: &dyn Store,
    user_id: i32,
    filter: &TaskFilter,
) -> Result<Vec<Task>, ServiceError> {
    let tasks = store.list_tasks(user_id)?;
    Ok(apply_filter(tasks, filter, Local::now().naive_local()))
}

pub fn create_task(
    store: &dyn Store,
    user_id: i32,
    create_req: CreateTaskRequest,
) -> Result<i32, ServiceError> {
    let name = required_text(create_req.name, "name")?;
    let date = required_text(create_req.date, "date")?;
    let priority = required_text(create_req.priority, "priority")?;

    let priority: Priority = priority.parse().map_err(ServiceError::BadRequest)?;
    if parse_date(&date).is_none() {
        return Err(ServiceError::BadRequest(format!(
            "Invalid date '{}', expected YYYY-MM-DD",
            date
        )));
    }
    let time = optional_text(create_req.time);
    if let Some(ref t) = time {
        if parse_time(t).is_none() {
            return Err(ServiceError::BadRequest(format!(
                "Invalid time '{}', expected HH:MM",
                t
            )));
        }
    }

    let new_task = NewTask {
        user_id,
        name,
        date,
        time,
        priority: priority.to_string(),
        workload: optional_text(create_req.workload),
        completed: false,
    };
    let id = store.create_task(&new_task)?;
    log::debug!("user {} created task {}", user_id, id);
    Ok(id)
}

pub fn set_completion(
    store: &dyn Store,
    user_id: i32,
    update_req: UpdateTaskRequest,
) -> Result<Task, ServiceError> {
    let task_id = required(update_req.id, "id")?;
    let completed = required(update_req.completed, "completed")?;
    store.set_task_completion(task_id, user_id, completed)
}

pub fn delete_task(store: &dyn Store, task_id: i32, user_id: Option<i32>) -> Result<(), ServiceError> {
    let owner_id = required(user_id, "userId")?;
    store.delete_task(task_id, owner_id)
}

pub fn share_task(store: &dyn Store, share_req: ShareTaskRequest) -> Result<usize, ServiceError> {
    let task_id = required(share_req.task_id, "taskId")?;
    let owner_id = required(share_req.owner_id, "ownerId")?;
    let requested = share_req.shared_with_ids.unwrap_or_default();
    if requested.is_empty() {
        return Err(ServiceError::bad_request(
            "sharedWithIds must be a non-empty array of user ids",
        ));
    }

    // Keep first occurrence order, drop repeats
    let mut seen = HashSet::new();
    let recipients: Vec<i32> = requested.into_iter().filter(|id| seen.insert(*id)).collect();

    let shared = store.share_task(task_id, owner_id, &recipients)?;
    log::info!("task {} shared by user {} with {} friend(s)", task_id, owner_id, shared);
    Ok(shared)
}

pub fn list_shared_tasks(store: &dyn Store, user_id: i32) -> Result<Vec<SharedTaskView>, ServiceError> {
    store.list_shared_tasks(user_id)
}

/// Deletes the shared task itself, for its owner and every recipient.
pub fn delete_shared_task(store: &dyn Store, task_id: i32) -> Result<(), ServiceError> {
    store.delete_shared_task(task_id)?;
    log::warn!("shared task {} deleted together with all of its grants", task_id);
    Ok(())
}
