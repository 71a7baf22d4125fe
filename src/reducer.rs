//! The pure state-transition function.
//!
//! `reduce` is total over the action vocabulary: unknown ids are
//! no-ops, nothing panics for well-formed actions, and the input state
//! is never mutated. Input validation (non-empty titles, legal date
//! strings) is the dispatching layer's job, not the reducer's.

use chrono::{DateTime, Utc};

use crate::core::action::{Action, EventPatch, TaskPatch};
use crate::core::capture::Capture;
use crate::core::event::split_time_prefix;
use crate::core::state::AppState;
use crate::core::task::Plan;
use crate::migrate::migrate;

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: &AppState, action: Action, now: DateTime<Utc>) -> AppState {
    let mut next = state.clone();
    match action {
        Action::InitState(snapshot) => return snapshot,
        Action::SetView(view) => next.last_active_view = view,
        Action::AddCapture(text) => {
            next.captures.insert(0, Capture::new(text, now));
        }
        Action::ProcessCapture { id, status } => {
            if let Some(capture) = next.captures.iter_mut().find(|c| c.id == id) {
                capture.status = status;
            }
        }
        Action::DeleteCapture(id) => next.captures.retain(|c| c.id != id),
        Action::AddTask(task) => next.tasks.push(task),
        Action::UpdateTask(patch) => update_task(&mut next, patch, now),
        Action::DeleteTask(id) => remove_task(&mut next, &id),
        Action::AddEvent(event) => next.events.push(event),
        Action::UpdateEvent(patch) => update_event(&mut next, patch, now),
        Action::DeleteEvent(id) => {
            next.events.retain(|e| e.id != id);
            // At most one task links back; cascade-delete it.
            let linked: Vec<String> = next
                .tasks
                .iter()
                .filter(|t| t.event_id.as_deref() == Some(id.as_str()))
                .map(|t| t.id.clone())
                .collect();
            for task_id in linked {
                remove_task(&mut next, &task_id);
            }
        }
        Action::SetActiveTask { id, started_at } => match id {
            Some(id) => {
                next.active_task_id = Some(id);
                next.active_task_started_at =
                    Some(started_at.unwrap_or_else(|| now.timestamp_millis()));
            }
            None => {
                next.active_task_id = None;
                next.active_task_started_at = None;
            }
        },
        Action::UpdateTaskOrder { day, order } => {
            next.task_order_by_day.insert(day, order);
        }
        Action::ImportData(raw) => return migrate(&raw, now),
        Action::ResetData => return AppState::default(),
    }
    next
}

fn update_task(state: &mut AppState, patch: TaskPatch, now: DateTime<Utc>) {
    let status_only = patch.is_status_only();
    let Some(task) = state.tasks.iter_mut().find(|t| t.id == patch.id) else {
        return;
    };

    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(plan) = patch.plan {
        task.plan = plan;
    }
    if let Some(frog) = patch.frog {
        task.frog = frog;
    }
    if let Some(project_id) = patch.project_id {
        task.project_id = project_id;
    }
    if let Some(event_id) = patch.event_id {
        task.event_id = event_id;
    }
    if let Some(time_spent) = patch.time_spent {
        task.time_spent = Some(time_spent);
    }
    task.updated_at = now;

    // Substantive edits flow forward into the linked event; a pure
    // status flip never does, so completing an event task leaves the
    // event alone. This path only writes event fields, so no edit loop.
    if status_only {
        return;
    }
    let Some(event_id) = task.event_id.clone() else {
        return;
    };
    let title = task.title.clone();
    let day = task.plan.day;
    if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
        if let Some((time, rest)) = split_time_prefix(&title) {
            event.time = time.to_string();
            event.title = rest.to_string();
        }
        if let Some(day) = day {
            event.date = day;
        }
    }
}

fn update_event(state: &mut AppState, patch: EventPatch, now: DateTime<Utc>) {
    let Some(event) = state.events.iter_mut().find(|e| e.id == patch.id) else {
        return;
    };
    if let Some(title) = patch.title {
        event.title = title;
    }
    if let Some(date) = patch.date {
        event.date = date;
    }
    if let Some(time) = patch.time {
        event.time = time;
    }
    if let Some(note) = patch.note {
        event.note = note;
    }

    // Event edits always push into the linked task.
    let task_title = event.task_title();
    let date = event.date;
    let event_id = event.id.clone();
    if let Some(task) = state
        .tasks
        .iter_mut()
        .find(|t| t.event_id.as_deref() == Some(event_id.as_str()))
    {
        task.title = task_title;
        task.plan = Plan::for_day(date);
        task.updated_at = now;
    }
}

/// Remove a task and every reference the state keeps to it: active-task
/// bookkeeping and per-day order lists.
fn remove_task(state: &mut AppState, id: &str) {
    state.tasks.retain(|t| t.id != id);
    if state.active_task_id.as_deref() == Some(id) {
        state.active_task_id = None;
        state.active_task_started_at = None;
    }
    for order in state.task_order_by_day.values_mut() {
        order.retain(|tid| tid != id);
    }
}
