use chrono::NaiveDate;

use super::capture::CaptureStatus;
use super::event::CalendarEvent;
use super::state::{AppState, View};
use super::task::{Plan, Task, TaskStatus};

/// Partial task update: `id` selects the task, every `Some` field is
/// merged in. `project_id`/`event_id` are doubly optional so a patch can
/// distinguish "leave alone" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub plan: Option<Plan>,
    pub frog: Option<bool>,
    pub project_id: Option<Option<String>>,
    pub event_id: Option<Option<String>>,
    pub time_spent: Option<u64>,
}

impl TaskPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn status(id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::new(id)
        }
    }

    /// A pure status flip. Status-only edits never propagate into a
    /// linked event, so completing a meeting task leaves the meeting
    /// untouched.
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.title.is_none()
            && self.plan.is_none()
            && self.frog.is_none()
            && self.project_id.is_none()
            && self.event_id.is_none()
            && self.time_spent.is_none()
    }
}

/// Partial event update: `id` selects the event, every `Some` field is
/// merged in.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub id: String,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub note: Option<Option<String>>,
}

impl EventPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Everything the UI layer can ask the reducer to do.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the whole state with an already-migrated snapshot.
    InitState(AppState),

    // Navigation
    SetView(View),

    // Captures
    AddCapture(String),
    ProcessCapture { id: String, status: CaptureStatus },
    DeleteCapture(String),

    // Tasks
    AddTask(Task),
    UpdateTask(TaskPatch),
    DeleteTask(String),

    // Events
    AddEvent(CalendarEvent),
    UpdateEvent(EventPatch),
    DeleteEvent(String),

    // Focus timer
    SetActiveTask {
        id: Option<String>,
        /// Millisecond epoch start; defaults to dispatch time when absent.
        started_at: Option<i64>,
    },

    // Per-day ordering
    UpdateTaskOrder { day: NaiveDate, order: Vec<String> },

    // Whole-state replacement
    ImportData(serde_json::Value),
    ResetData,
}
