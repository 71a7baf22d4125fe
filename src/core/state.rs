use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::capture::Capture;
use super::event::CalendarEvent;
use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Today,
    Week,
    Inbox,
    Events,
    Settings,
    Done,
    Statistics,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Inbox => "inbox",
            Self::Events => "events",
            Self::Settings => "settings",
            Self::Done => "done",
            Self::Statistics => "statistics",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "inbox" => Some(Self::Inbox),
            "events" => Some(Self::Events),
            "settings" => Some(Self::Settings),
            "done" => Some(Self::Done),
            "statistics" => Some(Self::Statistics),
            _ => None,
        }
    }
}

/// The whole persisted application snapshot.
///
/// Mutated exclusively by the reducer; serialized verbatim by the
/// persistence adapter. `active_task_started_at` is non-null iff
/// `active_task_id` is non-null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub captures: Vec<Capture>,
    pub tasks: Vec<Task>,
    pub events: Vec<CalendarEvent>,
    pub active_task_id: Option<String>,
    /// Millisecond epoch timestamp when the active task was started.
    pub active_task_started_at: Option<i64>,
    pub last_active_view: View,
    /// Per-day ordering overlay: day -> ordered task ids. May reference
    /// ids that no longer exist or are scheduled elsewhere; reconciled
    /// at read time by [`AppState::ordered_tasks_for_day`].
    pub task_order_by_day: BTreeMap<NaiveDate, Vec<String>>,
    /// Unused by the reducer; carried through persistence untouched.
    pub task_order_by_week_bucket: BTreeMap<String, Vec<String>>,
}

impl AppState {
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_event(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Elapsed seconds for the active task as of `now_ms`: the task's
    /// accumulated `time_spent` plus the running span since the timer
    /// started. Only pausing or completing commits this back into the
    /// task, so no periodic state writes are needed.
    pub fn active_elapsed_secs(&self, now_ms: i64) -> Option<u64> {
        let id = self.active_task_id.as_deref()?;
        let started_at = self.active_task_started_at?;
        let base = self.find_task(id).and_then(|t| t.time_spent).unwrap_or(0);
        let running = (now_ms - started_at).max(0) as u64 / 1000;
        Some(base + running)
    }

    /// Tasks planned for `day` in display order: the saved order filtered
    /// to tasks that still exist and are still planned for that day, then
    /// any unlisted tasks appended in storage order.
    pub fn ordered_tasks_for_day(&self, day: NaiveDate) -> Vec<&Task> {
        let planned: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.plan.day == Some(day))
            .collect();
        let saved = self.task_order_by_day.get(&day);

        let mut ordered: Vec<&Task> = Vec::with_capacity(planned.len());
        if let Some(order) = saved {
            for id in order {
                if let Some(task) = planned.iter().copied().find(|t| &t.id == id) {
                    if !ordered.iter().any(|t| t.id == task.id) {
                        ordered.push(task);
                    }
                }
            }
        }
        for task in planned {
            if !ordered.iter().any(|t| t.id == task.id) {
                ordered.push(task);
            }
        }
        ordered
    }
}
