use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use super::task::{Plan, Task};

static TIME_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<time>\d{2}:\d{2})\s+(?P<title>.+)$").unwrap());

/// A fixed date+time appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Wall-clock time as `HH:MM`.
    pub time: String,
    pub note: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            date,
            time: time.into(),
            note: None,
        }
    }

    /// Title for the linked task: the event time prefixed to the event
    /// title, e.g. `"09:00 Dentist"`.
    pub fn task_title(&self) -> String {
        format!("{} {}", self.time, self.title)
    }

    /// Spawn the linked task for this event, scheduled on the event date.
    pub fn spawn_task(&self, now: DateTime<Utc>) -> Task {
        let mut task = Task::new(self.task_title(), now);
        task.plan = Plan::for_day(self.date);
        task.event_id = Some(self.id.clone());
        task
    }
}

/// Split a task title into its leading `HH:MM` time prefix and the rest.
///
/// Linked-task titles are the event time followed by the event title;
/// task edits are pushed back into the event by re-parsing this prefix.
/// A title that happens to start with a time-like pattern for unrelated
/// reasons is indistinguishable from the convention, so callers fall
/// back to date-only propagation when no prefix is found.
pub fn split_time_prefix(title: &str) -> Option<(&str, &str)> {
    TIME_PREFIX_RE.captures(title).map(|caps| {
        let time = caps.name("time").unwrap().as_str();
        let rest = caps.name("title").unwrap().as_str();
        (time, rest)
    })
}
