use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Where a task is scheduled.
///
/// `day` set means scheduled for a specific day; only `week` set means
/// bucketed to a week without a day; neither means unscheduled. A
/// day-scheduled task normally also carries the week string derived
/// from that day so week views see it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub day: Option<NaiveDate>,
    pub week: Option<String>,
}

impl Plan {
    pub fn none() -> Self {
        Self::default()
    }

    /// Day schedule with the matching ISO week string.
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            day: Some(day),
            week: Some(super::temporal::week_of(day)),
        }
    }

    pub fn for_week(week: impl Into<String>) -> Self {
        Self {
            day: None,
            week: Some(week.into()),
        }
    }
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub plan: Plan,
    /// "Eat the frog": the one do-first task of the day.
    pub frog: bool,
    pub project_id: Option<String>,
    /// Back-reference to the calendar event that spawned this task.
    pub event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Accumulated seconds of focused work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
}

impl Task {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: TaskStatus::Todo,
            plan: Plan::none(),
            frog: false,
            project_id: None,
            event_id: None,
            created_at: now,
            updated_at: now,
            time_spent: None,
        }
    }

    /// True if the task is still open and scheduled for a day before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_done() && self.plan.day.is_some_and(|day| day < today)
    }
}
