//! Normalizes arbitrary persisted or imported JSON into a valid
//! current-shape [`AppState`].
//!
//! Runs at boot on whatever the persistence adapter hands back and on
//! explicit import. Never fails: unrecognized or wrong-typed fields are
//! discarded and replaced with defaults, retired fields are stripped,
//! and unfinished day-scheduled tasks from the past are carried over
//! onto today.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::core::capture::{Capture, CaptureStatus};
use crate::core::event::CalendarEvent;
use crate::core::state::{AppState, View};
use crate::core::task::{Plan, Task, TaskStatus};
use crate::core::temporal::week_of;

/// Build a valid state from any JSON value.
pub fn migrate(raw: &Value, now: DateTime<Utc>) -> AppState {
    let mut state = AppState::default();
    let Some(obj) = raw.as_object() else {
        return state;
    };

    state.captures = array_of(obj.get("captures"))
        .iter()
        .map(|v| migrate_capture(v, now))
        .collect();
    state.tasks = array_of(obj.get("tasks"))
        .iter()
        .map(|v| migrate_task(v, now))
        .collect();
    state.events = array_of(obj.get("events"))
        .iter()
        .map(|v| migrate_event(v, now))
        .collect();

    carry_over(&mut state.tasks, now.date_naive());

    state.active_task_id = obj
        .get("activeTaskId")
        .and_then(Value::as_str)
        .map(str::to_string);
    state.active_task_started_at = obj.get("activeTaskStartedAt").and_then(Value::as_i64);
    // The timer invariant: both set or neither. A half-set pair from an
    // old or hand-edited snapshot is cleared rather than guessed at.
    if state.active_task_id.is_none() || state.active_task_started_at.is_none() {
        state.active_task_id = None;
        state.active_task_started_at = None;
    }

    state.last_active_view = migrate_view(obj.get("lastActiveView"));

    if let Some(orders) = obj.get("taskOrderByDay").and_then(Value::as_object) {
        for (key, value) in orders {
            let Some(day) = parse_date(key) else { continue };
            state.task_order_by_day.insert(day, id_list(value));
        }
    }
    if let Some(orders) = obj.get("taskOrderByWeekBucket").and_then(Value::as_object) {
        for (key, value) in orders {
            state
                .task_order_by_week_bucket
                .insert(key.clone(), id_list(value));
        }
    }

    state
}

/// Unfinished day-scheduled tasks from the past roll forward onto today.
fn carry_over(tasks: &mut [Task], today: NaiveDate) {
    for task in tasks {
        if task.is_overdue(today) {
            task.plan = Plan {
                day: Some(today),
                week: Some(week_of(today)),
            };
        }
    }
}

fn migrate_task(raw: &Value, now: DateTime<Utc>) -> Task {
    // Building the typed struct field-by-field also strips retired
    // fields like `difficulty`.
    let obj = raw.as_object();
    let get = |key: &str| obj.and_then(|o| o.get(key));

    let status = match get("status").and_then(Value::as_str) {
        Some("done") => TaskStatus::Done,
        _ => TaskStatus::Todo,
    };
    let plan_obj = get("plan").and_then(Value::as_object);
    let plan = Plan {
        day: plan_obj
            .and_then(|p| p.get("day"))
            .and_then(Value::as_str)
            .and_then(parse_date),
        week: plan_obj
            .and_then(|p| p.get("week"))
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    Task {
        id: string_or_fresh_id(get("id")),
        title: get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        status,
        plan,
        // Strict-equality-true: anything not literally `true` is false.
        frog: matches!(get("frog"), Some(Value::Bool(true))),
        project_id: get("projectId").and_then(Value::as_str).map(str::to_string),
        event_id: get("eventId").and_then(Value::as_str).map(str::to_string),
        created_at: datetime_or(get("createdAt"), now),
        updated_at: datetime_or(get("updatedAt"), now),
        time_spent: get("timeSpent").and_then(Value::as_u64),
    }
}

fn migrate_capture(raw: &Value, now: DateTime<Utc>) -> Capture {
    let obj = raw.as_object();
    let get = |key: &str| obj.and_then(|o| o.get(key));

    let status = match get("status").and_then(Value::as_str) {
        Some("processed") => CaptureStatus::Processed,
        Some("archived") => CaptureStatus::Archived,
        _ => CaptureStatus::New,
    };

    Capture {
        id: string_or_fresh_id(get("id")),
        text: get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at: datetime_or(get("createdAt"), now),
        status,
    }
}

fn migrate_event(raw: &Value, now: DateTime<Utc>) -> CalendarEvent {
    let obj = raw.as_object();
    let get = |key: &str| obj.and_then(|o| o.get(key));

    CalendarEvent {
        id: string_or_fresh_id(get("id")),
        title: get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        date: get("date")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .unwrap_or_else(|| now.date_naive()),
        time: get("time")
            .and_then(Value::as_str)
            .unwrap_or("00:00")
            .to_string(),
        note: get("note").and_then(Value::as_str).map(str::to_string),
    }
}

fn migrate_view(raw: Option<&Value>) -> View {
    match raw.and_then(Value::as_str) {
        // The standalone focus view was folded into the today view.
        Some("focus") => View::Today,
        Some(name) => View::from_name(name).unwrap_or_default(),
        None => View::default(),
    }
}

fn array_of(raw: Option<&Value>) -> &[Value] {
    raw.and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn id_list(raw: &Value) -> Vec<String> {
    array_of(Some(raw))
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn string_or_fresh_id(raw: Option<&Value>) -> String {
    raw.and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn datetime_or(raw: Option<&Value>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn tolerates_arbitrary_json_values() {
        let junk = [
            json!(null),
            json!(42),
            json!("state"),
            json!(true),
            json!([1, 2, 3]),
            json!({"tasks": 7, "captures": "nope", "events": {"a": 1}}),
            json!({"tasks": [null, 42, [], {"plan": "tuesday"}]}),
            json!({"activeTaskId": [], "activeTaskStartedAt": "soon"}),
            json!({"taskOrderByDay": [1, 2], "lastActiveView": {}}),
        ];
        for value in &junk {
            let state = migrate(value, t0());
            // Structurally valid: it serializes and re-migrates cleanly.
            let round = serde_json::to_value(&state).unwrap();
            assert_eq!(migrate(&round, t0()), state);
        }
    }

    #[test]
    fn strips_retired_difficulty_field() {
        let raw = json!({
            "tasks": [{"title": "x", "difficulty": "hard"}],
            "captures": [],
        });
        let state = migrate(&raw, t0());
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].title, "x");
        assert_eq!(state.tasks[0].status, TaskStatus::Todo);
        assert!(!state.tasks[0].frog);
        assert!(!state.tasks[0].id.is_empty());

        let serialized = serde_json::to_value(&state.tasks[0]).unwrap();
        assert!(serialized.get("difficulty").is_none());
    }

    #[test]
    fn task_defaults_per_field() {
        let raw = json!({"tasks": [{
            "title": "typed wrong",
            "status": "paused",
            "frog": "true",
            "plan": {"day": "not-a-date", "week": 3},
            "timeSpent": 90,
        }]});
        let state = migrate(&raw, t0());
        let task = &state.tasks[0];
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(!task.frog, "frog must be literally true to survive");
        assert_eq!(task.plan, Plan::none());
        assert_eq!(task.project_id, None);
        assert_eq!(task.event_id, None);
        assert_eq!(task.time_spent, Some(90));
        assert_eq!(task.created_at, t0());
        assert_eq!(task.updated_at, t0());
    }

    #[test]
    fn carry_over_rolls_stale_todo_tasks_onto_today() {
        let raw = json!({"tasks": [
            {"title": "stale", "status": "todo",
             "plan": {"day": "2025-03-01", "week": "2025-W09"}},
            {"title": "done long ago", "status": "done",
             "plan": {"day": "2025-03-01", "week": "2025-W09"}},
            {"title": "future", "status": "todo",
             "plan": {"day": "2025-03-20", "week": "2025-W12"}},
            {"title": "week bucket only", "status": "todo",
             "plan": {"day": null, "week": "2025-W09"}},
        ]});
        let state = migrate(&raw, t0());
        assert_eq!(state.tasks[0].plan.day, Some(d(2025, 3, 10)));
        assert_eq!(state.tasks[0].plan.week.as_deref(), Some("2025-W11"));
        // Completed tasks keep their history.
        assert_eq!(state.tasks[1].plan.day, Some(d(2025, 3, 1)));
        // Future and week-only plans are untouched.
        assert_eq!(state.tasks[2].plan.day, Some(d(2025, 3, 20)));
        assert_eq!(state.tasks[3].plan.day, None);
        assert_eq!(state.tasks[3].plan.week.as_deref(), Some("2025-W09"));
    }

    #[test]
    fn migration_is_idempotent() {
        let raw = json!({"tasks": [
            {"id": "a", "title": "stale", "status": "todo",
             "plan": {"day": "2025-03-01", "week": "2025-W09"},
             "createdAt": "2025-03-01T08:00:00Z", "updatedAt": "2025-03-01T08:00:00Z"},
        ]});
        let once = migrate(&raw, t0());
        let twice = migrate(&serde_json::to_value(&once).unwrap(), t0());
        assert_eq!(once, twice);
    }

    #[test]
    fn valid_state_round_trips_unchanged() {
        let mut state = AppState::default();
        let mut task = Task::new("future", t0());
        task.plan = Plan::for_day(d(2025, 3, 20));
        task.time_spent = Some(300);
        state.tasks.push(task);
        state.captures.push(Capture::new("note", t0()));
        state
            .events
            .push(CalendarEvent::new("Dentist", d(2025, 3, 10), "09:00"));
        state.last_active_view = View::Week;
        state
            .task_order_by_day
            .insert(d(2025, 3, 20), vec![state.tasks[0].id.clone()]);
        state
            .task_order_by_week_bucket
            .insert("2025-W12".into(), vec![state.tasks[0].id.clone()]);

        let raw = serde_json::to_value(&state).unwrap();
        assert_eq!(migrate(&raw, t0()), state);
    }

    #[test]
    fn capture_status_must_be_processed_or_archived_to_pass() {
        let raw = json!({"captures": [
            {"text": "a", "status": "processed"},
            {"text": "b", "status": "archived"},
            {"text": "c", "status": "shredded"},
            {"text": "d"},
        ]});
        let state = migrate(&raw, t0());
        assert_eq!(state.captures[0].status, CaptureStatus::Processed);
        assert_eq!(state.captures[1].status, CaptureStatus::Archived);
        assert_eq!(state.captures[2].status, CaptureStatus::New);
        assert_eq!(state.captures[3].status, CaptureStatus::New);
    }

    #[test]
    fn event_defaults() {
        let raw = json!({"events": [
            {"title": "no date or time"},
            {"title": "bad date", "date": "someday", "time": "25:99"},
        ]});
        let state = migrate(&raw, t0());
        assert_eq!(state.events[0].date, d(2025, 3, 10));
        assert_eq!(state.events[0].time, "00:00");
        assert_eq!(state.events[0].note, None);
        // Defaulting, not validation: a present string passes through.
        assert_eq!(state.events[1].time, "25:99");
    }

    #[test]
    fn retired_focus_view_maps_to_today() {
        let focus = json!({"lastActiveView": "focus"});
        assert_eq!(migrate(&focus, t0()).last_active_view, View::Today);

        let unknown = json!({"lastActiveView": "dashboard"});
        assert_eq!(migrate(&unknown, t0()).last_active_view, View::Today);

        let known = json!({"lastActiveView": "statistics"});
        assert_eq!(migrate(&known, t0()).last_active_view, View::Statistics);
    }

    #[test]
    fn task_order_keys_must_be_dates_entries_must_be_strings() {
        let raw = json!({"taskOrderByDay": {
            "2025-03-10": ["a", 7, "b", null],
            "not a date": ["c"],
        }});
        let state = migrate(&raw, t0());
        assert_eq!(state.task_order_by_day.len(), 1);
        assert_eq!(
            state.task_order_by_day[&d(2025, 3, 10)],
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn week_bucket_order_passes_through() {
        let raw = json!({"taskOrderByWeekBucket": {"2025-W11": ["x", "y"]}});
        let state = migrate(&raw, t0());
        assert_eq!(
            state.task_order_by_week_bucket["2025-W11"],
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn half_set_active_task_pair_is_cleared() {
        let id_only = json!({"activeTaskId": "t1"});
        let state = migrate(&id_only, t0());
        assert_eq!(state.active_task_id, None);
        assert_eq!(state.active_task_started_at, None);

        let started_only = json!({"activeTaskStartedAt": 12345});
        let state = migrate(&started_only, t0());
        assert_eq!(state.active_task_id, None);
        assert_eq!(state.active_task_started_at, None);

        let both = json!({"activeTaskId": "t1", "activeTaskStartedAt": 12345});
        let state = migrate(&both, t0());
        assert_eq!(state.active_task_id.as_deref(), Some("t1"));
        assert_eq!(state.active_task_started_at, Some(12345));
    }
}
