//! Read-only aggregation over the task list for the statistics view.
//!
//! A task counts toward a period if its plan places it there or it was
//! completed (status `done`, read off `updated_at`) within it. The
//! bucketed chart series count completed tasks only.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::core::task::Task;
use crate::core::temporal::{week_days, week_of};

/// Aggregate counters for one reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub todo_tasks: usize,
    /// Summed `time_spent` across completed tasks, in seconds.
    pub total_time_spent: u64,
    pub frogs_planned: usize,
    pub frogs_completed: usize,
}

/// One bucket of a time series: completed work in a calendar unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBucket {
    /// `YYYY-MM-DD`, `YYYY-Www`, `YYYY-MM`, or `YYYY`.
    pub period: String,
    pub completed: usize,
    pub time_spent: u64,
    pub frogs_completed: usize,
}

fn collect<'a>(tasks: impl Iterator<Item = &'a Task>) -> Stats {
    let mut stats = Stats::default();
    for task in tasks {
        stats.total_tasks += 1;
        if task.frog {
            stats.frogs_planned += 1;
        }
        if task.status.is_done() {
            stats.completed_tasks += 1;
            stats.total_time_spent += task.time_spent.unwrap_or(0);
            if task.frog {
                stats.frogs_completed += 1;
            }
        } else {
            stats.todo_tasks += 1;
        }
    }
    stats
}

fn completed_on(task: &Task, day: NaiveDate) -> bool {
    task.status.is_done() && task.updated_at.date_naive() == day
}

/// Tasks planned for or completed today.
pub fn today_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    collect(
        tasks
            .iter()
            .filter(|t| t.plan.day == Some(today) || completed_on(t, today)),
    )
}

/// Tasks planned for or completed in the current ISO week. Week-bucketed
/// tasks (week set, no day) belong via their week string.
pub fn week_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    let current_week = week_of(today);
    let days = week_days(today);
    collect(tasks.iter().filter(|t| {
        t.plan.week.as_deref() == Some(current_week.as_str())
            || t.plan.day.is_some_and(|day| days.contains(&day))
            || (t.status.is_done() && days.contains(&t.updated_at.date_naive()))
    }))
}

/// Tasks planned for or completed in the current calendar month.
pub fn month_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    let in_month =
        |d: NaiveDate| d.year() == today.year() && d.month() == today.month();
    collect(tasks.iter().filter(|t| {
        t.plan.day.is_some_and(|d| in_month(d))
            || (t.status.is_done() && in_month(t.updated_at.date_naive()))
    }))
}

/// Tasks planned for or completed in the current calendar year.
pub fn year_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    let in_year = |d: NaiveDate| d.year() == today.year();
    collect(tasks.iter().filter(|t| {
        t.plan.day.is_some_and(|d| in_year(d))
            || (t.status.is_done() && in_year(t.updated_at.date_naive()))
    }))
}

pub fn all_time_stats(tasks: &[Task]) -> Stats {
    collect(tasks.iter())
}

fn bucket<'a>(
    tasks: impl Iterator<Item = &'a Task>,
    label: impl Fn(NaiveDate) -> String,
) -> BTreeMap<String, PeriodBucket> {
    let mut buckets: BTreeMap<String, PeriodBucket> = BTreeMap::new();
    for task in tasks.filter(|t| t.status.is_done()) {
        let period = label(task.updated_at.date_naive());
        let entry = buckets.entry(period.clone()).or_insert(PeriodBucket {
            period,
            completed: 0,
            time_spent: 0,
            frogs_completed: 0,
        });
        entry.completed += 1;
        entry.time_spent += task.time_spent.unwrap_or(0);
        if task.frog {
            entry.frogs_completed += 1;
        }
    }
    buckets
}

/// Seven buckets, Monday..Sunday of the current ISO week, including
/// empty days so charts keep a fixed x-axis.
pub fn daily_series_for_week(tasks: &[Task], today: NaiveDate) -> Vec<PeriodBucket> {
    let days = week_days(today);
    let mut buckets = bucket(
        tasks
            .iter()
            .filter(|t| days.contains(&t.updated_at.date_naive())),
        |d| d.to_string(),
    );
    days.iter()
        .map(|day| {
            let period = day.to_string();
            buckets.remove(&period).unwrap_or(PeriodBucket {
                period,
                completed: 0,
                time_spent: 0,
                frogs_completed: 0,
            })
        })
        .collect()
}

/// ISO-week buckets of completions in the current calendar month.
pub fn weekly_series_for_month(tasks: &[Task], today: NaiveDate) -> Vec<PeriodBucket> {
    let in_month =
        |d: NaiveDate| d.year() == today.year() && d.month() == today.month();
    bucket(
        tasks
            .iter()
            .filter(|t| in_month(t.updated_at.date_naive())),
        week_of,
    )
    .into_values()
    .collect()
}

/// Twelve month buckets of the current year, including empty months.
pub fn monthly_series_for_year(tasks: &[Task], today: NaiveDate) -> Vec<PeriodBucket> {
    let mut buckets = bucket(
        tasks
            .iter()
            .filter(|t| t.updated_at.date_naive().year() == today.year()),
        |d| format!("{}-{:02}", d.year(), d.month()),
    );
    (1..=12)
        .map(|month| {
            let period = format!("{}-{:02}", today.year(), month);
            buckets.remove(&period).unwrap_or(PeriodBucket {
                period,
                completed: 0,
                time_spent: 0,
                frogs_completed: 0,
            })
        })
        .collect()
}

/// One bucket per year with at least one completion, oldest first.
pub fn yearly_series(tasks: &[Task]) -> Vec<PeriodBucket> {
    bucket(tasks.iter(), |d| d.year().to_string())
        .into_values()
        .collect()
}
