//! Study-time analytics: bucket completed work into day/week/month series.
//!
//! Pure function of (tasks, timeframe, now) — same inputs, same output. The
//! caller passes `now` so charts are reproducible in tests without a clock.

use crate::task::{Status, Task};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

/// One chart bucket: label plus study hours, rounded to one decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPoint {
    pub label: String,
    pub hours: f64,
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Time-bucketed hours of completed work, oldest bucket first.
///
/// Only Done tasks count. A task lands in the bucket of its `completed_at`
/// date, falling back to `due_date` for documents that predate completion
/// stamping. All bucketing is on the UTC calendar of `now`.
pub fn study_data(tasks: &[Task], timeframe: Timeframe, now: DateTime<Utc>) -> Vec<StudyPoint> {
    let done: Vec<&Task> = tasks.iter().filter(|t| t.status == Status::Done).collect();
    let today = now.date_naive();

    match timeframe {
        Timeframe::Daily => daily(&done, today),
        Timeframe::Weekly => weekly(&done, today),
        Timeframe::Monthly => monthly(&done, today),
    }
}

fn bucket_date(task: &Task) -> NaiveDate {
    task.completed_at
        .map(|at| at.date_naive())
        .unwrap_or(task.due_date)
}

fn to_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

fn sum_minutes<'a>(done: &[&'a Task], matches: impl Fn(NaiveDate) -> bool) -> u64 {
    done.iter()
        .filter(|t| matches(bucket_date(t)))
        .map(|t| u64::from(t.effective_duration()))
        .sum()
}

/// 7 buckets, one per calendar day ending today; labels are short weekday names.
fn daily(done: &[&Task], today: NaiveDate) -> Vec<StudyPoint> {
    (0..7)
        .rev()
        .map(|i| {
            let day = today - Duration::days(i);
            StudyPoint {
                label: day.format("%a").to_string(),
                hours: to_hours(sum_minutes(done, |d| d == day)),
            }
        })
        .collect()
}

/// 4 rolling 7-day windows ending today - 7i days, whole-day inclusive bounds.
fn weekly(done: &[&Task], today: NaiveDate) -> Vec<StudyPoint> {
    (0..4)
        .rev()
        .map(|i| {
            let end = today - Duration::days(7 * i);
            let start = end - Duration::days(6);
            let label = match i {
                0 => "This Wk".to_string(),
                1 => "Last Wk".to_string(),
                n => format!("{n} Wks Ago"),
            };
            StudyPoint {
                label,
                hours: to_hours(sum_minutes(done, |d| d >= start && d <= end)),
            }
        })
        .collect()
}

/// 6 buckets matched by (year, month) equality, ending with the current month.
fn monthly(done: &[&Task], today: NaiveDate) -> Vec<StudyPoint> {
    (0..6)
        .rev()
        .map(|i| {
            let (year, month) = months_back(today, i);
            StudyPoint {
                label: MONTH_ABBREV[(month - 1) as usize].to_string(),
                hours: to_hours(sum_minutes(done, |d| {
                    d.year() == year && d.month() == month
                })),
            }
        })
        .collect()
}

fn months_back(today: NaiveDate, back: u32) -> (i32, u32) {
    let total = today.year() * 12 + today.month0() as i32 - back as i32;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskDraft};
    use crate::task_store::TaskStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // A Thursday.
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    fn done_task(store: &mut TaskStore, minutes: u32, completed: DateTime<Utc>) {
        store.create(
            TaskDraft::new("study", "General", completed.date_naive())
                .with_status(Status::Done)
                .with_duration(minutes)
                .with_priority(Priority::Low),
            completed,
        );
    }

    #[test]
    fn daily_today_bucket_sums_durations_to_hours() {
        let mut store = TaskStore::new();
        done_task(&mut store, 30, now());
        done_task(&mut store, 60, now());
        done_task(&mut store, 90, now());
        // Not done: must not count.
        store.create(TaskDraft::new("open", "General", now().date_naive()), now());

        let data = study_data(store.tasks(), Timeframe::Daily, now());
        assert_eq!(data.len(), 7);
        assert_eq!(data[6].hours, 3.0);
        assert_eq!(data[6].label, "Thu");
        assert_eq!(data[0].label, "Fri");
        assert_eq!(data[0].hours, 0.0);
    }

    #[test]
    fn weekly_labels_run_oldest_to_newest() {
        let data = study_data(&[], Timeframe::Weekly, now());
        let labels: Vec<&str> = data.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["3 Wks Ago", "2 Wks Ago", "Last Wk", "This Wk"]);
    }

    #[test]
    fn weekly_windows_have_inclusive_whole_day_bounds() {
        let mut store = TaskStore::new();
        // Exactly 7 days back: first day of the "This Wk" window minus one,
        // i.e. the last day of the "Last Wk" window.
        done_task(&mut store, 60, now() - Duration::days(7));
        // 6 days back: oldest day still inside "This Wk".
        done_task(&mut store, 30, now() - Duration::days(6));

        let data = study_data(store.tasks(), Timeframe::Weekly, now());
        assert_eq!(data[3].hours, 0.5); // This Wk
        assert_eq!(data[2].hours, 1.0); // Last Wk
    }

    #[test]
    fn monthly_crosses_year_boundaries() {
        let january = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let mut store = TaskStore::new();
        done_task(&mut store, 120, january);
        done_task(
            &mut store,
            60,
            Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap(),
        );

        let data = study_data(store.tasks(), Timeframe::Monthly, january);
        let labels: Vec<&str> = data.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Aug", "Sep", "Oct", "Nov", "Dec", "Jan"]);
        assert_eq!(data[0].hours, 1.0);
        assert_eq!(data[5].hours, 2.0);
    }

    #[test]
    fn falls_back_to_due_date_when_stamp_is_missing() {
        // Simulates a document written before completion stamping existed.
        let task: Task = serde_json::from_str(
            r#"{"id":"t","title":"old","course":"General","dueDate":"2026-08-06",
                "status":"Done","priority":"Low","duration":45}"#,
        )
        .unwrap();

        let data = study_data(&[task], Timeframe::Daily, now());
        assert_eq!(data[6].hours, 0.8);
    }

    #[test]
    fn same_inputs_same_output() {
        let mut store = TaskStore::new();
        done_task(&mut store, 50, now());
        let first = study_data(store.tasks(), Timeframe::Weekly, now());
        let second = study_data(store.tasks(), Timeframe::Weekly, now());
        assert_eq!(first, second);
    }
}
