//! TaskStore — ordered in-memory task collection.
//!
//! Owns the `completed_at` invariant and duration normalization so callers
//! can't get either wrong. Insertion order is preserved for stable rendering;
//! nothing else depends on it.

use crate::task::{Status, Task, TaskDraft};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

/// Unset or zero falls back to the 60-minute default; anything else is floored
/// at 5 minutes, the smallest estimate the planner accepts.
fn normalize_duration(minutes: Option<u32>) -> u32 {
    match minutes {
        None | Some(0) => 60,
        Some(m) => m.max(5),
    }
}

fn nonzero(minutes: u32) -> Option<u32> {
    (minutes != 0).then_some(minutes)
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Mint a fresh id, derive `completed_at` from the draft's status, and
    /// append. Returns the stored task.
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> &Task {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            course: draft.course,
            due_date: draft.due_date,
            status: draft.status,
            priority: draft.priority,
            duration: normalize_duration(draft.duration),
            completed_at: (draft.status == Status::Done).then_some(now),
            description: draft.description,
            tags: draft.tags,
            progress: draft.progress,
        };
        self.tasks.push(task);
        self.tasks.last().expect("task was just pushed")
    }

    /// Replace the task with a matching id.
    ///
    /// `completed_at` is recomputed against the stored task, never taken from
    /// the caller: entering Done stamps `now` (also when the stored stamp is
    /// somehow missing), leaving Done clears, staying put preserves the stamp.
    /// Unknown ids change nothing and return false.
    pub fn update(&mut self, incoming: Task, now: DateTime<Utc>) -> bool {
        let Some(stored) = self.tasks.iter_mut().find(|t| t.id == incoming.id) else {
            return false;
        };

        let completed_at = if incoming.status == Status::Done
            && (stored.status != Status::Done || stored.completed_at.is_none())
        {
            Some(now)
        } else if incoming.status != Status::Done && stored.status == Status::Done {
            None
        } else {
            stored.completed_at
        };

        let duration = normalize_duration(nonzero(incoming.duration).or(nonzero(stored.duration)));

        *stored = Task {
            completed_at,
            duration,
            ..incoming
        };
        true
    }

    /// Remove by id; unknown ids are a no-op returning false.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Wholesale replacement from a remote snapshot. Remote data is
    /// authoritative, so no invariant rewriting happens here.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Case-insensitive substring match over title and course.
    pub fn search(&self, query: &str) -> Vec<&Task> {
        let q = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&q) || t.course.to_lowercase().contains(&q))
            .collect()
    }

    pub fn with_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn with_course(&self, course: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.course == course).collect()
    }

    /// Tasks placed on a calendar day by due date.
    pub fn due_on(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.due_date == date).collect()
    }

    /// Not-Done tasks, soonest due date first. Feeds the "upcoming" list.
    pub fn open_by_due_date(&self) -> Vec<&Task> {
        let mut open: Vec<&Task> = self.tasks.iter().filter(|t| !t.is_done()).collect();
        open.sort_by_key(|t| t.due_date);
        open
    }

    /// Not-Done tasks due strictly before today.
    pub fn overdue(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.is_done() && t.due_date < today)
            .collect()
    }

    /// Not-Done tasks due exactly today.
    pub fn due_today(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.is_done() && t.due_date == today)
            .collect()
    }
}
