//! Task model for the planner core.
//!
//! Wire field names stay camelCase (`dueDate`, `completedAt`) because the same
//! document is read and written by every client attached to a user's store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Core task type.
///
/// Invariant: `completed_at` is present exactly when `status == Done`. The
/// store's create/update operations maintain this; callers never set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,

    /// Category label. May dangle after the category itself is removed.
    pub course: String,

    /// Calendar date only; drives weekly/monthly placement.
    pub due_date: NaiveDate,

    pub status: Status,
    pub priority: Priority,

    /// Estimated minutes. Documents written by older clients may omit this.
    #[serde(default = "default_duration")]
    pub duration: u32,

    /// Stamped on the transition into Done, cleared on the transition out.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub progress: Option<u8>,
}

pub(crate) fn default_duration() -> u32 {
    60
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Minutes for analytics. A zero duration (legacy documents) counts as the
    /// 60-minute default, matching how such tasks were always summed.
    pub fn effective_duration(&self) -> u32 {
        if self.duration == 0 { 60 } else { self.duration }
    }
}

/// Everything the caller supplies at creation time; the store mints the id and
/// derives `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub course: String,
    pub due_date: NaiveDate,
    pub status: Status,
    pub priority: Priority,
    /// `None` and `Some(0)` both mean "unset".
    pub duration: Option<u32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub progress: Option<u8>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, course: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            course: course.into(),
            due_date,
            status: Status::ToDo,
            priority: Priority::Medium,
            duration: None,
            description: None,
            tags: Vec::new(),
            progress: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
