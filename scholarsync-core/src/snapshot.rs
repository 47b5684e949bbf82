//! PlannerSnapshot — the per-user persisted triple.
//!
//! One remote document holds the whole dataset; it is read and written
//! atomically, and no entity is individually addressable remotely.

use crate::categories::CategorySet;
use crate::goal::DailyGoal;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSnapshot {
    pub tasks: Vec<Task>,
    pub categories: CategorySet,
    pub daily_goal: DailyGoal,
}

impl PlannerSnapshot {
    /// Lenient decode of a remote document.
    ///
    /// A missing or malformed field falls back to its type default; a
    /// malformed element of the tasks array is dropped rather than poisoning
    /// the tasks that do parse. Documents written by older clients are the
    /// reason this is not a plain `Deserialize`.
    pub fn from_value(value: &Value) -> Self {
        let tasks = value
            .get("tasks")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let categories = value
            .get("categories")
            .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok())
            .map(CategorySet::from_names)
            .unwrap_or_default();

        let daily_goal = value
            .get("dailyGoal")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        Self {
            tasks,
            categories,
            daily_goal,
        }
    }

    /// Wire encoding. Optional fields serialize as explicit nulls so a merge
    /// write overwrites stale remote values instead of leaving them behind.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::DEFAULT_CATEGORIES;
    use serde_json::json;

    #[test]
    fn empty_document_decodes_to_defaults() {
        let snap = PlannerSnapshot::from_value(&json!({}));
        assert!(snap.tasks.is_empty());
        assert_eq!(snap.categories.names(), &DEFAULT_CATEGORIES.map(String::from));
        assert_eq!(snap.daily_goal, DailyGoal { current: 0, target: 4 });
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let snap = PlannerSnapshot::from_value(&json!({
            "tasks": "not an array",
            "categories": ["Physics"],
            "dailyGoal": {"current": 1, "target": 6}
        }));
        assert!(snap.tasks.is_empty());
        assert_eq!(snap.categories.names(), ["Physics".to_string()]);
        assert_eq!(snap.daily_goal, DailyGoal { current: 1, target: 6 });
    }

    #[test]
    fn malformed_task_elements_are_dropped_not_fatal() {
        let snap = PlannerSnapshot::from_value(&json!({
            "tasks": [
                {"bogus": true},
                {
                    "id": "t1",
                    "title": "Problem set",
                    "course": "Mathematics",
                    "dueDate": "2026-08-10",
                    "status": "To Do",
                    "priority": "Medium"
                }
            ]
        }));
        assert_eq!(snap.tasks.len(), 1);
        assert_eq!(snap.tasks[0].id, "t1");
    }

    #[test]
    fn wire_encoding_round_trips() {
        let snap = PlannerSnapshot::from_value(&json!({
            "tasks": [{
                "id": "t1",
                "title": "Problem set",
                "course": "Mathematics",
                "dueDate": "2026-08-10",
                "status": "Done",
                "priority": "High",
                "duration": 30,
                "completedAt": "2026-08-06T10:00:00Z"
            }]
        }));
        let value = snap.to_value().unwrap();
        assert_eq!(PlannerSnapshot::from_value(&value), snap);
        // Field names stay camelCase on the wire.
        assert!(value.get("dailyGoal").is_some());
        assert!(value["tasks"][0].get("dueDate").is_some());
    }
}
