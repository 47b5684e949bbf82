//! scholarsync-core: planner domain types, stores, and study analytics.

pub mod analytics;
pub mod categories;
pub mod goal;
pub mod snapshot;
pub mod task;
pub mod task_store;

pub use analytics::{StudyPoint, Timeframe, study_data};
pub use categories::{CategorySet, DEFAULT_CATEGORIES};
pub use goal::DailyGoal;
pub use snapshot::PlannerSnapshot;
pub use task::{Priority, Status, Task, TaskDraft};
pub use task_store::TaskStore;
