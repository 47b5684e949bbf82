//! PlannerSession — the sync reconciler.
//!
//! Owns the in-memory planner state for one signed-in user and mirrors it
//! into that user's remote document. Every mutation passes through one
//! origin-tagged choke point: local origins arm the debounced push, remote
//! origins (snapshot application) never do, so a delivered snapshot cannot
//! echo back out as a write.
//!
//! The session is synchronous and clock-injected: mutators take `now`, and
//! the embedding runtime calls `poll(now)` (see `next_poll_at`) to let a due
//! push happen. No timers or async runtime; everything is deterministic
//! under test.

use crate::identity::Identity;
use crate::legacy::LegacySnapshots;
use crate::remote::{DocumentStore, SnapshotEvent, StoreError, WriteMode};
use chrono::{DateTime, Duration, Utc};
use scholarsync_core::{
    CategorySet, DailyGoal, PlannerSnapshot, StudyPoint, Task, TaskDraft, TaskStore, Timeframe,
    analytics,
};
use std::fmt;
use tracing::{debug, error, warn};

/// Quiet period after the last local mutation before the snapshot is pushed.
pub const DEBOUNCE_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No identity; nothing subscribed, nothing to push.
    Detached,
    /// Identity present, first snapshot not yet delivered.
    Attaching,
    Synced,
    /// A local change is waiting out the debounce window.
    Syncing,
    /// Last read or write failed. Re-entrant: any later success returns to
    /// Synced.
    Error,
}

/// The three-valued status the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncIndicator {
    Synced,
    Syncing,
    Error,
}

impl SyncState {
    pub fn indicator(self) -> SyncIndicator {
        match self {
            SyncState::Detached | SyncState::Synced => SyncIndicator::Synced,
            SyncState::Attaching | SyncState::Syncing => SyncIndicator::Syncing,
            SyncState::Error => SyncIndicator::Error,
        }
    }
}

/// User-visible report of a sync problem, drained via `take_notices`.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Remote read failed; in-memory state was left untouched.
    LoadFailed {
        permission_denied: bool,
        detail: String,
    },
    /// Remote write failed; the local mutation is kept (local-first).
    SaveFailed {
        permission_denied: bool,
        detail: String,
    },
    /// The legacy snapshot was unreadable; the planner started from defaults.
    MigrationFailed { detail: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed {
                permission_denied: true,
                ..
            } => write!(f, "You don't have permission to load this planner."),
            Notice::LoadFailed { detail, .. } => {
                write!(f, "Couldn't load your planner: {detail}")
            }
            Notice::SaveFailed {
                permission_denied: true,
                ..
            } => write!(f, "You don't have permission to save this planner."),
            Notice::SaveFailed { detail, .. } => {
                write!(f, "Couldn't save your changes: {detail}")
            }
            Notice::MigrationFailed { detail } => {
                write!(f, "Couldn't import your locally saved planner: {detail}")
            }
        }
    }
}

/// Who initiated a state change. Pushes are armed by pattern-matching on
/// this, not by a consumable side flag.
enum Origin {
    Local { now: DateTime<Utc> },
    Remote,
}

pub struct PlannerSession<S: DocumentStore, L: LegacySnapshots> {
    remote: S,
    legacy: L,

    identity: Option<Identity>,
    /// Subscription generation. Bumped on every attach/detach; deliveries
    /// carrying an older epoch belong to a cancelled subscription and are
    /// dropped.
    epoch: u64,
    /// True once the first snapshot (or read failure) has been handled.
    /// Pushes never run before then, so a half-attached session can't
    /// merge-write its empty state over real remote data.
    loaded: bool,

    tasks: TaskStore,
    categories: CategorySet,
    daily_goal: DailyGoal,

    sync: SyncState,
    push_due: Option<DateTime<Utc>>,
    debounce: Duration,
    notices: Vec<Notice>,
}

impl<S: DocumentStore, L: LegacySnapshots> PlannerSession<S, L> {
    pub fn new(remote: S, legacy: L) -> Self {
        Self {
            remote,
            legacy,
            identity: None,
            epoch: 0,
            loaded: false,
            tasks: TaskStore::new(),
            categories: CategorySet::default(),
            daily_goal: DailyGoal::default(),
            sync: SyncState::Detached,
            push_due: None,
            debounce: Duration::milliseconds(DEBOUNCE_MS),
            notices: Vec::new(),
        }
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Subscribe to `identity`'s remote document. Any previous attachment is
    /// torn down first; its in-flight deliveries become stale by epoch.
    pub fn attach(&mut self, identity: Identity) {
        if self.identity.is_some() {
            self.detach();
        }
        self.epoch += 1;
        debug!(user = %identity.id, epoch = self.epoch, "attaching planner session");
        self.remote.subscribe(&identity.id, self.epoch);
        self.identity = Some(identity);
        self.sync = SyncState::Attaching;
    }

    /// Unsubscribe, discard in-memory state, cancel any pending push.
    pub fn detach(&mut self) {
        if let Some(identity) = self.identity.take() {
            debug!(user = %identity.id, epoch = self.epoch, "detaching planner session");
            self.remote.unsubscribe(self.epoch);
        }
        self.epoch += 1;
        self.loaded = false;
        self.push_due = None;
        self.tasks = TaskStore::new();
        self.categories = CategorySet::default();
        self.daily_goal = DailyGoal::default();
        self.sync = SyncState::Detached;
    }

    /// Drive attach/detach from the identity provider's current value.
    /// Call on every identity-change notification.
    pub fn sync_identity(&mut self, current: Option<Identity>) {
        let unchanged = match (&self.identity, &current) {
            (Some(have), Some(seen)) => have.id == seen.id,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.detach();
        if let Some(identity) = current {
            self.attach(identity);
        }
    }

    /// Feed one subscription delivery in. `epoch` must be the value the
    /// delivering subscription was created with.
    pub fn handle_snapshot(&mut self, epoch: u64, event: SnapshotEvent) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale snapshot delivery");
            return;
        }
        let Some(identity) = self.identity.clone() else {
            return;
        };

        match event {
            SnapshotEvent::Document(value) => {
                self.apply_remote(PlannerSnapshot::from_value(&value));
                self.sync = SyncState::Synced;
            }
            SnapshotEvent::Missing => self.first_attach(&identity),
            SnapshotEvent::Failed(err) => {
                error!(user = %identity.id, %err, "remote snapshot delivery failed");
                self.notices.push(Notice::LoadFailed {
                    permission_denied: err.is_permission_denied(),
                    detail: err.to_string(),
                });
                // The app must stay interactive on whatever state we have.
                self.loaded = true;
                self.sync = SyncState::Error;
            }
        }
    }

    /// First-ever login for this user: migrate the legacy local snapshot if
    /// one exists, otherwise start from defaults.
    fn first_attach(&mut self, identity: &Identity) {
        match self.legacy.take(&identity.id) {
            Ok(Some(value)) => {
                debug!(user = %identity.id, "migrating legacy snapshot to the remote store");
                let normalized = PlannerSnapshot::from_value(&value);
                match self.write_snapshot(&identity.id, &normalized, WriteMode::Replace) {
                    // The subscription echoes the migrated document back;
                    // state is applied then, not here.
                    Ok(()) => {}
                    Err(err) => {
                        error!(user = %identity.id, %err, "legacy migration write failed");
                        self.notices.push(Notice::SaveFailed {
                            permission_denied: err.is_permission_denied(),
                            detail: err.to_string(),
                        });
                        self.sync = SyncState::Error;
                    }
                }
            }
            Ok(None) => {
                self.apply_remote(PlannerSnapshot::default());
                self.sync = SyncState::Synced;
            }
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(user = %identity.id, error = %detail, "legacy snapshot unreadable; starting from defaults");
                self.notices.push(Notice::MigrationFailed { detail });
                self.apply_remote(PlannerSnapshot::default());
                self.sync = SyncState::Synced;
            }
        }
    }

    fn apply_remote(&mut self, snapshot: PlannerSnapshot) {
        self.apply(Origin::Remote, |s| {
            s.tasks.replace_all(snapshot.tasks);
            s.categories = snapshot.categories;
            s.daily_goal = snapshot.daily_goal;
            // The snapshot is the newest truth; a push armed by an older
            // local change would only echo it back.
            s.push_due = None;
            (true, ())
        });
        self.loaded = true;
    }

    fn apply<T>(&mut self, origin: Origin, mutate: impl FnOnce(&mut Self) -> (bool, T)) -> T {
        let (changed, out) = mutate(self);
        match origin {
            Origin::Local { now } if changed => self.arm_push(now),
            Origin::Local { .. } | Origin::Remote => {}
        }
        out
    }

    fn arm_push(&mut self, now: DateTime<Utc>) {
        // Nothing to push to while signed out, and never before the first
        // snapshot has been handled.
        if self.identity.is_none() || !self.loaded {
            return;
        }
        self.push_due = Some(now + self.debounce);
        self.sync = SyncState::Syncing;
    }

    pub fn add_task(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> String {
        self.apply(Origin::Local { now }, |s| {
            let id = s.tasks.create(draft, now).id.clone();
            (true, id)
        })
    }

    pub fn update_task(&mut self, task: Task, now: DateTime<Utc>) -> bool {
        self.apply(Origin::Local { now }, |s| {
            let changed = s.tasks.update(task, now);
            (changed, changed)
        })
    }

    pub fn delete_task(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        self.apply(Origin::Local { now }, |s| {
            let changed = s.tasks.delete(id);
            (changed, changed)
        })
    }

    /// Wipe tasks, restore default categories, reset the daily goal.
    /// Confirmation is the UI's responsibility.
    pub fn clear_all_data(&mut self, now: DateTime<Utc>) {
        self.apply(Origin::Local { now }, |s| {
            s.tasks.clear();
            s.categories.reset();
            s.daily_goal = DailyGoal::default();
            (true, ())
        })
    }

    pub fn add_category(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        self.apply(Origin::Local { now }, |s| {
            let changed = s.categories.add(name);
            (changed, changed)
        })
    }

    pub fn remove_category(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        self.apply(Origin::Local { now }, |s| {
            let changed = s.categories.remove(name);
            (changed, changed)
        })
    }

    pub fn set_goal_target(&mut self, target: i32, now: DateTime<Utc>) {
        self.apply(Origin::Local { now }, |s| {
            let before = s.daily_goal;
            s.daily_goal.set_target(target);
            (s.daily_goal != before, ())
        })
    }

    pub fn set_goal_current(&mut self, current: i32, now: DateTime<Utc>) {
        self.apply(Origin::Local { now }, |s| {
            let before = s.daily_goal;
            s.daily_goal.set_current(current);
            (s.daily_goal != before, ())
        })
    }

    /// When the embedding runtime should next call `poll`. `None` while no
    /// push is pending.
    pub fn next_poll_at(&self) -> Option<DateTime<Utc>> {
        self.push_due
    }

    /// Perform the pending push once its deadline has passed. Failure keeps
    /// the local state and clears the deadline: the next local mutation is
    /// the retry path.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        let Some(due) = self.push_due else { return };
        if now < due {
            return;
        }
        self.push_due = None;
        let Some(identity) = self.identity.clone() else {
            return;
        };

        let snapshot = self.snapshot();
        debug!(user = %identity.id, tasks = snapshot.tasks.len(), "pushing planner snapshot");
        match self.write_snapshot(&identity.id, &snapshot, WriteMode::Merge) {
            Ok(()) => self.sync = SyncState::Synced,
            Err(err) => {
                error!(user = %identity.id, %err, "planner push failed");
                self.notices.push(Notice::SaveFailed {
                    permission_denied: err.is_permission_denied(),
                    detail: err.to_string(),
                });
                self.sync = SyncState::Error;
            }
        }
    }

    fn write_snapshot(
        &mut self,
        key: &str,
        snapshot: &PlannerSnapshot,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let document = snapshot.to_value().map_err(StoreError::from)?;
        self.remote.write(key, &document, mode)
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn daily_goal(&self) -> DailyGoal {
        self.daily_goal
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn indicator(&self) -> SyncIndicator {
        self.sync.indicator()
    }

    /// Current epoch, for adapters that install the transport subscription.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            tasks: self.tasks.tasks().to_vec(),
            categories: self.categories.clone(),
            daily_goal: self.daily_goal,
        }
    }

    pub fn study_data(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Vec<StudyPoint> {
        analytics::study_data(self.tasks.tasks(), timeframe, now)
    }

    /// Drain queued user-visible notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::NoLegacySnapshots;
    use chrono::TimeZone;
    use scholarsync_core::DEFAULT_CATEGORIES;
    use serde_json::Value;

    #[derive(Default)]
    struct NullStore;

    impl DocumentStore for NullStore {
        fn subscribe(&mut self, _key: &str, _epoch: u64) {}
        fn unsubscribe(&mut self, _epoch: u64) {}
        fn write(&mut self, _key: &str, _doc: &Value, _mode: WriteMode) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn at(s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, s).unwrap()
    }

    fn session() -> PlannerSession<NullStore, NoLegacySnapshots> {
        PlannerSession::new(NullStore, NoLegacySnapshots)
    }

    #[test]
    fn indicator_collapses_to_three_values() {
        assert_eq!(SyncState::Detached.indicator(), SyncIndicator::Synced);
        assert_eq!(SyncState::Attaching.indicator(), SyncIndicator::Syncing);
        assert_eq!(SyncState::Synced.indicator(), SyncIndicator::Synced);
        assert_eq!(SyncState::Syncing.indicator(), SyncIndicator::Syncing);
        assert_eq!(SyncState::Error.indicator(), SyncIndicator::Error);
    }

    #[test]
    fn mutating_while_detached_is_local_only() {
        let mut s = session();
        s.add_task(
            TaskDraft::new("t", "General", at(0).date_naive()),
            at(0),
        );
        assert_eq!(s.tasks().len(), 1);
        assert_eq!(s.next_poll_at(), None);
        assert_eq!(s.sync_state(), SyncState::Detached);
    }

    #[test]
    fn no_change_mutations_do_not_arm_a_push() {
        let mut s = session();
        s.attach(Identity::new("u1", "Ada", "ada@uni.edu"));
        s.handle_snapshot(s.epoch(), SnapshotEvent::Missing);
        assert_eq!(s.sync_state(), SyncState::Synced);

        assert!(!s.delete_task("no-such-id", at(1)));
        assert!(!s.add_category("Mathematics", at(1))); // already present
        s.set_goal_target(4, at(1)); // unchanged value
        assert_eq!(s.next_poll_at(), None);
        assert_eq!(s.sync_state(), SyncState::Synced);
    }

    #[test]
    fn clear_all_data_restores_defaults() {
        let mut s = session();
        s.attach(Identity::new("u1", "Ada", "ada@uni.edu"));
        s.handle_snapshot(s.epoch(), SnapshotEvent::Missing);

        s.add_task(TaskDraft::new("t", "General", at(0).date_naive()), at(0));
        s.add_category("Physics", at(0));
        s.set_goal_target(9, at(0));
        s.set_goal_current(3, at(0));

        s.clear_all_data(at(1));
        assert!(s.tasks().is_empty());
        assert_eq!(
            s.categories().names(),
            &DEFAULT_CATEGORIES.map(String::from)
        );
        assert_eq!(s.daily_goal(), DailyGoal::default());
    }

    #[test]
    fn removing_a_category_leaves_referencing_tasks_alone() {
        let mut s = session();
        s.attach(Identity::new("u1", "Ada", "ada@uni.edu"));
        s.handle_snapshot(s.epoch(), SnapshotEvent::Missing);

        let id = s.add_task(
            TaskDraft::new("integrals", "Mathematics", at(0).date_naive()),
            at(0),
        );
        assert!(s.remove_category("Mathematics", at(1)));

        // The label dangles on purpose and keeps rendering as-is.
        let task = s.tasks().get(&id).unwrap();
        assert_eq!(task.course, "Mathematics");
        assert_eq!(s.tasks().with_course("Mathematics").len(), 1);
        assert!(!s.categories().contains("Mathematics"));
    }

    #[test]
    fn goal_current_is_clamped_through_the_session() {
        let mut s = session();
        s.set_goal_current(-5, at(0));
        assert_eq!(s.daily_goal().current, 0);
    }

    #[test]
    fn notices_drain_once() {
        let mut s = session();
        s.attach(Identity::new("u1", "Ada", "ada@uni.edu"));
        s.handle_snapshot(
            s.epoch(),
            SnapshotEvent::Failed(StoreError::PermissionDenied),
        );
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            notices[0],
            Notice::LoadFailed {
                permission_denied: true,
                ..
            }
        ));
        assert!(s.take_notices().is_empty());
        assert_eq!(s.indicator(), SyncIndicator::Error);
    }
}
