//! Daily study goal: hours logged today against a target.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    /// Never negative; every write path clamps.
    #[serde(default)]
    pub current: i32,
    #[serde(default = "default_target")]
    pub target: i32,
}

fn default_target() -> i32 {
    4
}

impl Default for DailyGoal {
    fn default() -> Self {
        Self { current: 0, target: 4 }
    }
}

impl DailyGoal {
    pub fn set_current(&mut self, current: i32) {
        self.current = current.max(0);
    }

    /// The target is deliberately unconstrained.
    pub fn set_target(&mut self, target: i32) {
        self.target = target;
    }
}
