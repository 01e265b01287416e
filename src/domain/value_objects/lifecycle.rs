//! Lifecycle state of an application identity
//!
//! ```text
//! Absent -> Deploying -> Live -> (Updating -> Live) | Undeploying -> Absent
//! ```
//!
//! A failed deploy returns `Deploying -> Absent`; a failed update returns
//! `Updating -> Live` with the previous context still registered.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Absent,
    Deploying,
    Live,
    Updating,
    Undeploying,
}

impl LifecycleState {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Absent, Deploying)
                | (Deploying, Live)
                | (Deploying, Absent)
                | (Live, Updating)
                | (Live, Undeploying)
                | (Updating, Live)
                | (Updating, Undeploying)
                | (Undeploying, Absent)
        )
    }

    /// A context in this state is visible to the request router.
    pub fn is_routable(self) -> bool {
        matches!(self, LifecycleState::Live | LifecycleState::Updating)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Absent => "absent",
            LifecycleState::Deploying => "deploying",
            LifecycleState::Live => "live",
            LifecycleState::Updating => "updating",
            LifecycleState::Undeploying => "undeploying",
        };
        f.write_str(name)
    }
}
