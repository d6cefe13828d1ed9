//! Rotation lifecycle: start, hand off, complete.
//!
//! ```text
//! Idle --start--> Active --next--> HandingOff --> Idle
//!                        --done--> HandingOff --> Completed
//! ```
//!
//! The session is the only piece of state that survives between
//! invocations. It is read once when a hand-off begins and cleared before
//! the mob tool moves the driver on, so it never names a replaced driver.

mod orchestrator;

pub use orchestrator::{HandoffOutcome, HandoffRequest, Orchestrator, StartRequest};

/// Where the rotation state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Idle,
    Active,
    HandingOff,
    Completed,
}

impl std::fmt::Display for RotationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RotationState::Idle => "idle",
            RotationState::Active => "active",
            RotationState::HandingOff => "handing off",
            RotationState::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}
