//! Errors reported by the workflow controller.
//!
//! None of these represent a failure of the simulated work itself. They
//! describe requests the controller refused without touching any state.

use thiserror::Error;

use super::step::StepStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("a workflow run is already in progress")]
    AlreadyRunning,

    #[error("no step is waiting for confirmation")]
    NotAwaitingConfirmation,

    #[error("confirmation code must be exactly {expected} digits")]
    InvalidCode { expected: usize },

    #[error("step '{step}' cannot move from {from} to {to}")]
    InvalidTransition {
        step: String,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("workflow invariant violated: {0}")]
    InvariantViolated(String),
}
