//! Simulated workflow: step catalog, run state and the progression controller.

pub mod catalog;
pub mod clock;
pub mod controller;
pub mod error;
pub mod event;
pub mod run;
pub mod step;

pub use catalog::{WorkflowTimings, GATED_STEP_INDEX, RESPONSE_TEXT, STEP_COUNT};
pub use clock::{Clock, ManualClock, TokioClock};
pub use controller::WorkflowController;
pub use error::WorkflowError;
pub use event::WorkflowEvent;
pub use run::WorkflowRun;
pub use step::{Step, StepKind, StepStatus};
