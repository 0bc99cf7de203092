//! The fixed step catalog and completion text.

use std::time::Duration;

use super::step::{Step, StepKind};

/// Index of the security verification step
pub const GATED_STEP_INDEX: usize = 2;

/// Number of steps in every run
pub const STEP_COUNT: usize = 5;

/// Text produced once every step has completed
pub const RESPONSE_TEXT: &str = "Workflow executed successfully! All security protocols have been followed, and the requested operation has been completed. Your data has been processed and is ready for review. System integrity verified.";

/// Simulated latencies for the timed steps and the post-response settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTimings {
    pub auth: Duration,
    pub data: Duration,
    pub execution: Duration,
    pub completion: Duration,
    /// Delay between the response appearing and the run going idle
    pub settle: Duration,
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            auth: Duration::from_millis(2000),
            data: Duration::from_millis(3000),
            execution: Duration::from_millis(3000),
            completion: Duration::from_millis(1500),
            settle: Duration::from_millis(3000),
        }
    }
}

/// Build the five workflow steps in order
pub fn default_steps(timings: &WorkflowTimings) -> Vec<Step> {
    let steps = vec![
        Step::new("auth", "Authentication Check", StepKind::Timed(timings.auth))
            .with_description("Verifying user credentials and permissions"),
        Step::new("data", "Data Processing", StepKind::Timed(timings.data))
            .with_description("Analyzing and processing requested information")
            .with_sub_steps(&[
                "Fetching user data",
                "Validating permissions",
                "Processing request",
            ]),
        Step::new("security", "Security Verification", StepKind::Gated)
            .with_description("Multi-factor authentication required"),
        Step::new("execution", "Task Execution", StepKind::Timed(timings.execution))
            .with_description("Performing the requested operation")
            .with_sub_steps(&[
                "Initializing systems",
                "Executing commands",
                "Validating results",
            ]),
        Step::new("completion", "Workflow Complete", StepKind::Timed(timings.completion))
            .with_description("Finalizing and preparing response"),
    ];
    debug_assert_eq!(steps.len(), STEP_COUNT);
    steps
}
