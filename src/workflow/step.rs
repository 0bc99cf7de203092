//! Workflow steps and their status transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::error::WorkflowError;

/// Lifecycle status of a single step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Loading,
    Complete,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Loading => "loading",
            StepStatus::Complete => "complete",
        }
    }

    /// Whether this is the status of the step currently being worked on
    pub fn is_in_progress(&self) -> bool {
        matches!(self, StepStatus::Active | StepStatus::Loading)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Completes on its own after the delay
    Timed(Duration),
    /// Stays `Loading` until an external confirmation arrives
    Gated,
}

impl StepKind {
    /// Status a step of this kind takes when it becomes current
    pub fn in_progress_status(&self) -> StepStatus {
        match self {
            StepKind::Timed(_) => StepStatus::Active,
            StepKind::Gated => StepStatus::Loading,
        }
    }
}

/// Valid forward transitions, keyed by step kind.
///
/// Returning to `Pending` is not listed: only a whole-run reset does that.
const TIMED_TRANSITIONS: &[(StepStatus, StepStatus)] = &[
    (StepStatus::Pending, StepStatus::Active),
    (StepStatus::Active, StepStatus::Complete),
];

const GATED_TRANSITIONS: &[(StepStatus, StepStatus)] = &[
    (StepStatus::Pending, StepStatus::Loading),
    (StepStatus::Loading, StepStatus::Complete),
];

/// Check the transition table for a step kind
pub fn can_transition(kind: StepKind, from: StepStatus, to: StepStatus) -> bool {
    let table = match kind {
        StepKind::Timed(_) => TIMED_TRANSITIONS,
        StepKind::Gated => GATED_TRANSITIONS,
    };
    table.iter().any(|&(f, t)| f == from && t == to)
}

/// One stage of the simulated workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub sub_steps: Vec<String>,
    pub kind: StepKind,
    status: StepStatus,
}

impl Step {
    pub fn new(id: &str, title: &str, kind: StepKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            sub_steps: Vec::new(),
            kind,
            status: StepStatus::Pending,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: &[&str]) -> Self {
        self.sub_steps = sub_steps.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Timer delay before this step completes, `None` for the gated step
    pub fn delay(&self) -> Option<Duration> {
        match self.kind {
            StepKind::Timed(delay) => Some(delay),
            StepKind::Gated => None,
        }
    }

    /// Move to `to` if the transition table allows it
    pub fn transition(&mut self, to: StepStatus) -> Result<(), WorkflowError> {
        if !can_transition(self.kind, self.status, to) {
            return Err(WorkflowError::InvalidTransition {
                step: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Begin work on this step (`Active` or `Loading` depending on kind)
    pub fn begin(&mut self) -> Result<(), WorkflowError> {
        self.transition(self.kind.in_progress_status())
    }

    pub fn complete(&mut self) -> Result<(), WorkflowError> {
        self.transition(StepStatus::Complete)
    }

    pub(crate) fn reset(&mut self) {
        self.status = StepStatus::Pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed() -> Step {
        Step::new("auth", "Authentication Check", StepKind::Timed(Duration::from_millis(2000)))
    }

    #[test]
    fn test_timed_step_lifecycle() {
        let mut step = timed();
        assert_eq!(step.status(), StepStatus::Pending);

        step.begin().unwrap();
        assert_eq!(step.status(), StepStatus::Active);

        step.complete().unwrap();
        assert_eq!(step.status(), StepStatus::Complete);
    }

    #[test]
    fn test_gated_step_lifecycle() {
        let mut step = Step::new("security", "Security Verification", StepKind::Gated);

        step.begin().unwrap();
        assert_eq!(step.status(), StepStatus::Loading);

        step.complete().unwrap();
        assert_eq!(step.status(), StepStatus::Complete);
    }

    #[test]
    fn test_timed_step_rejects_loading() {
        let mut step = timed();
        let err = step.transition(StepStatus::Loading).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                step: "auth".to_string(),
                from: StepStatus::Pending,
                to: StepStatus::Loading,
            }
        );
        assert_eq!(step.status(), StepStatus::Pending);
    }

    #[test]
    fn test_cannot_skip_to_complete() {
        let mut step = timed();
        assert!(step.complete().is_err());

        let mut gated = Step::new("security", "Security Verification", StepKind::Gated);
        assert!(gated.complete().is_err());
    }

    #[test]
    fn test_no_backward_transitions() {
        for kind in [StepKind::Timed(Duration::ZERO), StepKind::Gated] {
            for from in [StepStatus::Active, StepStatus::Loading, StepStatus::Complete] {
                assert!(!can_transition(kind, from, StepStatus::Pending));
            }
            assert!(!can_transition(kind, StepStatus::Complete, StepStatus::Active));
            assert!(!can_transition(kind, StepStatus::Complete, StepStatus::Loading));
        }
    }

    #[test]
    fn test_reset_returns_to_pending() {
        let mut step = timed();
        step.begin().unwrap();
        step.complete().unwrap();
        step.reset();
        assert_eq!(step.status(), StepStatus::Pending);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Loading).unwrap(),
            "\"loading\""
        );
        assert_eq!(StepStatus::Complete.to_string(), "complete");
    }
}
