//! State of a single workflow run.

use uuid::Uuid;

use super::catalog::GATED_STEP_INDEX;
use super::error::WorkflowError;
use super::step::{Step, StepStatus};

/// Observable workflow state, read by renderers.
///
/// Only the controller mutates it.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub(super) run_id: Option<Uuid>,
    pub(super) steps: Vec<Step>,
    pub(super) current_index: Option<usize>,
    pub(super) is_running: bool,
    pub(super) pending_confirmation: bool,
    pub(super) response: Option<String>,
    pub(super) is_revealing: bool,
}

impl WorkflowRun {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            run_id: None,
            steps,
            current_index: None,
            is_running: false,
            pending_confirmation: false,
            response: None,
            is_revealing: false,
        }
    }

    /// Id of the most recently started run
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn pending_confirmation(&self) -> bool {
        self.pending_confirmation
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn is_revealing(&self) -> bool {
        self.is_revealing
    }

    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(Step::status).collect()
    }

    /// Sub-steps to display for a step: only the current, `Active` step shows them
    pub fn visible_sub_steps(&self, index: usize) -> &[String] {
        match self.steps.get(index) {
            Some(step)
                if self.current_index == Some(index) && step.status() == StepStatus::Active =>
            {
                &step.sub_steps
            }
            _ => &[],
        }
    }

    /// Put every step back to `Pending` and clear run outputs
    pub(super) fn clear(&mut self) {
        for step in &mut self.steps {
            step.reset();
        }
        self.current_index = None;
        self.is_running = false;
        self.pending_confirmation = false;
        self.response = None;
        self.is_revealing = false;
    }

    /// Check the structural invariants of the run
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let violation = |msg: String| Err(WorkflowError::InvariantViolated(msg));

        let in_progress: Vec<usize> = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status().is_in_progress())
            .map(|(i, _)| i)
            .collect();

        if in_progress.len() > 1 {
            return violation(format!("steps {:?} are all in progress", in_progress));
        }
        if let Some(&i) = in_progress.first() {
            if self.current_index != Some(i) {
                return violation(format!(
                    "step {} is in progress but current index is {:?}",
                    i, self.current_index
                ));
            }
        }

        if let Some(current) = self.current_index {
            if current >= self.steps.len() {
                return violation(format!("current index {} out of range", current));
            }
            if self.is_running {
                for (i, step) in self.steps.iter().enumerate() {
                    let ok = match i.cmp(&current) {
                        std::cmp::Ordering::Less => step.status() == StepStatus::Complete,
                        std::cmp::Ordering::Greater => step.status() == StepStatus::Pending,
                        std::cmp::Ordering::Equal => true,
                    };
                    if !ok {
                        return violation(format!(
                            "step {} is {} with current index {}",
                            i,
                            step.status(),
                            current
                        ));
                    }
                }
            }
        }

        if self.pending_confirmation {
            let gated_loading = self
                .steps
                .get(GATED_STEP_INDEX)
                .is_some_and(|s| s.status() == StepStatus::Loading);
            if !gated_loading {
                return violation("confirmation pending but gated step is not loading".into());
            }
        }

        if self.response.is_some()
            && !self.steps.iter().all(|s| s.status() == StepStatus::Complete)
        {
            return violation("response set before all steps completed".into());
        }

        Ok(())
    }
}
