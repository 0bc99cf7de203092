//! Workflow progression controller.
//!
//! Advances the steps of a [`WorkflowRun`] against an injected [`Clock`].
//! At most one continuation is outstanding at a time and it lives in a single
//! slot, so clearing that slot on reset is enough to cancel the run.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::{default_steps, WorkflowTimings, GATED_STEP_INDEX, RESPONSE_TEXT};
use super::clock::Clock;
use super::error::WorkflowError;
use super::event::WorkflowEvent;
use super::run::WorkflowRun;
use super::step::Step;
use crate::otp;

/// Work the controller has scheduled for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    /// Timer for a timed step ran out
    CompleteStep(usize),
    /// Response reveal window is over
    Settle,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Duration,
    action: Continuation,
}

pub struct WorkflowController {
    clock: Arc<dyn Clock>,
    timings: WorkflowTimings,
    run: WorkflowRun,
    scheduled: Option<Scheduled>,
    events: Vec<WorkflowEvent>,
}

impl WorkflowController {
    /// Controller over the default step catalog
    pub fn new(clock: Arc<dyn Clock>, timings: WorkflowTimings) -> Self {
        let steps = default_steps(&timings);
        Self {
            clock,
            timings,
            run: WorkflowRun::new(steps),
            scheduled: None,
            events: Vec::new(),
        }
    }

    pub fn run(&self) -> &WorkflowRun {
        &self.run
    }

    pub fn steps(&self) -> &[Step] {
        self.run.steps()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.run.current_index()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    pub fn pending_confirmation(&self) -> bool {
        self.run.pending_confirmation()
    }

    pub fn response(&self) -> Option<&str> {
        self.run.response()
    }

    pub fn is_revealing(&self) -> bool {
        self.run.is_revealing()
    }

    pub fn visible_sub_steps(&self, index: usize) -> &[String] {
        self.run.visible_sub_steps(index)
    }

    pub fn timings(&self) -> &WorkflowTimings {
        &self.timings
    }

    /// Due time of the outstanding continuation, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduled.map(|s| s.due)
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<WorkflowEvent> {
        mem::take(&mut self.events)
    }

    /// Start a fresh run. Refused while a run is in progress.
    pub fn start(&mut self) -> Result<(), WorkflowError> {
        if self.run.is_running {
            debug!("Start ignored: workflow already running");
            return Err(WorkflowError::AlreadyRunning);
        }

        let now = self.clock.now();
        let run_id = Uuid::new_v4();

        self.scheduled = None;
        self.run.clear();
        self.run.run_id = Some(run_id);
        self.run.is_running = true;

        info!(%run_id, "Workflow started");
        self.events.push(WorkflowEvent::Started { run_id });

        self.activate(0, now)?;
        self.check();
        Ok(())
    }

    /// Submit the confirmation code for the gated step.
    ///
    /// Leaves state untouched unless the gate is pending and the code is
    /// exactly six digits.
    pub fn confirm(&mut self, code: &str) -> Result<(), WorkflowError> {
        if !self.run.pending_confirmation {
            debug!("Confirmation ignored: nothing is awaiting confirmation");
            return Err(WorkflowError::NotAwaitingConfirmation);
        }
        if !otp::is_valid_code(code) {
            debug!(length = code.len(), "Confirmation ignored: malformed code");
            return Err(WorkflowError::InvalidCode {
                expected: otp::CODE_LENGTH,
            });
        }

        let now = self.clock.now();
        self.run.pending_confirmation = false;
        self.complete_step(GATED_STEP_INDEX)?;

        if let Some(run_id) = self.run.run_id {
            info!(%run_id, "Security verification accepted");
            self.events.push(WorkflowEvent::ConfirmationAccepted { run_id });
        }

        self.activate(GATED_STEP_INDEX + 1, now)?;
        self.check();
        Ok(())
    }

    /// Cancel any scheduled work and return every step to `Pending`
    pub fn reset(&mut self) {
        if self.scheduled.take().is_some() {
            debug!("Cancelled outstanding continuation");
        }

        let was_active = self.run.is_running || self.run.response.is_some();
        self.run.clear();

        if was_active {
            if let Some(run_id) = self.run.run_id {
                info!(%run_id, "Workflow reset");
                self.events.push(WorkflowEvent::Reset { run_id });
            }
        }
        self.check();
    }

    /// Apply every continuation that is due. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        while let Some(scheduled) = self.scheduled.filter(|s| s.due <= now) {
            self.scheduled = None;
            if let Err(e) = self.fire(scheduled) {
                warn!("Dropping continuation {:?}: {}", scheduled.action, e);
            }
            fired += 1;
        }

        if fired > 0 {
            self.check();
        }
        fired
    }

    fn fire(&mut self, scheduled: Scheduled) -> Result<(), WorkflowError> {
        match scheduled.action {
            Continuation::CompleteStep(index) => {
                self.complete_step(index)?;
                self.activate(index + 1, scheduled.due)
            }
            Continuation::Settle => {
                self.run.is_revealing = false;
                self.run.is_running = false;
                self.run.current_index = None;
                if let Some(run_id) = self.run.run_id {
                    info!(%run_id, "Workflow settled");
                    self.events.push(WorkflowEvent::Settled { run_id });
                }
                Ok(())
            }
        }
    }

    /// Make `index` the current step, starting at time `at`
    fn activate(&mut self, index: usize, at: Duration) -> Result<(), WorkflowError> {
        let Some(step) = self.run.steps.get_mut(index) else {
            self.finish(at);
            return Ok(());
        };

        step.begin()?;
        self.run.current_index = Some(index);
        debug!(index, id = %step.id, status = %step.status(), "Step activated");
        self.events.push(WorkflowEvent::StepActivated {
            index,
            id: step.id.clone(),
            title: step.title.clone(),
        });

        match step.delay() {
            Some(delay) => {
                self.scheduled = Some(Scheduled {
                    due: at + delay,
                    action: Continuation::CompleteStep(index),
                });
            }
            None => {
                self.run.pending_confirmation = true;
                self.events.push(WorkflowEvent::AwaitingConfirmation {
                    index,
                    id: step.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn complete_step(&mut self, index: usize) -> Result<(), WorkflowError> {
        let step = self
            .run
            .steps
            .get_mut(index)
            .ok_or_else(|| WorkflowError::InvariantViolated(format!("no step at {}", index)))?;
        step.complete()?;
        debug!(index, id = %step.id, "Step completed");
        self.events.push(WorkflowEvent::StepCompleted {
            index,
            id: step.id.clone(),
        });
        Ok(())
    }

    /// All steps complete: publish the response and schedule the settle
    fn finish(&mut self, at: Duration) {
        self.run.response = Some(RESPONSE_TEXT.to_string());
        self.run.is_revealing = true;
        self.scheduled = Some(Scheduled {
            due: at + self.timings.settle,
            action: Continuation::Settle,
        });
        if let Some(run_id) = self.run.run_id {
            self.events.push(WorkflowEvent::ResponseReady {
                run_id,
                text: RESPONSE_TEXT.to_string(),
            });
        }
    }

    fn check(&self) {
        let result = self.run.validate();
        debug_assert!(result.is_ok(), "{:?}", result);
        if let Err(e) = result {
            warn!("{}", e);
        }
    }
}
