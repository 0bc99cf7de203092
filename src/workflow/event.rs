//! Events emitted by the controller as a run progresses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum WorkflowEvent {
    #[serde(rename = "workflow.started")]
    Started { run_id: Uuid },

    #[serde(rename = "step.activated")]
    StepActivated {
        index: usize,
        id: String,
        title: String,
    },

    /// The gated step is waiting for a confirmation code
    #[serde(rename = "step.awaiting_confirmation")]
    AwaitingConfirmation { index: usize, id: String },

    #[serde(rename = "step.completed")]
    StepCompleted { index: usize, id: String },

    #[serde(rename = "confirmation.accepted")]
    ConfirmationAccepted { run_id: Uuid },

    #[serde(rename = "response.ready")]
    ResponseReady { run_id: Uuid, text: String },

    /// Reveal finished and the run went idle
    #[serde(rename = "workflow.settled")]
    Settled { run_id: Uuid },

    #[serde(rename = "workflow.reset")]
    Reset { run_id: Uuid },
}

impl WorkflowEvent {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        match self {
            WorkflowEvent::Started { run_id } => format!("Workflow started ({})", run_id),
            WorkflowEvent::StepActivated { index, title, .. } => {
                format!("[{}] {} ...", index + 1, title)
            }
            WorkflowEvent::AwaitingConfirmation { index, .. } => {
                format!("[{}] Waiting for security verification", index + 1)
            }
            WorkflowEvent::StepCompleted { index, id } => {
                format!("[{}] {} complete", index + 1, id)
            }
            WorkflowEvent::ConfirmationAccepted { .. } => {
                "OTP Verified: Security verification successful".to_string()
            }
            WorkflowEvent::ResponseReady { .. } => "Agent response ready".to_string(),
            WorkflowEvent::Settled { .. } => "Workflow idle".to_string(),
            WorkflowEvent::Reset { .. } => "Workflow reset".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = WorkflowEvent::StepCompleted {
            index: 1,
            id: "data".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step.completed");
        assert_eq!(json["data"]["index"], 1);
        assert_eq!(json["data"]["id"], "data");
    }

    #[test]
    fn test_summary_uses_one_based_index() {
        let event = WorkflowEvent::StepActivated {
            index: 0,
            id: "auth".to_string(),
            title: "Authentication Check".to_string(),
        };
        assert_eq!(event.summary(), "[1] Authentication Check ...");
    }
}
