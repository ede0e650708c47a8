use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::conversation::conversation_types;
use crate::error::CoreError;
use crate::negotiation::state::{NodeKey, WorkflowInstance};

/// Identifies this version of the negotiation protocol on persisted instances.
pub const WORKFLOW_KEY: &str = "booking_negotiation_v1";

/// Platform default for the number of counter-proposals per negotiation.
pub const DEFAULT_MAX_ROUNDS: i32 = 3;

/// Smallest per-conversation round ceiling accepted.
pub const MIN_ROUNDS_LIMIT: i32 = 1;

/// Largest per-conversation round ceiling accepted.
pub const MAX_ROUNDS_LIMIT: i32 = 10;

/// Tunables applied when a negotiation workflow is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationSettings {
    pub max_rounds: i32,
}

impl Default for NegotiationSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl NegotiationSettings {
    /// Validate that the round ceiling is within the accepted range.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(MIN_ROUNDS_LIMIT..=MAX_ROUNDS_LIMIT).contains(&self.max_rounds) {
            return Err(CoreError::Validation(format!(
                "max_rounds must be between {MIN_ROUNDS_LIMIT} and {MAX_ROUNDS_LIMIT}, got {}",
                self.max_rounds
            )));
        }
        Ok(())
    }

    /// Apply a per-conversation override on top of these settings.
    pub fn with_max_rounds(self, max_rounds: Option<i32>) -> Self {
        match max_rounds {
            Some(max_rounds) => Self { max_rounds },
            None => self,
        }
    }
}

/// Starting workflow state for a new conversation of the given type.
///
/// Only negotiation conversations carry a workflow. The returned instance has
/// no awaiting user; the caller picks the first mover with
/// [`WorkflowInstance::with_first_mover`].
pub fn build_initial_workflow_state(
    conversation_type: &str,
    settings: &NegotiationSettings,
) -> Option<WorkflowInstance> {
    if conversation_type != conversation_types::NEGOTIATION {
        return None;
    }

    Some(WorkflowInstance {
        current_node_key: NodeKey::WaitingFirstMove,
        awaiting_user_id: None,
        round: 0,
        max_rounds: settings.max_rounds,
        locked: false,
        context: Map::new(),
    })
}
