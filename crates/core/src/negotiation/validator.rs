//! Independent precondition checks on a workflow instance.
//!
//! Each check is constant-time and looks only at the instance it is given.

use crate::negotiation::error::NegotiationError;
use crate::negotiation::state::{ActionKey, WorkflowInstance};
use crate::types::DbId;

/// Reject every action once the workflow has reached a terminal decision.
pub fn validate_not_locked(instance: &WorkflowInstance) -> Result<(), NegotiationError> {
    if instance.locked {
        return Err(NegotiationError::Locked);
    }
    Ok(())
}

/// Only the awaiting participant may act.
pub fn validate_turn(instance: &WorkflowInstance, user_id: DbId) -> Result<(), NegotiationError> {
    if instance.awaiting_user_id != Some(user_id) {
        return Err(NegotiationError::NotYourTurn {
            awaiting_user_id: instance.awaiting_user_id,
        });
    }
    Ok(())
}

/// Reject a further counter-proposal once `round` reaches the instance's own ceiling.
pub fn validate_max_rounds(instance: &WorkflowInstance) -> Result<(), NegotiationError> {
    if instance.round >= instance.max_rounds {
        return Err(NegotiationError::MaxRoundsReached);
    }
    Ok(())
}

/// Parse an action key received over the wire.
pub fn validate_action(action_key: &str) -> Result<ActionKey, NegotiationError> {
    match action_key {
        "PROPOSE_CHANGE" => Ok(ActionKey::ProposeChange),
        "ACCEPT" => Ok(ActionKey::Accept),
        "DECLINE" => Ok(ActionKey::Decline),
        _ => Err(NegotiationError::InvalidAction),
    }
}
