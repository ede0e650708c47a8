//! The negotiation transition function.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::booking::BookingStatus;
use crate::negotiation::error::NegotiationError;
use crate::negotiation::message::{MessageType, OutgoingMessage};
use crate::negotiation::state::{
    ActionKey, NodeKey, WorkflowAction, WorkflowInstance, PAYLOAD_PROPOSAL_ID,
};
use crate::negotiation::validator::{
    validate_action, validate_max_rounds, validate_not_locked, validate_turn,
};
use crate::types::DbId;

/// Body of the system message emitted on `ACCEPT`.
pub const ACCEPTED_SYSTEM_MESSAGE: &str = "Negotiation accepted.";

/// Body of the system message emitted on `DECLINE`.
pub const DECLINED_SYSTEM_MESSAGE: &str = "Negotiation declined.";

/// Outcome of applying one action to one workflow instance.
///
/// The caller persists the next instance, applies the booking directives,
/// and appends the message(s), all in one atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionResult {
    pub next_node_key: NodeKey,
    pub next_awaiting_user_id: Option<DbId>,
    pub new_round: i32,
    pub should_lock: bool,
    pub booking_status_update: Option<BookingStatus>,
    pub booking_offer_amount_update: Option<Decimal>,
    pub message: OutgoingMessage,
    /// Only present for terminal transitions.
    pub system_message: Option<OutgoingMessage>,
}

impl TransitionResult {
    /// The instance as it stands after this transition.
    pub fn next_instance(&self, current: &WorkflowInstance) -> WorkflowInstance {
        WorkflowInstance {
            current_node_key: self.next_node_key,
            awaiting_user_id: self.next_awaiting_user_id,
            round: self.new_round,
            max_rounds: current.max_rounds,
            locked: self.should_lock,
            context: current.context.clone(),
        }
    }

    /// Messages in the order they belong in the log.
    pub fn messages(&self) -> impl Iterator<Item = &OutgoingMessage> {
        std::iter::once(&self.message).chain(self.system_message.as_ref())
    }
}

/// Apply `action` to `instance`.
///
/// Checks run in a fixed order and stop at the first failure: locked, turn,
/// then (for `PROPOSE_CHANGE` only) the round ceiling. On error the caller
/// must not change anything.
pub fn compute_transition(
    instance: &WorkflowInstance,
    action: &WorkflowAction,
    other_participant_user_id: DbId,
) -> Result<TransitionResult, NegotiationError> {
    validate_not_locked(instance)?;
    validate_turn(instance, action.user_id)?;

    let message = action_message(instance, action);

    let result = match action.action_key {
        ActionKey::ProposeChange => {
            validate_max_rounds(instance)?;
            TransitionResult {
                next_node_key: instance.current_node_key.after_proposal(),
                next_awaiting_user_id: Some(other_participant_user_id),
                new_round: instance.round + 1,
                should_lock: false,
                booking_status_update: None,
                booking_offer_amount_update: action.offer_amount(),
                message,
                system_message: None,
            }
        }
        ActionKey::Accept => terminal(
            instance,
            NodeKey::Accepted,
            BookingStatus::Contracting,
            ACCEPTED_SYSTEM_MESSAGE,
            message,
        ),
        ActionKey::Decline => terminal(
            instance,
            NodeKey::Declined,
            BookingStatus::Cancelled,
            DECLINED_SYSTEM_MESSAGE,
            message,
        ),
    };

    Ok(result)
}

/// Like [`compute_transition`], for an action key that has not been parsed yet.
///
/// A locked workflow or a wrong-turn user is reported ahead of an unknown
/// action key.
pub fn compute_transition_from_key(
    instance: &WorkflowInstance,
    user_id: DbId,
    action_key: &str,
    payload: Map<String, Value>,
    other_participant_user_id: DbId,
) -> Result<TransitionResult, NegotiationError> {
    validate_not_locked(instance)?;
    validate_turn(instance, user_id)?;
    let action_key = validate_action(action_key)?;

    let action = WorkflowAction {
        user_id,
        action_key,
        payload,
    };
    compute_transition(instance, &action, other_participant_user_id)
}

fn action_message(instance: &WorkflowInstance, action: &WorkflowAction) -> OutgoingMessage {
    let mut payload = action.payload.clone();
    payload.insert(PAYLOAD_PROPOSAL_ID.to_string(), Value::Null);

    OutgoingMessage {
        sender_id: Some(action.user_id),
        message_type: MessageType::Action,
        action_key: Some(action.action_key),
        body: None,
        payload,
        round: instance.round,
        workflow_node_key: instance.current_node_key,
    }
}

fn terminal(
    instance: &WorkflowInstance,
    node: NodeKey,
    status: BookingStatus,
    body: &str,
    message: OutgoingMessage,
) -> TransitionResult {
    TransitionResult {
        next_node_key: node,
        next_awaiting_user_id: None,
        new_round: instance.round,
        should_lock: true,
        booking_status_update: Some(status),
        booking_offer_amount_update: None,
        message,
        system_message: Some(OutgoingMessage {
            sender_id: None,
            message_type: MessageType::System,
            action_key: None,
            body: Some(body.to_string()),
            payload: Map::new(),
            round: instance.round,
            workflow_node_key: node,
        }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    const ARTIST: DbId = 7;
    const ORGANIZER: DbId = 42;

    fn instance(node: NodeKey, awaiting: DbId, round: i32, max_rounds: i32) -> WorkflowInstance {
        WorkflowInstance {
            current_node_key: node,
            awaiting_user_id: Some(awaiting),
            round,
            max_rounds,
            locked: false,
            context: Map::new(),
        }
    }

    fn locked(node: NodeKey) -> WorkflowInstance {
        WorkflowInstance {
            current_node_key: node,
            awaiting_user_id: None,
            round: 1,
            max_rounds: 3,
            locked: true,
            context: Map::new(),
        }
    }

    fn propose(user_id: DbId, payload: Value) -> WorkflowAction {
        WorkflowAction {
            user_id,
            action_key: ActionKey::ProposeChange,
            payload: payload.as_object().cloned().unwrap_or_default(),
        }
    }

    // -----------------------------------------------------------------------
    // PROPOSE_CHANGE
    // -----------------------------------------------------------------------

    #[test]
    fn test_counter_proposal_hands_turn_to_organizer() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 1, 3);
        let action = propose(ARTIST, json!({ "offer_amount": 15000 }));

        let result = compute_transition(&inst, &action, ORGANIZER).unwrap();

        assert_eq!(result.next_node_key, NodeKey::AwaitingOrganizer);
        assert_eq!(result.next_awaiting_user_id, Some(ORGANIZER));
        assert_eq!(result.new_round, 2);
        assert!(!result.should_lock);
        assert_eq!(result.booking_status_update, None);
        assert_eq!(result.booking_offer_amount_update, Some(Decimal::from(15000)));
        assert_eq!(result.message.action_key, Some(ActionKey::ProposeChange));
        assert_eq!(result.message.round, 1);
        assert_eq!(result.system_message, None);
    }

    #[test]
    fn test_first_move_proposal_awaits_artist() {
        let inst = instance(NodeKey::WaitingFirstMove, ORGANIZER, 0, 3);
        let result = compute_transition(&inst, &propose(ORGANIZER, json!({})), ARTIST).unwrap();

        assert_eq!(result.next_node_key, NodeKey::AwaitingArtist);
        assert_eq!(result.next_awaiting_user_id, Some(ARTIST));
        assert_eq!(result.new_round, 1);
        assert_eq!(result.message.workflow_node_key, NodeKey::WaitingFirstMove);
    }

    #[test]
    fn test_proposal_without_amount_leaves_offer_unchanged() {
        let inst = instance(NodeKey::AwaitingOrganizer, ORGANIZER, 0, 3);
        let action = propose(ORGANIZER, json!({ "note": "Can you do a longer set?" }));

        let result = compute_transition(&inst, &action, ARTIST).unwrap();

        assert_eq!(result.booking_offer_amount_update, None);
        assert_eq!(result.next_node_key, NodeKey::AwaitingArtist);
    }

    #[test]
    fn test_proposal_rejected_at_round_ceiling() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 3, 3);
        let err = compute_transition(&inst, &propose(ARTIST, json!({})), ORGANIZER).unwrap_err();
        assert_eq!(err, NegotiationError::MaxRoundsReached);
        assert_eq!(err.to_string(), "Max rounds reached. Must Accept or Decline.");
    }

    #[test]
    fn test_round_ceiling_respects_instance_override() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 3, 5);
        let result = compute_transition(&inst, &propose(ARTIST, json!({})), ORGANIZER).unwrap();
        assert_eq!(result.new_round, 4);
    }

    #[test]
    fn test_rounds_run_out_after_alternating_proposals() {
        let mut inst = instance(NodeKey::WaitingFirstMove, ORGANIZER, 0, 3);
        let mut mover = ORGANIZER;
        for expected_round in 1..=3 {
            let other = if mover == ORGANIZER { ARTIST } else { ORGANIZER };
            let result = compute_transition(&inst, &propose(mover, json!({})), other).unwrap();
            assert_eq!(result.new_round, expected_round);
            inst = result.next_instance(&inst);
            mover = other;
        }

        let err = compute_transition(&inst, &propose(mover, json!({})), ORGANIZER).unwrap_err();
        assert_eq!(err, NegotiationError::MaxRoundsReached);

        let accept = WorkflowAction::new(mover, ActionKey::Accept);
        assert!(compute_transition(&inst, &accept, ORGANIZER).is_ok());
    }

    // -----------------------------------------------------------------------
    // ACCEPT / DECLINE
    // -----------------------------------------------------------------------

    #[test]
    fn test_accept_locks_and_moves_booking_to_contracting() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 3, 3);
        let action = WorkflowAction::new(ARTIST, ActionKey::Accept);

        let result = compute_transition(&inst, &action, ORGANIZER).unwrap();

        assert_eq!(result.next_node_key, NodeKey::Accepted);
        assert_eq!(result.next_awaiting_user_id, None);
        assert_eq!(result.new_round, 3);
        assert!(result.should_lock);
        assert_eq!(result.booking_status_update, Some(BookingStatus::Contracting));
        assert_ne!(result.booking_status_update, Some(BookingStatus::Confirmed));
        assert_eq!(result.booking_offer_amount_update, None);

        let system = result.system_message.expect("accept emits a system message");
        assert_eq!(system.sender_id, None);
        assert_eq!(system.message_type, MessageType::System);
        assert_eq!(system.body.as_deref(), Some(ACCEPTED_SYSTEM_MESSAGE));
    }

    #[test]
    fn test_decline_locks_and_cancels_booking() {
        let inst = instance(NodeKey::AwaitingOrganizer, ORGANIZER, 1, 3);
        let action = WorkflowAction::new(ORGANIZER, ActionKey::Decline);

        let result = compute_transition(&inst, &action, ARTIST).unwrap();

        assert_eq!(result.next_node_key, NodeKey::Declined);
        assert_eq!(result.next_awaiting_user_id, None);
        assert_eq!(result.new_round, 1);
        assert!(result.should_lock);
        assert_eq!(result.booking_status_update, Some(BookingStatus::Cancelled));
        assert_eq!(result.booking_offer_amount_update, None);
        assert_eq!(
            result.system_message.and_then(|m| m.body).as_deref(),
            Some(DECLINED_SYSTEM_MESSAGE)
        );
    }

    #[test]
    fn test_accept_ignores_offer_amount_in_payload() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 1, 3);
        let mut action = WorkflowAction::new(ARTIST, ActionKey::Accept);
        action.payload.insert("offer_amount".into(), json!(99999));

        let result = compute_transition(&inst, &action, ORGANIZER).unwrap();
        assert_eq!(result.booking_offer_amount_update, None);
    }

    #[test]
    fn test_first_mover_can_accept_immediately() {
        let inst = instance(NodeKey::WaitingFirstMove, ORGANIZER, 0, 3);
        let action = WorkflowAction::new(ORGANIZER, ActionKey::Accept);
        let result = compute_transition(&inst, &action, ARTIST).unwrap();
        assert_eq!(result.next_node_key, NodeKey::Accepted);
        assert_eq!(result.new_round, 0);
    }

    // -----------------------------------------------------------------------
    // Turn and lock enforcement
    // -----------------------------------------------------------------------

    #[test]
    fn test_wrong_user_rejected_for_every_action() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 0, 3);
        for key in [ActionKey::ProposeChange, ActionKey::Accept, ActionKey::Decline] {
            let err = compute_transition(&inst, &WorkflowAction::new(ORGANIZER, key), ARTIST)
                .unwrap_err();
            assert_matches!(err, NegotiationError::NotYourTurn { awaiting_user_id: Some(ARTIST) });
            assert_eq!(err.to_string(), "Not your turn. Awaiting user 7");
        }
    }

    #[test]
    fn test_turn_checked_before_round_ceiling() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 3, 3);
        let err = compute_transition(&inst, &propose(ORGANIZER, json!({})), ARTIST).unwrap_err();
        assert_matches!(err, NegotiationError::NotYourTurn { .. });
    }

    #[test]
    fn test_locked_rejects_everything_first() {
        for node in [NodeKey::Accepted, NodeKey::Declined] {
            let inst = locked(node);
            for user in [ARTIST, ORGANIZER, 999] {
                for key in [ActionKey::ProposeChange, ActionKey::Accept, ActionKey::Decline] {
                    let err = compute_transition(&inst, &WorkflowAction::new(user, key), ARTIST)
                        .unwrap_err();
                    assert_eq!(err, NegotiationError::Locked);
                }
            }
        }
    }

    #[test]
    fn test_retried_accept_is_rejected() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 1, 3);
        let action = WorkflowAction::new(ARTIST, ActionKey::Accept);

        let first = compute_transition(&inst, &action, ORGANIZER).unwrap();
        let after = first.next_instance(&inst);

        assert_eq!(
            compute_transition(&after, &action, ORGANIZER).unwrap_err(),
            NegotiationError::Locked
        );
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    #[test]
    fn test_action_message_fields() {
        let inst = instance(NodeKey::AwaitingOrganizer, ORGANIZER, 2, 3);
        let action = propose(
            ORGANIZER,
            json!({ "offer_amount": 1200, "note": "final offer", "proposal_id": 5 }),
        );

        let result = compute_transition(&inst, &action, ARTIST).unwrap();
        let msg = &result.message;

        assert_eq!(msg.sender_id, Some(ORGANIZER));
        assert_eq!(msg.message_type, MessageType::Action);
        assert_eq!(msg.action_key, Some(ActionKey::ProposeChange));
        assert_eq!(msg.round, 2);
        assert_eq!(msg.workflow_node_key, NodeKey::AwaitingOrganizer);
        assert_eq!(msg.payload.get("offer_amount"), Some(&json!(1200)));
        assert_eq!(msg.payload.get("note"), Some(&json!("final offer")));
        assert_eq!(msg.payload.get("proposal_id"), Some(&Value::Null));
    }

    #[test]
    fn test_messages_iterates_action_then_system() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 0, 3);
        let result =
            compute_transition(&inst, &WorkflowAction::new(ARTIST, ActionKey::Decline), ORGANIZER)
                .unwrap();
        let kinds: Vec<_> = result.messages().map(|m| m.message_type).collect();
        assert_eq!(kinds, vec![MessageType::Action, MessageType::System]);
    }

    // -----------------------------------------------------------------------
    // next_instance
    // -----------------------------------------------------------------------

    #[test]
    fn test_next_instance_keeps_ceiling_and_context() {
        let mut inst = instance(NodeKey::AwaitingArtist, ARTIST, 0, 4);
        inst.context.insert("source".into(), json!("web"));

        let result = compute_transition(&inst, &propose(ARTIST, json!({})), ORGANIZER).unwrap();
        let next = result.next_instance(&inst);

        assert_eq!(next.max_rounds, 4);
        assert_eq!(next.context.get("source"), Some(&json!("web")));
        assert_eq!(next.round, 1);
        assert_eq!(next.awaiting_user_id, Some(ORGANIZER));
        assert!(!next.locked);
    }

    #[test]
    fn test_terminal_instance_satisfies_lock_invariant() {
        let inst = instance(NodeKey::AwaitingOrganizer, ORGANIZER, 1, 3);
        let result =
            compute_transition(&inst, &WorkflowAction::new(ORGANIZER, ActionKey::Accept), ARTIST)
                .unwrap();
        let next = result.next_instance(&inst);
        assert!(next.locked);
        assert!(next.current_node_key.is_terminal());
        assert_eq!(next.awaiting_user_id, None);
    }

    // -----------------------------------------------------------------------
    // compute_transition_from_key
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_key_rejects_unknown_action() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 0, 3);
        let err = compute_transition_from_key(&inst, ARTIST, "COUNTER", Map::new(), ORGANIZER)
            .unwrap_err();
        assert_eq!(err, NegotiationError::InvalidAction);
    }

    #[test]
    fn test_from_key_reports_lock_before_unknown_action() {
        let err =
            compute_transition_from_key(&locked(NodeKey::Declined), ARTIST, "BOGUS", Map::new(), 1)
                .unwrap_err();
        assert_eq!(err, NegotiationError::Locked);
    }

    #[test]
    fn test_from_key_reports_turn_before_unknown_action() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 0, 3);
        let err = compute_transition_from_key(&inst, ORGANIZER, "BOGUS", Map::new(), ARTIST)
            .unwrap_err();
        assert_matches!(err, NegotiationError::NotYourTurn { .. });
    }

    #[test]
    fn test_from_key_matches_typed_transition() {
        let inst = instance(NodeKey::AwaitingArtist, ARTIST, 1, 3);
        let payload = json!({ "offer_amount": 15000 }).as_object().cloned().unwrap();

        let from_key =
            compute_transition_from_key(&inst, ARTIST, "PROPOSE_CHANGE", payload.clone(), ORGANIZER)
                .unwrap();
        let typed = compute_transition(
            &inst,
            &WorkflowAction {
                user_id: ARTIST,
                action_key: ActionKey::ProposeChange,
                payload,
            },
            ORGANIZER,
        )
        .unwrap();

        assert_eq!(from_key, typed);
    }
}
