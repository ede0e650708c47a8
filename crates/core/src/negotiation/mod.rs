//! Booking negotiation workflow (`booking_negotiation_v1`).
//!
//! Two parties take turns on a booking: each turn is a counter-proposal,
//! an acceptance, or a decline. Acceptance and decline are terminal and
//! lock the workflow permanently.
//!
//! All functions here are synchronous and side-effect free. Callers must
//! serialize "read instance -> compute transition -> persist" per instance;
//! see `encore_db::repositories::NegotiationRepo::commit_transition`.

mod engine;
mod error;
mod initial;
mod message;
mod state;
mod validator;

pub use engine::{
    compute_transition, compute_transition_from_key, TransitionResult, ACCEPTED_SYSTEM_MESSAGE,
    DECLINED_SYSTEM_MESSAGE,
};
pub use error::NegotiationError;
pub use initial::{
    build_initial_workflow_state, NegotiationSettings, DEFAULT_MAX_ROUNDS, MAX_ROUNDS_LIMIT,
    MIN_ROUNDS_LIMIT, WORKFLOW_KEY,
};
pub use message::{MessageType, OutgoingMessage};
pub use state::{
    ActionKey, NodeKey, WorkflowAction, WorkflowInstance, PAYLOAD_NOTE, PAYLOAD_OFFER_AMOUNT,
    PAYLOAD_PROPOSAL_ID,
};
pub use validator::{validate_action, validate_max_rounds, validate_not_locked, validate_turn};
