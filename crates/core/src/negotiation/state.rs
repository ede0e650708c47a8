use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Payload keys
// ---------------------------------------------------------------------------

/// Proposed monetary amount on a `PROPOSE_CHANGE` (JSON number).
pub const PAYLOAD_OFFER_AMOUNT: &str = "offer_amount";

/// Free-text note attached to a move.
pub const PAYLOAD_NOTE: &str = "note";

/// Always written as `null` into action messages.
pub const PAYLOAD_PROPOSAL_ID: &str = "proposal_id";

// ---------------------------------------------------------------------------
// Node keys
// ---------------------------------------------------------------------------

/// States of the negotiation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKey {
    WaitingFirstMove,
    AwaitingArtist,
    AwaitingOrganizer,
    Accepted,
    Declined,
}

impl NodeKey {
    /// Parse a node key string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "WAITING_FIRST_MOVE" => Ok(Self::WaitingFirstMove),
            "AWAITING_ARTIST" => Ok(Self::AwaitingArtist),
            "AWAITING_ORGANIZER" => Ok(Self::AwaitingOrganizer),
            "ACCEPTED" => Ok(Self::Accepted),
            "DECLINED" => Ok(Self::Declined),
            _ => Err(CoreError::Validation(format!(
                "Invalid workflow node '{s}'. Must be one of: WAITING_FIRST_MOVE, \
                 AWAITING_ARTIST, AWAITING_ORGANIZER, ACCEPTED, DECLINED"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingFirstMove => "WAITING_FIRST_MOVE",
            Self::AwaitingArtist => "AWAITING_ARTIST",
            Self::AwaitingOrganizer => "AWAITING_ORGANIZER",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
        }
    }

    /// `ACCEPTED` and `DECLINED` have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }

    /// The node reached after a counter-proposal from this node.
    ///
    /// Flips between the two awaiting nodes. The first proposal always hands
    /// the turn to the artist, since the counterparty moves first.
    pub fn after_proposal(&self) -> Self {
        match self {
            Self::AwaitingArtist => Self::AwaitingOrganizer,
            _ => Self::AwaitingArtist,
        }
    }
}

// ---------------------------------------------------------------------------
// Action keys
// ---------------------------------------------------------------------------

/// The three moves a participant can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKey {
    ProposeChange,
    Accept,
    Decline,
}

impl ActionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProposeChange => "PROPOSE_CHANGE",
            Self::Accept => "ACCEPT",
            Self::Decline => "DECLINE",
        }
    }
}

// ---------------------------------------------------------------------------
// Instance and action
// ---------------------------------------------------------------------------

/// Workflow state for one negotiation conversation.
///
/// `locked`, a terminal `current_node_key`, and `awaiting_user_id == None`
/// always go together once the first mover has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub current_node_key: NodeKey,
    pub awaiting_user_id: Option<DbId>,
    /// Counter-proposals made so far.
    pub round: i32,
    pub max_rounds: i32,
    pub locked: bool,
    pub context: Map<String, Value>,
}

impl WorkflowInstance {
    /// Hand the opening turn to `user_id`.
    pub fn with_first_mover(mut self, user_id: DbId) -> Self {
        self.awaiting_user_id = Some(user_id);
        self
    }
}

/// One move submitted by a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAction {
    pub user_id: DbId,
    pub action_key: ActionKey,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl WorkflowAction {
    pub fn new(user_id: DbId, action_key: ActionKey) -> Self {
        Self {
            user_id,
            action_key,
            payload: Map::new(),
        }
    }

    /// The proposed amount, if the payload carries one as a JSON number.
    pub fn offer_amount(&self) -> Option<Decimal> {
        let value = self.payload.get(PAYLOAD_OFFER_AMOUNT)?;
        match value.as_i64() {
            Some(whole) => Some(Decimal::from(whole)),
            None => value.as_f64().and_then(Decimal::from_f64),
        }
    }
}
