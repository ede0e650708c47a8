use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::negotiation::state::{ActionKey, NodeKey};
use crate::types::DbId;

/// Kind of entry in a conversation's message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A participant's negotiation move.
    Action,
    /// Platform-authored notice, e.g. the outcome of a negotiation.
    System,
}

impl MessageType {
    /// Parse a message type string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "action" => Ok(Self::Action),
            "system" => Ok(Self::System),
            _ => Err(CoreError::Validation(format!(
                "Invalid message type '{s}'. Must be one of: action, system"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::System => "system",
        }
    }
}

/// A message record emitted by a transition, to be appended to the
/// conversation log by the caller.
///
/// These are audit entries. Nothing reads them back to drive the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// `None` for system messages.
    pub sender_id: Option<DbId>,
    pub message_type: MessageType,
    pub action_key: Option<ActionKey>,
    pub body: Option<String>,
    pub payload: Map<String, Value>,
    /// Round at the time the move was made (before any increment).
    pub round: i32,
    pub workflow_node_key: NodeKey,
}
