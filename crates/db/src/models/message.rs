//! Conversation message models and DTOs.

use encore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// Default page size when polling a conversation's messages.
pub const DEFAULT_MESSAGE_LIMIT: i64 = 100;

/// Largest page size accepted when polling messages.
pub const MAX_MESSAGE_LIMIT: i64 = 500;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender_id: Option<DbId>,
    pub message_type: String,
    pub action_key: Option<String>,
    pub body: Option<String>,
    pub payload: Value,
    pub round: Option<i32>,
    pub workflow_node_key: Option<String>,
    pub created_at: Timestamp,
}

/// Request body for submitting a negotiation action.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitActionRequest {
    /// One of `PROPOSE_CHANGE`, `ACCEPT`, `DECLINE`.
    pub action_key: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Workflow version the client last saw; stale versions are rejected.
    pub expected_version: Option<i64>,
}

/// Query parameters for listing messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageListParams {
    /// Only return messages with an id greater than this.
    pub after_id: Option<DbId>,
    pub limit: Option<i64>,
}

impl MessageListParams {
    /// Page size clamped to `1..=MAX_MESSAGE_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_MESSAGE_LIMIT)
            .clamp(1, MAX_MESSAGE_LIMIT)
    }
}
