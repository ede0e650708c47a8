//! Conversation and participant models and DTOs.

use encore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub conversation_type: String,
    pub subject: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `conversation_participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationParticipant {
    pub id: DbId,
    pub conversation_id: DbId,
    pub user_id: DbId,
    pub joined_at: Timestamp,
}

/// DTO for creating a conversation.
#[derive(Debug, Clone)]
pub struct CreateConversation {
    pub entity_type: String,
    pub entity_id: DbId,
    pub conversation_type: String,
    pub subject: String,
    pub created_by: Option<DbId>,
}

/// Request body for opening a booking negotiation. `{}` uses platform defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenNegotiationRequest {
    /// Per-conversation override of the platform round ceiling.
    pub max_rounds: Option<i32>,
}
