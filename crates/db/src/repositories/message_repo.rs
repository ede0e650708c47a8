//! Repository for the append-only `messages` table.

use encore_core::negotiation::OutgoingMessage;
use encore_core::types::DbId;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::models::message::Message;

/// Column list for messages queries.
const COLUMNS: &str = "id, conversation_id, sender_id, message_type, action_key, body, \
    payload, round, workflow_node_key, created_at";

/// Provides append and read operations for conversation messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Append a message emitted by a workflow transition.
    pub async fn insert(
        conn: &mut PgConnection,
        conversation_id: DbId,
        message: &OutgoingMessage,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages
                (conversation_id, sender_id, message_type, action_key, body,
                 payload, round, workflow_node_key)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(message.sender_id)
            .bind(message.message_type.as_str())
            .bind(message.action_key.map(|k| k.as_str()))
            .bind(&message.body)
            .bind(Value::Object(message.payload.clone()))
            .bind(message.round)
            .bind(message.workflow_node_key.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    /// List a conversation's messages in log order.
    ///
    /// `after_id` lets polling clients fetch only what they have not seen.
    pub async fn list_for_conversation(
        pool: &PgPool,
        conversation_id: DbId,
        after_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE conversation_id = $1
               AND ($2::BIGINT IS NULL OR id > $2)
             ORDER BY id ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(after_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
