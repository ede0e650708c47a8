//! Repository for the `conversations` and `conversation_participants` tables.

use encore_core::conversation::ConversationKey;
use encore_core::negotiation::{WorkflowInstance, WORKFLOW_KEY};
use encore_core::types::DbId;
use sqlx::PgPool;

use crate::models::conversation::{Conversation, ConversationParticipant, CreateConversation};
use crate::models::workflow::WorkflowInstanceRow;
use crate::repositories::WorkflowRepo;

/// Column list for conversations queries.
const COLUMNS: &str = "id, entity_type, entity_id, conversation_type, subject, created_by, \
    created_at, updated_at";

/// Column list for conversation_participants queries.
const PARTICIPANT_COLUMNS: &str = "id, conversation_id, user_id, joined_at";

/// Result of [`ConversationRepo::open`].
#[derive(Debug, Clone)]
pub struct OpenedConversation {
    pub conversation: Conversation,
    pub workflow: Option<WorkflowInstanceRow>,
    /// `false` when a concurrent open had already created the conversation.
    pub created: bool,
}

/// Provides persistence for conversations and their participants.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Find the conversation for an idempotency key.
    pub async fn find_by_key(
        pool: &PgPool,
        key: &ConversationKey,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations
             WHERE entity_type = $1 AND entity_id = $2 AND conversation_type = $3"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(&key.entity_type)
            .bind(key.entity_id)
            .bind(&key.conversation_type)
            .fetch_optional(pool)
            .await
    }

    /// Find a conversation by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a conversation with its participants and optional workflow
    /// instance in one transaction.
    ///
    /// Uses `INSERT ... ON CONFLICT DO NOTHING` against the unique key, so two
    /// racing opens converge on one conversation: the loser gets the winner's
    /// row back with `created == false` and writes nothing.
    pub async fn open(
        pool: &PgPool,
        input: &CreateConversation,
        participant_ids: &[DbId],
        workflow: Option<&WorkflowInstance>,
    ) -> Result<OpenedConversation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO conversations
                (entity_type, entity_id, conversation_type, subject, created_by)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_conversations_entity_key DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Conversation>(&query)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.conversation_type)
            .bind(&input.subject)
            .bind(input.created_by)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(conversation) = inserted else {
            tx.rollback().await?;
            let key = ConversationKey {
                entity_type: input.entity_type.clone(),
                entity_id: input.entity_id,
                conversation_type: input.conversation_type.clone(),
            };
            let conversation = Self::find_by_key(pool, &key)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            let workflow = WorkflowRepo::find_by_conversation(pool, conversation.id).await?;
            return Ok(OpenedConversation {
                conversation,
                workflow,
                created: false,
            });
        };

        for user_id in participant_ids {
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id)
                 VALUES ($1, $2)
                 ON CONFLICT ON CONSTRAINT uq_conversation_participants_user DO NOTHING",
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let workflow = match workflow {
            Some(instance) => {
                Some(WorkflowRepo::insert(&mut tx, conversation.id, WORKFLOW_KEY, instance).await?)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::debug!(
            conversation_id = conversation.id,
            entity_type = %conversation.entity_type,
            entity_id = conversation.entity_id,
            participants = participant_ids.len(),
            "Conversation created"
        );

        Ok(OpenedConversation {
            conversation,
            workflow,
            created: true,
        })
    }

    /// List a conversation's participants in join order.
    pub async fn list_participants(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Vec<ConversationParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM conversation_participants
             WHERE conversation_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ConversationParticipant>(&query)
            .bind(conversation_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `user_id` is a participant of the conversation.
    pub async fn is_participant(
        pool: &PgPool,
        conversation_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = $1 AND user_id = $2
             )",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
