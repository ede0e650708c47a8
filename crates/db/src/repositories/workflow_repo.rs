//! Repository for the `workflow_instances` table.

use encore_core::negotiation::WorkflowInstance;
use encore_core::types::DbId;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::models::workflow::WorkflowInstanceRow;

/// Column list for workflow_instances queries.
const COLUMNS: &str = "id, conversation_id, workflow_key, current_node_key, awaiting_user_id, \
    round, max_rounds, locked, context, version, created_at, updated_at";

/// Provides persistence for negotiation workflow instances.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert the workflow instance for a conversation at version 0.
    pub async fn insert(
        conn: &mut PgConnection,
        conversation_id: DbId,
        workflow_key: &str,
        instance: &WorkflowInstance,
    ) -> Result<WorkflowInstanceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_instances
                (conversation_id, workflow_key, current_node_key, awaiting_user_id,
                 round, max_rounds, locked, context)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowInstanceRow>(&query)
            .bind(conversation_id)
            .bind(workflow_key)
            .bind(instance.current_node_key.as_str())
            .bind(instance.awaiting_user_id)
            .bind(instance.round)
            .bind(instance.max_rounds)
            .bind(instance.locked)
            .bind(Value::Object(instance.context.clone()))
            .fetch_one(&mut *conn)
            .await
    }

    /// Find the workflow instance attached to a conversation.
    pub async fn find_by_conversation(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Option<WorkflowInstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_instances WHERE conversation_id = $1");
        sqlx::query_as::<_, WorkflowInstanceRow>(&query)
            .bind(conversation_id)
            .fetch_optional(pool)
            .await
    }

    /// Write the next state if the row is still at `expected_version`.
    ///
    /// Returns `None` when another transition was committed first.
    pub async fn update_with_version(
        conn: &mut PgConnection,
        id: DbId,
        expected_version: i64,
        next: &WorkflowInstance,
    ) -> Result<Option<WorkflowInstanceRow>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_instances SET
                current_node_key = $3,
                awaiting_user_id = $4,
                round = $5,
                locked = $6,
                context = $7,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowInstanceRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(next.current_node_key.as_str())
            .bind(next.awaiting_user_id)
            .bind(next.round)
            .bind(next.locked)
            .bind(Value::Object(next.context.clone()))
            .fetch_optional(&mut *conn)
            .await
    }
}
