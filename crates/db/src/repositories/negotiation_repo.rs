//! Atomic commit of a negotiation transition.

use encore_core::negotiation::{TransitionResult, WorkflowInstance};
use encore_core::types::DbId;
use serde::Serialize;
use sqlx::PgPool;

use crate::models::message::Message;
use crate::models::workflow::WorkflowInstanceRow;
use crate::repositories::{BookingRepo, MessageRepo, WorkflowRepo};

/// Everything written by a committed transition.
#[derive(Debug, Clone, Serialize)]
pub struct CommittedTransition {
    pub workflow: WorkflowInstanceRow,
    /// Action message first, then the system message if any.
    pub messages: Vec<Message>,
}

/// Persists transitions computed by the negotiation engine.
pub struct NegotiationRepo;

impl NegotiationRepo {
    /// Commit one transition: the next workflow state, its messages, and the
    /// booking directives, in a single transaction.
    ///
    /// The workflow update is conditional on `current.version`. If another
    /// transition was committed since `current` was read, nothing is written
    /// and `None` is returned.
    pub async fn commit_transition(
        pool: &PgPool,
        current: &WorkflowInstanceRow,
        booking_id: DbId,
        next: &WorkflowInstance,
        result: &TransitionResult,
    ) -> Result<Option<CommittedTransition>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(workflow) =
            WorkflowRepo::update_with_version(&mut tx, current.id, current.version, next).await?
        else {
            tx.rollback().await?;
            tracing::warn!(
                workflow_id = current.id,
                expected_version = current.version,
                "Workflow version conflict, transition discarded"
            );
            return Ok(None);
        };

        let mut messages = Vec::with_capacity(2);
        for message in result.messages() {
            messages.push(MessageRepo::insert(&mut tx, current.conversation_id, message).await?);
        }

        BookingRepo::apply_directives(
            &mut tx,
            booking_id,
            result.booking_status_update,
            result.booking_offer_amount_update,
        )
        .await?;

        tx.commit().await?;

        Ok(Some(CommittedTransition { workflow, messages }))
    }
}
