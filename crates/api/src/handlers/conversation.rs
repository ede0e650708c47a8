//! Handlers for reading a negotiation conversation and acting on it.
//!
//! Only participants may see or act on a conversation. Actions go through
//! the negotiation engine and are committed with an optimistic version
//! check, so two racing submissions cannot both apply.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use encore_core::conversation::{counterpart_of, entity_types};
use encore_core::error::CoreError;
use encore_core::negotiation::compute_transition_from_key;
use encore_core::types::DbId;
use encore_db::models::conversation::Conversation;
use encore_db::models::message::{MessageListParams, SubmitActionRequest};
use encore_db::models::workflow::WorkflowInstanceRow;
use encore_db::repositories::{ConversationRepo, MessageRepo, NegotiationRepo, WorkflowRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A conversation with its participants and workflow state.
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub participant_ids: Vec<DbId>,
    /// `None` for conversations without a workflow.
    pub workflow: Option<WorkflowInstanceRow>,
}

pub(crate) async fn conversation_detail(
    state: &AppState,
    conversation: Conversation,
) -> AppResult<ConversationDetail> {
    let participant_ids = participant_ids(state, conversation.id).await?;
    let workflow = WorkflowRepo::find_by_conversation(&state.pool, conversation.id).await?;
    Ok(ConversationDetail {
        conversation,
        participant_ids,
        workflow,
    })
}

async fn participant_ids(state: &AppState, conversation_id: DbId) -> AppResult<Vec<DbId>> {
    let participants = ConversationRepo::list_participants(&state.pool, conversation_id).await?;
    Ok(participants.into_iter().map(|p| p.user_id).collect())
}

/// Load a conversation, rejecting callers who are not participants.
async fn load_for_participant(
    state: &AppState,
    conversation_id: DbId,
    user_id: DbId,
) -> AppResult<Conversation> {
    let conversation = ConversationRepo::find_by_id(&state.pool, conversation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Conversation",
            id: conversation_id,
        })?;

    if !ConversationRepo::is_participant(&state.pool, conversation_id, user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not a participant in this conversation".into(),
        )));
    }

    Ok(conversation)
}

/// GET /api/v1/conversations/{id}
pub async fn get_conversation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let conversation = load_for_participant(&state, id, auth.user_id).await?;
    let detail = conversation_detail(&state, conversation).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/conversations/{id}/messages?after_id=&limit=
///
/// Messages in log order. Clients poll with the last id they have seen.
pub async fn list_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<MessageListParams>,
) -> AppResult<impl IntoResponse> {
    load_for_participant(&state, id, auth.user_id).await?;
    let messages =
        MessageRepo::list_for_conversation(&state.pool, id, params.after_id, params.limit())
            .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/conversations/{id}/actions
///
/// Submit `PROPOSE_CHANGE`, `ACCEPT`, or `DECLINE`. Returns the updated
/// workflow and the messages the action produced. Engine rejections are
/// reported before `expected_version` is compared. A stale version, or a
/// transition committed concurrently by the other party, yields 409 and
/// nothing is written.
pub async fn submit_action(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitActionRequest>,
) -> AppResult<impl IntoResponse> {
    let conversation = load_for_participant(&state, id, auth.user_id).await?;

    if conversation.entity_type != entity_types::BOOKING {
        return Err(AppError::BadRequest(format!(
            "Conversation entity '{}' does not support actions",
            conversation.entity_type
        )));
    }

    let current = WorkflowRepo::find_by_conversation(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::Validation("Conversation has no workflow".into()))?;

    let instance = current.to_instance()?;
    let participants = participant_ids(&state, id).await?;
    let other_party = counterpart_of(&participants, auth.user_id);

    // Engine rejections, locked first, take precedence over a stale version.
    let result = compute_transition_from_key(
        &instance,
        auth.user_id,
        &input.action_key,
        input.payload,
        other_party,
    )?;

    if let Some(expected) = input.expected_version {
        if expected != current.version {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Workflow is at version {}, expected {expected}; reload and retry",
                current.version
            ))));
        }
    }

    let next = result.next_instance(&instance);

    let committed = NegotiationRepo::commit_transition(
        &state.pool,
        &current,
        conversation.entity_id,
        &next,
        &result,
    )
    .await?
    .ok_or_else(|| {
        CoreError::Conflict("Workflow was modified concurrently; reload and retry".into())
    })?;

    tracing::info!(
        user_id = auth.user_id,
        conversation_id = id,
        booking_id = conversation.entity_id,
        action_key = %input.action_key,
        node = %result.next_node_key.as_str(),
        round = result.new_round,
        locked = result.should_lock,
        "Negotiation action applied"
    );

    Ok(Json(DataResponse { data: committed }))
}
