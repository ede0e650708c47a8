//! Handler for opening a booking's negotiation conversation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use encore_core::conversation::{resolve_participants, should_return_existing, ConversationKey};
use encore_core::error::CoreError;
use encore_core::negotiation::build_initial_workflow_state;
use encore_core::types::DbId;
use encore_db::models::conversation::{CreateConversation, OpenNegotiationRequest};
use encore_db::repositories::{BookingRepo, ConversationRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::conversation::conversation_detail;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/bookings/{id}/negotiation
///
/// Open the negotiation conversation for a booking. Idempotent: if one
/// already exists it is returned with 200 and nothing is written. A new
/// conversation is returned with 201, with the organizer (or venue user)
/// holding the first move.
pub async fn open_negotiation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<OpenNegotiationRequest>,
) -> AppResult<impl IntoResponse> {
    let key = ConversationKey::booking_negotiation(booking_id);
    key.validate().map_err(AppError::BadRequest)?;

    let booking = BookingRepo::find_parties(&state.pool, booking_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        })?;

    let participants = resolve_participants(&booking)?;
    if !participants.contains(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the booking's artist or organizer can open its negotiation".into(),
        )));
    }

    let existing = ConversationRepo::find_by_key(&state.pool, &key).await?;
    if should_return_existing(existing.as_ref()) {
        if let Some(conversation) = existing {
            let detail = conversation_detail(&state, conversation).await?;
            return Ok((StatusCode::OK, Json(DataResponse { data: detail })));
        }
    }

    let other_party = participants.other_party_user_id.ok_or_else(|| {
        CoreError::Validation("Booking has no organizer or venue user to negotiate with".into())
    })?;

    let settings = state.config.negotiation.with_max_rounds(input.max_rounds);
    settings.validate()?;

    let workflow = build_initial_workflow_state(&key.conversation_type, &settings)
        .map(|instance| instance.with_first_mover(other_party));

    let create = CreateConversation {
        entity_type: key.entity_type.clone(),
        entity_id: key.entity_id,
        conversation_type: key.conversation_type.clone(),
        subject: participants.subject.clone(),
        created_by: Some(auth.user_id),
    };

    let opened = ConversationRepo::open(
        &state.pool,
        &create,
        &participants.participant_ids,
        workflow.as_ref(),
    )
    .await?;

    let status = if opened.created {
        tracing::info!(
            user_id = auth.user_id,
            booking_id,
            conversation_id = opened.conversation.id,
            first_mover = other_party,
            max_rounds = settings.max_rounds,
            "Negotiation opened"
        );
        StatusCode::CREATED
    } else {
        tracing::debug!(
            booking_id,
            conversation_id = opened.conversation.id,
            "Concurrent open resolved to existing conversation"
        );
        StatusCode::OK
    };

    let detail = conversation_detail(&state, opened.conversation).await?;
    Ok((status, Json(DataResponse { data: detail })))
}
