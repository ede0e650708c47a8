use axum::routing::{get, post};
use axum::Router;

use crate::handlers::conversation;
use crate::state::AppState;

/// Routes mounted at `/conversations`.
///
/// ```text
/// GET    /{id}                 -> get_conversation
/// GET    /{id}/messages        -> list_messages
/// POST   /{id}/actions         -> submit_action
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(conversation::get_conversation))
        .route("/{id}/messages", get(conversation::list_messages))
        .route("/{id}/actions", post(conversation::submit_action))
}
