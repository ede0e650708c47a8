pub mod bookings;
pub mod conversations;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /bookings/{id}/negotiation                       open negotiation (POST)
///
/// /conversations/{id}                              conversation detail
/// /conversations/{id}/messages                     message log (polling)
/// /conversations/{id}/actions                      submit action (POST)
/// ```
///
/// Every route requires a Bearer token. `/health` is mounted at the root,
/// outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/bookings", bookings::router())
        .nest("/conversations", conversations::router())
}
