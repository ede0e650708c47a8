//! Booking-scoped routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::negotiation;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// POST   /{id}/negotiation     -> open_negotiation
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/negotiation", post(negotiation::open_negotiation))
}
