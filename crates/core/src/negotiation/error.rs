use crate::types::DbId;

/// Rejections produced while opening or advancing a negotiation.
///
/// None of these are transient; callers surface them to the user and do
/// not retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// The workflow reached `ACCEPTED` or `DECLINED`. Checked before anything else.
    #[error("Workflow is locked")]
    Locked,

    #[error(
        "Not your turn. Awaiting user {}",
        .awaiting_user_id.map_or_else(|| "none".to_string(), |id| id.to_string())
    )]
    NotYourTurn { awaiting_user_id: Option<DbId> },

    #[error("Invalid action")]
    InvalidAction,

    #[error("Max rounds reached. Must Accept or Decline.")]
    MaxRoundsReached,

    #[error("Booking has no artist")]
    MissingArtist,
}
