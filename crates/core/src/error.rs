use crate::negotiation::NegotiationError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<NegotiationError> for CoreError {
    /// Negotiation rejections are user-facing; the original message is kept
    /// verbatim so clients can show it as-is.
    fn from(err: NegotiationError) -> Self {
        let message = err.to_string();
        match err {
            NegotiationError::Locked | NegotiationError::MaxRoundsReached => {
                CoreError::Conflict(message)
            }
            NegotiationError::NotYourTurn { .. } => CoreError::Forbidden(message),
            NegotiationError::InvalidAction | NegotiationError::MissingArtist => {
                CoreError::Validation(message)
            }
        }
    }
}
