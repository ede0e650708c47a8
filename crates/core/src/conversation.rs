//! Conversation participants, types, and the open-conversation gate.
//!
//! A negotiation conversation is keyed by `(entity_type, entity_id,
//! conversation_type)`, for example `("booking", 12, "negotiation")`. Opening
//! the same key twice must return the existing conversation rather than
//! creating a second one.

use serde::{Deserialize, Serialize};

use crate::negotiation::NegotiationError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Conversation types
// ---------------------------------------------------------------------------

/// Known conversation types.
pub mod conversation_types {
    /// Governed by the booking negotiation workflow.
    pub const NEGOTIATION: &str = "negotiation";
    /// Free-form messaging with no workflow.
    pub const GENERAL: &str = "general";
}

/// The set of all valid conversation types.
pub const VALID_CONVERSATION_TYPES: &[&str] =
    &[conversation_types::NEGOTIATION, conversation_types::GENERAL];

/// Known entity types a conversation can hang off.
pub mod entity_types {
    pub const BOOKING: &str = "booking";
}

/// The set of all valid conversation entity types.
pub const VALID_ENTITY_TYPES: &[&str] = &[entity_types::BOOKING];

/// Prefix of every negotiation subject line.
pub const NEGOTIATION_SUBJECT_PREFIX: &str = "Negotiation: ";

// ---------------------------------------------------------------------------
// Conversation key
// ---------------------------------------------------------------------------

/// Idempotency key for opening a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub entity_type: String,
    pub entity_id: DbId,
    pub conversation_type: String,
}

impl ConversationKey {
    /// Key of the negotiation conversation for a booking.
    pub fn booking_negotiation(booking_id: DbId) -> Self {
        Self {
            entity_type: entity_types::BOOKING.to_string(),
            entity_id: booking_id,
            conversation_type: conversation_types::NEGOTIATION.to_string(),
        }
    }

    /// Validate entity type, entity id, and conversation type.
    pub fn validate(&self) -> Result<(), String> {
        if !VALID_ENTITY_TYPES.contains(&self.entity_type.as_str()) {
            return Err(format!(
                "Invalid entity_type '{}'. Must be one of: {}",
                self.entity_type,
                VALID_ENTITY_TYPES.join(", ")
            ));
        }
        if self.entity_id <= 0 {
            return Err(format!("entity_id must be positive, got {}", self.entity_id));
        }
        if !VALID_CONVERSATION_TYPES.contains(&self.conversation_type.as_str()) {
            return Err(format!(
                "Invalid conversation_type '{}'. Must be one of: {}",
                self.conversation_type,
                VALID_CONVERSATION_TYPES.join(", ")
            ));
        }
        Ok(())
    }
}

/// Whether an open-conversation request should return `existing` instead
/// of creating a new conversation and workflow.
pub fn should_return_existing<T>(existing: Option<&T>) -> bool {
    existing.is_some()
}

// ---------------------------------------------------------------------------
// Participant resolution
// ---------------------------------------------------------------------------

/// The booking's artist, as needed for participant resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistParty {
    pub user_id: DbId,
    pub display_name: String,
}

/// The venue attached to a booking's event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueParty {
    /// Managing user, if the venue has one.
    pub user_id: Option<DbId>,
    pub name: String,
}

/// The parties attached to a booking's event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParties {
    pub organizer_user_id: Option<DbId>,
    pub venue: Option<VenueParty>,
}

/// A booking with the associations participant resolution reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingParties {
    pub booking_id: DbId,
    pub artist: Option<ArtistParty>,
    pub event: Option<EventParties>,
}

/// The two negotiating parties of a booking and the conversation subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationParticipants {
    pub artist_user_id: DbId,
    /// Organizer, or the venue's user when the event has no organizer.
    pub other_party_user_id: Option<DbId>,
    /// Artist first; never contains duplicates.
    pub participant_ids: Vec<DbId>,
    pub subject: String,
}

impl ConversationParticipants {
    pub fn contains(&self, user_id: DbId) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// The participant opposite `acting_user_id`.
    pub fn other_participant(&self, acting_user_id: DbId) -> DbId {
        counterpart_of(&self.participant_ids, acting_user_id)
    }
}

/// The first participant who is not `acting_user_id`.
///
/// When one person holds both roles there is no one else, and the acting
/// user is their own counterpart.
pub fn counterpart_of(participant_ids: &[DbId], acting_user_id: DbId) -> DbId {
    participant_ids
        .iter()
        .copied()
        .find(|&id| id != acting_user_id)
        .unwrap_or(acting_user_id)
}

/// Resolve who negotiates a booking.
///
/// The counterpart is the event's organizer, falling back to the event's
/// venue user. Pure: the same input always produces the same output.
pub fn resolve_participants(
    booking: &BookingParties,
) -> Result<ConversationParticipants, NegotiationError> {
    let artist = booking.artist.as_ref().ok_or(NegotiationError::MissingArtist)?;

    let other_party_user_id = booking.event.as_ref().and_then(|event| {
        event
            .organizer_user_id
            .or_else(|| event.venue.as_ref().and_then(|venue| venue.user_id))
    });

    let mut participant_ids = vec![artist.user_id];
    if let Some(other) = other_party_user_id {
        if other != artist.user_id {
            participant_ids.push(other);
        }
    }

    Ok(ConversationParticipants {
        artist_user_id: artist.user_id,
        other_party_user_id,
        participant_ids,
        subject: format!("{NEGOTIATION_SUBJECT_PREFIX}{}", artist.display_name),
    })
}
