//! Booking models. Bookings are created elsewhere; negotiation reads their
//! parties and writes `status` / `offer_amount`.

use encore_core::conversation::{ArtistParty, BookingParties, EventParties, VenueParty};
use encore_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub artist_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub status: String,
    pub offer_amount: Option<Decimal>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A booking joined with its artist, event, and venue.
#[derive(Debug, Clone, FromRow)]
pub struct BookingPartiesRow {
    pub booking_id: DbId,
    pub artist_user_id: Option<DbId>,
    pub artist_display_name: Option<String>,
    pub event_id: Option<DbId>,
    pub organizer_user_id: Option<DbId>,
    pub venue_id: Option<DbId>,
    pub venue_user_id: Option<DbId>,
    pub venue_name: Option<String>,
}

impl From<BookingPartiesRow> for BookingParties {
    fn from(row: BookingPartiesRow) -> Self {
        let artist = match (row.artist_user_id, row.artist_display_name) {
            (Some(user_id), Some(display_name)) => Some(ArtistParty {
                user_id,
                display_name,
            }),
            _ => None,
        };

        let venue = row.venue_id.map(|_| VenueParty {
            user_id: row.venue_user_id,
            name: row.venue_name.unwrap_or_default(),
        });

        let event = row.event_id.map(|_| EventParties {
            organizer_user_id: row.organizer_user_id,
            venue,
        });

        BookingParties {
            booking_id: row.booking_id,
            artist,
            event,
        }
    }
}
