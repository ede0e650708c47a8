//! Repository for the `bookings` table and the joins negotiation reads.

use encore_core::booking::BookingStatus;
use encore_core::conversation::BookingParties;
use encore_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::booking::{Booking, BookingPartiesRow};

/// Column list for bookings queries.
const COLUMNS: &str = "id, artist_id, event_id, status, offer_amount, created_at, updated_at";

/// Provides read access to bookings and applies negotiation directives.
pub struct BookingRepo;

impl BookingRepo {
    /// Find a booking by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a booking with its artist, event organizer, and venue.
    ///
    /// Returns `None` if the booking does not exist. Missing associations
    /// come back as `None` fields inside [`BookingParties`].
    pub async fn find_parties(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BookingParties>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingPartiesRow>(
            "SELECT
                b.id AS booking_id,
                a.user_id AS artist_user_id,
                a.display_name AS artist_display_name,
                e.id AS event_id,
                e.organizer_user_id,
                v.id AS venue_id,
                v.user_id AS venue_user_id,
                v.name AS venue_name
             FROM bookings b
             LEFT JOIN artists a ON a.id = b.artist_id
             LEFT JOIN events e ON e.id = b.event_id
             LEFT JOIN venues v ON v.id = e.venue_id
             WHERE b.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(BookingParties::from))
    }

    /// Apply the status and offer-amount directives of a transition.
    ///
    /// `None` leaves the corresponding column unchanged. A no-op when both
    /// are `None`.
    pub async fn apply_directives(
        conn: &mut PgConnection,
        booking_id: DbId,
        status: Option<BookingStatus>,
        offer_amount: Option<Decimal>,
    ) -> Result<(), sqlx::Error> {
        if status.is_none() && offer_amount.is_none() {
            return Ok(());
        }

        sqlx::query(
            "UPDATE bookings SET
                status = COALESCE($2, status),
                offer_amount = COALESCE($3, offer_amount),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(booking_id)
        .bind(status.map(|s| s.as_str()))
        .bind(offer_amount)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
