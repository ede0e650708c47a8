//! Booking status values shared by the negotiation engine and the DB layer.
//!
//! The booking record itself is owned by the storage layer. Negotiation only
//! ever *directs* a status change; it never writes the booking.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status stored in `bookings.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Negotiating,
    /// Terms agreed; contract generation happens downstream.
    Contracting,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "negotiating" => Ok(Self::Negotiating),
            "contracting" => Ok(Self::Contracting),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid booking status '{s}'. Must be one of: pending, negotiating, \
                 contracting, confirmed, cancelled"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Negotiating => "negotiating",
            Self::Contracting => "contracting",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}
