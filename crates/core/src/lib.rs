//! Domain logic for the Encore booking marketplace.
//!
//! Everything here is pure: no database, no HTTP, no clock reads. The `db`
//! and `api` crates call into these functions and persist what they return.

pub mod booking;
pub mod conversation;
pub mod error;
pub mod negotiation;
pub mod types;
