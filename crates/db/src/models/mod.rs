//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs for the endpoints that create or change it

pub mod booking;
pub mod conversation;
pub mod message;
pub mod workflow;
