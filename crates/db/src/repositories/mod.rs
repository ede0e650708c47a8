//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must run inside a
//! caller's transaction take `&mut PgConnection` instead.

pub mod booking_repo;
pub mod conversation_repo;
pub mod message_repo;
pub mod negotiation_repo;
pub mod workflow_repo;

pub use booking_repo::BookingRepo;
pub use conversation_repo::{ConversationRepo, OpenedConversation};
pub use message_repo::MessageRepo;
pub use negotiation_repo::{CommittedTransition, NegotiationRepo};
pub use workflow_repo::WorkflowRepo;
