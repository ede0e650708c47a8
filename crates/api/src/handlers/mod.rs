pub mod conversation;
pub mod negotiation;
