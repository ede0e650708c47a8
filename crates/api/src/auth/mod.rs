//! Bearer-token verification. Tokens are issued by the auth service; this
//! crate only validates them.

pub mod jwt;
