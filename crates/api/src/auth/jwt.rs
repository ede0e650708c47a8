//! Access-token validation.
//!
//! Tokens are HS256 JWTs minted by the auth service with a shared secret.
//! This server never issues tokens to clients; it only needs the subject.
//! [`issue_token`] exists for local tooling and tests.

use chrono::{Duration, Utc};
use encore_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default clock-skew allowance when checking `exp`, in seconds.
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// The claims this server reads. Extra claims in the token are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id of the caller.
    pub sub: DbId,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret shared with the auth service.
    pub secret: String,
    /// Clock-skew allowance applied to `exp`.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_LEEWAY_SECS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or the leeway is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let leeway_secs: u64 = std::env::var("JWT_LEEWAY_SECS")
            .unwrap_or_else(|_| DEFAULT_LEEWAY_SECS.to_string())
            .parse()
            .expect("JWT_LEEWAY_SECS must be a valid u64");

        Self {
            secret,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation
    }
}

/// Verify signature and expiry and return the caller's user id.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<DbId, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?;
    Ok(data.claims.sub)
}

/// Sign a token for `user_id` that expires after `ttl`.
pub fn issue_token(
    user_id: DbId,
    ttl: Duration,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}
