use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the user the session belongs to.
    pub id: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: u64,
    /// Expiration timestamp (seconds since epoch). Absent for non-expiring sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// How long an issued session token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLifetime {
    /// Tokens carry no `exp` claim and stay valid until the signing secret changes.
    Infinite,
    /// Tokens expire this long after issue.
    Finite(Duration),
}

/// Signing material and token policy, built once at startup and shared read-only.
///
/// Rotating the secret means restarting the process with a new `JWT_SECRET`;
/// every token issued under the old secret stops verifying.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: TokenLifetime,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime: TokenLifetime) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> TokenLifetime {
        self.lifetime
    }

    /// Mints a session token for `user_id`.
    ///
    /// # Returns
    /// The signed JWT, or `AppError::InternalServerError` if encoding fails.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, now_secs())
    }

    fn issue_at(&self, user_id: Uuid, issued_at: u64) -> Result<String, AppError> {
        let exp = match self.lifetime {
            TokenLifetime::Infinite => None,
            TokenLifetime::Finite(lifetime) => Some(issued_at.saturating_add(lifetime.as_secs())),
        };

        let claims = Claims {
            id: user_id,
            iat: issued_at,
            exp,
        };

        Ok(encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)?)
    }

    /// Verifies a session token and returns the user id it was issued for.
    ///
    /// Every failure (malformed token, bad encoding, wrong signature, unexpected
    /// payload, expiry) yields `None`. The cause is only logged at debug level so
    /// callers cannot tell failures apart.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        match self.decode_claims(token) {
            Ok(claims) => Some(claims.id),
            Err(e) => {
                log::debug!("Rejected session token: {:?}", e.kind());
                None
            }
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation()).map(|data| data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        if self.lifetime == TokenLifetime::Infinite {
            // `exp` is still checked when a token happens to carry one.
            validation.required_spec_claims.clear();
        }
        validation
    }
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
