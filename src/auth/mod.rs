pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{extract_token, resolve_session, AuthGate, AUTH_HEADER};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, TokenLifetime};

/// Represents the payload for a new account signup.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    /// Display name. Between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address for the new account. Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Must not be empty.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by login and by the current-user endpoint: the session token
/// alongside the user record, flattened into one JSON object.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT for session authentication.
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid_email = SignupRequest {
            name: "A".to_string(),
            email: "axcom".to_string(),
            password: "pw".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let empty_name = SignupRequest {
            name: "".to_string(),
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(empty_name.validate().is_err());

        let empty_password = SignupRequest {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_auth_response_is_flat() {
        let now = Utc::now();
        let response = AuthResponse {
            token: "tok".to_string(),
            user: User {
                id: Uuid::new_v4(),
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                created_at: now,
                updated_at: now,
            },
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["token"], "tok");
        assert_eq!(value["email"], "a@x.com");
        assert!(value.get("user").is_none());
        assert!(value.get("password").is_none());
    }
}
