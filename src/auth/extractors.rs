use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The verified session attached to a request by `AuthGate`.
///
/// Only the gate creates it; handlers get a read-only copy through the
/// `FromRequest` impl below.
///
/// If it is missing from the extensions (the route is not behind `AuthGate`),
/// extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: Uuid,
    token: String,
}

impl AuthenticatedUser {
    pub(crate) fn new(user_id: Uuid, token: String) -> Self {
        Self { user_id, token }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The raw token the request was authenticated with.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "No authenticated user on request. Ensure AuthGate is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
