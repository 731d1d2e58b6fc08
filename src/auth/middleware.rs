use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenKeys;
use crate::db::UserRepository;
use crate::error::AppError;

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Reads the session token from the request headers, if any.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Resolves a session token to the id of a user that still exists.
///
/// `Ok(None)` covers every way a token can be unacceptable: bad signature,
/// malformed payload, expiry, or an account that no longer exists. `Err` is
/// reserved for store failures.
pub async fn resolve_session(
    pool: &PgPool,
    keys: &TokenKeys,
    token: &str,
) -> Result<Option<Uuid>, AppError> {
    let Some(user_id) = keys.verify(token) else {
        return Ok(None);
    };

    if UserRepository::exists(pool, user_id).await? {
        Ok(Some(user_id))
    } else {
        log::debug!("Session token for unknown user {}", user_id);
        Ok(None)
    }
}

/// Gate for protected routes.
///
/// Requires an `x-auth-token` header holding a valid session token for an
/// existing user. On success the request carries an [`AuthenticatedUser`];
/// otherwise it is answered with 401 before reaching the handler.
///
/// Needs `web::Data<PgPool>` and `web::Data<TokenKeys>` registered on the app.
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(app_err) => {
                    log::warn!("{} {} rejected: {}", req.method(), req.path(), app_err);
                    let response = app_err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("No auth token, access denied!".into()))?;

    let pool = req
        .app_data::<web::Data<PgPool>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("PgPool is not registered".into()))?;
    let keys = req
        .app_data::<web::Data<TokenKeys>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("TokenKeys are not registered".into()))?;

    match resolve_session(&pool, &keys, &token).await? {
        Some(user_id) => Ok(AuthenticatedUser::new(user_id, token)),
        None => Err(AppError::Unauthorized(
            "Token verification failed, authorization denied!".into(),
        )),
    }
}
