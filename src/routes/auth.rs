use crate::{
    auth::{
        extract_token,
        password::{hash_password_blocking, verify_password_blocking},
        resolve_session, AuthResponse, AuthenticatedUser, LoginRequest, SignupRequest, TokenKeys,
    },
    db::UserRepository,
    error::AppError,
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns it (without the password hash).
/// A second signup with the same email is rejected with 400.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;
    let SignupRequest {
        name,
        email,
        password,
    } = signup_data.into_inner();
    log::info!("Signup attempt for {}", email);

    let password_hash = hash_password_blocking(password).await?;

    match UserRepository::create(&pool, &name, &email, &password_hash).await? {
        Some(user) => {
            log::info!("User created: {} ({})", user.email, user.id);
            Ok(HttpResponse::Created().json(user))
        }
        None => {
            log::info!("Signup rejected, email already registered: {}", email);
            Err(AppError::BadRequest(
                "User with the same email already exists!".into(),
            ))
        }
    }
}

/// Login user
///
/// Checks the credentials and returns a session token with the user record.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();

    let user = match UserRepository::find_by_email(&pool, &email).await? {
        Some(user) => user,
        None => {
            log::info!("Login failed, unknown email: {}", email);
            return Err(AppError::BadRequest(
                "User with this email does not exist!".into(),
            ));
        }
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        log::info!("Login failed, incorrect password for {}", email);
        return Err(AppError::BadRequest("Incorrect password!".into()));
    }

    let token = keys.issue(user.id)?;
    log::info!("Login successful for {} ({})", user.email, user.id);

    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

/// Token check
///
/// Always answers 200 with a bare boolean: `true` when the `x-auth-token`
/// header holds a valid token for an existing user, `false` for any failure.
#[post("/tokenIsValid")]
pub async fn token_is_valid(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    req: HttpRequest,
) -> impl Responder {
    let valid = match extract_token(req.headers()) {
        None => false,
        Some(token) => match resolve_session(&pool, &keys, &token).await {
            Ok(resolved) => resolved.is_some(),
            Err(e) => {
                log::error!("Token check failed: {}", e);
                false
            }
        },
    };

    HttpResponse::Ok().json(valid)
}

/// Current user
///
/// Returns the authenticated user's record together with the token used.
/// Mounted behind `AuthGate`.
pub async fn current_user(
    pool: web::Data<PgPool>,
    session: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = UserRepository::find_by_id(&pool, session.user_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found!".into()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token: session.token().to_string(),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenLifetime, AUTH_HEADER};
    use actix_web::{test, App};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(500))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap()
    }

    #[actix_rt::test]
    async fn test_token_is_valid_never_errors() {
        let keys = TokenKeys::new("routes_test_secret", TokenLifetime::Infinite);
        let genuine = keys.issue(Uuid::new_v4()).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(unreachable_pool()))
                .app_data(web::Data::new(keys))
                .service(token_is_valid),
        )
        .await;

        // No header, garbage, and a genuine token whose user lookup fails.
        let requests = vec![
            test::TestRequest::post().uri("/tokenIsValid").to_request(),
            test::TestRequest::post()
                .uri("/tokenIsValid")
                .insert_header((AUTH_HEADER, "garbage"))
                .to_request(),
            test::TestRequest::post()
                .uri("/tokenIsValid")
                .insert_header((AUTH_HEADER, genuine))
                .to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body, json!(false));
        }
    }

    #[actix_rt::test]
    async fn test_signup_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(unreachable_pool()))
                .service(signup),
        )
        .await;

        // Rejected before any hashing or store access.
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(json!({ "name": "A", "email": "invalid-email", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(json!({ "email": "a@x.com", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
