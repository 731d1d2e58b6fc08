#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use tasksync::auth::{AuthResponse, TokenKeys, TokenLifetime, AUTH_HEADER};
use tasksync::{db, routes};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration_test_secret";
pub const TEST_PASSWORD: &str = "Password123!";

/// Connects to the test database and applies the migrations.
///
/// Store-backed tests are `#[ignore]`d; run them with
/// `DATABASE_URL=... cargo test -- --ignored`.
pub async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn test_keys() -> TokenKeys {
    TokenKeys::new(TEST_SECRET, TokenLifetime::Infinite)
}

pub async fn init_app(
    pool: &PgPool,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_keys()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// An email nobody else in the test run will use.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn signup_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert!(
        status.is_success(),
        "Signup failed. Status: {}. Body: {}",
        status,
        String::from_utf8_lossy(&body)
    );

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "Login failed for {}", email);
    test::read_body_json(resp).await
}

pub fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((AUTH_HEADER, token.to_string()))
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}
