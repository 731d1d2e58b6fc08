pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::auth::AuthGate;
use crate::error::AppError;

/// Upper bound for JSON bodies. Sync batches are the largest payloads.
pub const JSON_PAYLOAD_LIMIT: usize = 4 * 1024 * 1024;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON payload: {}", err)).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_PAYLOAD_LIMIT)
            .error_handler(json_error),
    )
    .service(health::index)
    .service(health::health)
    .service(
        web::scope("/auth")
            .service(auth::signup)
            .service(auth::login)
            .service(auth::token_is_valid)
            .service(
                web::resource(vec!["", "/"])
                    .wrap(AuthGate)
                    .route(web::get().to(auth::current_user)),
            ),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthGate)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::delete_task)
            .service(tasks::sync_tasks),
    );
}
