use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// bcrypt work factor used for every stored password.
pub const PASSWORD_HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt digest.
///
/// A mismatch is `Ok(false)`; `Err` means the hasher itself failed (for example
/// a corrupted digest) and must not be reported as a wrong password.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Runs [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    web::block(move || hash_password(&password)).await?
}

/// Runs [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    web::block(move || verify_password(&password, &hashed_password)).await?
}
