//! PostgreSQL access: pool bootstrap, schema migrations and the repositories
//! for users and tasks.

pub mod tasks;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

pub use tasks::TaskRepository;
pub use users::UserRepository;

/// Opens the connection pool shared by every request.
pub async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations under `./migrations`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
