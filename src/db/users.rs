use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password, created_at, updated_at";

pub struct UserRepository;

impl UserRepository {
    /// Inserts a new user unless the email is already taken.
    ///
    /// Uniqueness is enforced by the single `INSERT ... ON CONFLICT` statement,
    /// so concurrent signups for one address yield exactly one row. `Ok(None)`
    /// means the email already exists.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Single indexed lookup used to check that a session still has a live account.
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
        let (exists,) =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }
}
