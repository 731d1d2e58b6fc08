use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task};

const TASK_COLUMNS: &str =
    "id, title, description, hex_color, uid, due_at, created_at, updated_at";

/// Bind parameters per inserted row (one per column above).
const BINDS_PER_ROW: usize = 8;

/// PostgreSQL caps a single statement at 65535 bind parameters.
const ROWS_PER_STATEMENT: usize = u16::MAX as usize / BINDS_PER_ROW;

pub struct TaskRepository;

impl TaskRepository {
    pub async fn create(pool: &PgPool, task: &NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = TASK_COLUMNS
        );

        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(&task.hex_color)
            .bind(task.uid)
            .bind(task.due_at)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(pool)
            .await?;

        Ok(created)
    }

    /// All tasks owned by `owner`, soonest due first.
    pub async fn list_for_owner(pool: &PgPool, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE uid = $1 ORDER BY due_at ASC, created_at ASC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Deletes the task only if `owner` owns it. Returns whether a row was removed.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND uid = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Inserts every row of `batch` or none of them.
    ///
    /// Rows go in as multi-row `INSERT ... RETURNING` statements inside one
    /// transaction. The returned tasks follow the order of `batch`.
    pub async fn insert_many(pool: &PgPool, batch: &[NewTask]) -> Result<Vec<Task>, AppError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = pool.begin().await?;
        let mut inserted: HashMap<Uuid, Task> = HashMap::with_capacity(batch.len());

        for chunk in batch.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO tasks ({}) ", TASK_COLUMNS));

            builder.push_values(chunk, |mut row, task| {
                row.push_bind(task.id)
                    .push_bind(&task.title)
                    .push_bind(&task.description)
                    .push_bind(&task.hex_color)
                    .push_bind(task.uid)
                    .push_bind(task.due_at)
                    .push_bind(task.created_at)
                    .push_bind(task.updated_at);
            });
            builder.push(format!(" RETURNING {}", TASK_COLUMNS));

            let rows = builder
                .build_query_as::<Task>()
                .fetch_all(&mut *tx)
                .await?;
            inserted.extend(rows.into_iter().map(|task| (task.id, task)));
        }

        tx.commit().await?;

        batch
            .iter()
            .map(|task| {
                inserted.remove(&task.id).ok_or_else(|| {
                    AppError::InternalServerError(format!(
                        "Inserted task {} missing from RETURNING set",
                        task.id
                    ))
                })
            })
            .collect()
    }
}
