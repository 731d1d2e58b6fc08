//! Bulk ingestion of tasks held by offline clients.
//!
//! A sync call takes the client's task snapshots and stores every one of them
//! as a new row owned by the caller. Nothing is matched against existing rows:
//! posting the same snapshots twice stores them twice. Clients are expected to
//! mark their local copies as synced once the call succeeds.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::TaskRepository;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskSnapshot};

/// Validates and normalizes a batch for `owner`.
///
/// Fails on the first invalid snapshot, naming its position; nothing from the
/// batch is kept in that case.
pub fn normalize_batch(
    snapshots: Vec<TaskSnapshot>,
    owner: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<NewTask>, AppError> {
    snapshots
        .into_iter()
        .enumerate()
        .map(|(index, snapshot)| {
            snapshot
                .validate()
                .map_err(|e| AppError::ValidationError(format!("task[{}]: {}", index, e)))?;
            Ok(snapshot.into_new_task(owner, now))
        })
        .collect()
}

/// Persists `snapshots` as new tasks owned by `owner`, atomically.
///
/// Returns the stored rows in input order. An empty batch returns immediately
/// without touching the store.
pub async fn reconcile(
    pool: &PgPool,
    owner: Uuid,
    snapshots: Vec<TaskSnapshot>,
) -> Result<Vec<Task>, AppError> {
    if snapshots.is_empty() {
        log::debug!("Empty sync batch for user {}", owner);
        return Ok(Vec::new());
    }

    let received = snapshots.len();
    let batch = normalize_batch(snapshots, owner, Utc::now())?;
    let stored = TaskRepository::insert_many(pool, &batch).await?;

    log::info!(
        "Synced {} of {} tasks for user {}",
        stored.len(),
        received,
        owner
    );
    Ok(stored)
}
