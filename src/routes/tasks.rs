use crate::{
    auth::AuthenticatedUser,
    db::TaskRepository,
    error::AppError,
    models::{DeleteTaskRequest, TaskSnapshot},
    sync,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

/// Retrieves every task owned by the authenticated user, soonest due first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid session token.
/// - `500 Internal Server Error`: store failure.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    session: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = TaskRepository::list_for_owner(&pool, session.user_id()).await?;
    log::info!("Found {} tasks for user {}", tasks.len(), session.user_id());

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// `dueAt` plus optional `title`, `description`, `hexColor`, `createdAt` and
/// `updatedAt`. Client-local `id`, `uid` and `isSynced` are ignored: the owner
/// is always the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the stored `Task`.
/// - `400 Bad Request`: malformed JSON, unknown fields or an unreadable `dueAt`.
/// - `401 Unauthorized`: missing or invalid session token.
/// - `422 Unprocessable Entity`: field validation failed.
/// - `500 Internal Server Error`: store failure.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    session: AuthenticatedUser,
    task_data: web::Json<TaskSnapshot>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let new_task = task_data
        .into_inner()
        .into_new_task(session.user_id(), Utc::now());
    let task = TaskRepository::create(&pool, &new_task).await?;
    log::info!("Task {} created for user {}", task.id, task.uid);

    Ok(HttpResponse::Created().json(task))
}

/// Deletes a task owned by the authenticated user.
///
/// Tasks of other users are never touched. Deleting an id the caller does not
/// own (or that is already gone) still answers `true`, so clients can retry.
///
/// ## Request Body:
/// `{"taskId": "<uuid>"}`
///
/// ## Responses:
/// - `200 OK`: `true`.
/// - `401 Unauthorized`: missing or invalid session token.
/// - `500 Internal Server Error`: store failure.
#[delete("")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    session: AuthenticatedUser,
    body: web::Json<DeleteTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task_id = body.into_inner().task_id;

    if TaskRepository::delete_owned(&pool, task_id, session.user_id()).await? {
        log::info!("Task {} deleted by user {}", task_id, session.user_id());
    } else {
        log::info!(
            "Delete of task {} by user {} matched nothing",
            task_id,
            session.user_id()
        );
    }

    Ok(HttpResponse::Ok().json(true))
}

/// Stores a batch of tasks created offline.
///
/// Every element becomes one new task owned by the authenticated user, and the
/// whole batch is stored or none of it is. The call does not deduplicate:
/// sending the same batch twice stores it twice.
///
/// ## Responses:
/// - `201 Created`: JSON array of the stored tasks, in request order.
/// - `400 Bad Request`: malformed JSON, unknown fields or an unreadable timestamp.
/// - `401 Unauthorized`: missing or invalid session token.
/// - `422 Unprocessable Entity`: an element failed validation.
/// - `500 Internal Server Error`: store failure.
#[post("/sync")]
pub async fn sync_tasks(
    pool: web::Data<PgPool>,
    session: AuthenticatedUser,
    snapshots: web::Json<Vec<TaskSnapshot>>,
) -> Result<impl Responder, AppError> {
    let stored = sync::reconcile(&pool, session.user_id(), snapshots.into_inner()).await?;

    Ok(HttpResponse::Created().json(stored))
}
