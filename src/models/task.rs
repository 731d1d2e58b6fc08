use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::timestamp::ClientTimestamp;

lazy_static! {
    // RRGGBB or AARRGGBB, optional leading '#'
    static ref HEX_COLOR_REGEX: Regex =
        Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap();
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// Display colour chosen by the client.
    pub hex_color: String,
    /// Identifier of the owning user.
    pub uid: Uuid,
    /// When the task is due.
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully normalized row, ready to be inserted.
///
/// Only built from validated client input together with the session's user id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub hex_color: String,
    pub uid: Uuid,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Colour stored for tasks submitted without a `hexColor`.
pub const DEFAULT_HEX_COLOR: &str = "#000000";

/// One task as sent by a client, to `POST /tasks` or as an element of
/// `POST /tasks/sync`.
///
/// Only `dueAt` is required. `id`, `uid` and `isSynced` describe the client's
/// local copy; they are accepted so existing clients can post their records
/// unchanged, then dropped. Any other field is rejected.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskSnapshot {
    /// Between 1 and 200 characters when present.
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(regex(
        path = "HEX_COLOR_REGEX",
        message = "hexColor must be 6 or 8 hexadecimal digits"
    ))]
    pub hex_color: Option<String>,

    pub due_at: ClientTimestamp,

    #[serde(default)]
    pub created_at: Option<ClientTimestamp>,

    #[serde(default)]
    pub updated_at: Option<ClientTimestamp>,

    #[serde(rename = "id", default)]
    pub _client_id: Option<IgnoredAny>,

    #[serde(rename = "uid", default)]
    pub _client_owner: Option<IgnoredAny>,

    #[serde(rename = "isSynced", default)]
    pub _client_synced: Option<IgnoredAny>,
}

impl TaskSnapshot {
    /// Normalizes the snapshot into a row owned by `owner`.
    ///
    /// Missing client timestamps fall back to `now`; a missing title or
    /// description is stored empty.
    pub fn into_new_task(self, owner: Uuid, now: DateTime<Utc>) -> NewTask {
        NewTask {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            hex_color: self
                .hex_color
                .unwrap_or_else(|| DEFAULT_HEX_COLOR.to_string()),
            uid: owner,
            due_at: self.due_at.into_inner(),
            created_at: self.created_at.map_or(now, ClientTimestamp::into_inner),
            updated_at: self.updated_at.map_or(now, ClientTimestamp::into_inner),
        }
    }
}

/// Payload of `DELETE /tasks`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteTaskRequest {
    pub task_id: Uuid,
}
