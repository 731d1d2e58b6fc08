use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account as stored in the `users` table.
///
/// The password hash is loaded from the `password` column but is never
/// serialized into a response.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$12$somethingsecret".to_string(),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["email"], json!("a@x.com"));
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("createdAt").is_some());
        assert!(!value.to_string().contains("somethingsecret"));
    }
}
