use serde::Serialize;
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String, // primary key
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never rendered
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
