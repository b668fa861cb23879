use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Feedback {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub username: String, // owner
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub title: String,
    pub content: String,
    pub username: String,
}
