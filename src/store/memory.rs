use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::async_trait;

use super::{Store, StoreError};
use crate::feedback::repo_types::{Feedback, NewFeedback};
use crate::users::repo_types::User;

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    feedback: BTreeMap<i32, Feedback>,
    next_feedback_id: i32,
}

/// Same semantics as the Postgres schema: unique usernames, owner-scoped
/// feedback writes, cascade on user delete.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    pub fn feedback_count(&self) -> usize {
        self.tables().feedback.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables().users.get(username).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.tables();
        if t.users.contains_key(&user.username) {
            return Err(StoreError::Conflict);
        }
        t.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut t = self.tables();
        let removed = t.users.remove(username).is_some();
        if removed {
            t.feedback.retain(|_, f| f.username != username);
        }
        Ok(removed)
    }

    async fn find_feedback(&self, id: i32) -> Result<Option<Feedback>, StoreError> {
        Ok(self.tables().feedback.get(&id).cloned())
    }

    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>, StoreError> {
        Ok(self
            .tables()
            .feedback
            .values()
            .filter(|f| f.username == username)
            .cloned()
            .collect())
    }

    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError> {
        let mut t = self.tables();
        if !t.users.contains_key(&new.username) {
            return Err(StoreError::UnknownUser);
        }
        t.next_feedback_id += 1;
        let feedback = Feedback {
            id: t.next_feedback_id,
            title: new.title.clone(),
            content: new.content.clone(),
            username: new.username.clone(),
        };
        t.feedback.insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    async fn update_feedback(
        &self,
        id: i32,
        owner: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        let mut t = self.tables();
        match t.feedback.get_mut(&id) {
            Some(f) if f.username == owner => {
                f.title = title.to_string();
                f.content = content.to_string();
                Ok(Some(f.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_feedback(&self, id: i32, owner: &str) -> Result<bool, StoreError> {
        let mut t = self.tables();
        if t.feedback.get(&id).is_some_and(|f| f.username == owner) {
            t.feedback.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
