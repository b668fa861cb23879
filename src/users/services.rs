use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    auth::password::{hash_password, password_matches},
    error::AppError,
    store::{Store, StoreError},
    users::{
        dto::{Credentials, Registration},
        repo_types::User,
    },
};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Failed(#[from] AppError),
}

impl User {
    /// Hashes the password and builds the record to insert.
    pub fn register(reg: Registration) -> anyhow::Result<User> {
        Ok(User {
            password_hash: hash_password(&reg.password)?,
            username: reg.username,
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
        })
    }
}

/// Checks for the username first, then relies on the unique constraint for
/// concurrent registrations of the same name.
pub async fn register_user(store: &dyn Store, reg: Registration) -> Result<User, RegisterError> {
    if store
        .find_user(&reg.username)
        .await
        .map_err(AppError::from)?
        .is_some()
    {
        warn!(username = %reg.username, "username already registered");
        return Err(RegisterError::UsernameTaken);
    }

    let user = User::register(reg).map_err(AppError::from)?;
    match store.insert_user(&user).await {
        Ok(()) => Ok(user),
        Err(StoreError::Conflict) => {
            warn!(username = %user.username, "username taken at insert");
            Err(RegisterError::UsernameTaken)
        }
        Err(e) => Err(RegisterError::Failed(e.into())),
    }
}

/// `Some(user)` iff the user exists and the password matches its hash.
/// Unknown users still pay for one hash check.
pub async fn authenticate(store: &dyn Store, creds: &Credentials) -> Result<Option<User>, AppError> {
    let user = store.find_user(&creds.username).await?;
    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    let matches = password_matches(&creds.password, stored)?;
    match user {
        Some(user) if matches => Ok(Some(user)),
        Some(_) => {
            debug!(username = %creds.username, "login with wrong password");
            Ok(None)
        }
        None => {
            debug!(username = %creds.username, "login for unknown user");
            Ok(None)
        }
    }
}
