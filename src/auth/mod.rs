//! Session-backed authentication.
//!
//! The logged-in username is the only authorization signal. Handlers get it
//! through the [`extractors::CurrentUser`] extractor rather than reading the
//! session directly.

use tower_sessions::Session;

pub mod csrf;
pub mod extractors;
pub mod password;

pub const SESSION_USERNAME_KEY: &str = "username";

/// Binds `username` to the session under a fresh session id.
pub async fn log_in(session: &Session, username: &str) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USERNAME_KEY, username).await
}

/// Returns the username that was logged in, if any.
pub async fn log_out(session: &Session) -> Result<Option<String>, tower_sessions::session::Error> {
    session.remove::<String>(SESSION_USERNAME_KEY).await
}

pub async fn current_username(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(SESSION_USERNAME_KEY).await
}
