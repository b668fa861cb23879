//! Per-session synchronizer token for form posts.

use rand::{distributions::Alphanumeric, Rng};
use tower_sessions::Session;
use tracing::warn;

const CSRF_KEY: &str = "_csrf_token";
const TOKEN_LEN: usize = 32;

/// Returns the session's token, generating one on first use.
pub async fn token(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(existing) = session.get::<String>(CSRF_KEY).await? {
        return Ok(existing);
    }
    let fresh: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    session.insert(CSRF_KEY, &fresh).await?;
    Ok(fresh)
}

pub async fn verify(session: &Session, submitted: &str) -> Result<bool, tower_sessions::session::Error> {
    let expected = session.get::<String>(CSRF_KEY).await?;
    let ok = matches!(expected, Some(ref t) if !submitted.is_empty() && t == submitted);
    if !ok {
        warn!("csrf token missing or mismatched");
    }
    Ok(ok)
}
