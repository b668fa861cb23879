use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::{error::AppError, flash};

pub const LOGIN_REQUIRED: &str = "You must be logged in to view this page!";

/// Username of the logged-in user for this request.
///
/// Rejects anonymous requests with a flash and a redirect to `/`, so a
/// handler taking `CurrentUser` never runs without a session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match super::current_username(&session).await {
            Ok(Some(username)) => Ok(CurrentUser(username)),
            Ok(None) => {
                warn!(path = %parts.uri.path(), "anonymous request to protected route");
                flash::push(&session, flash::Level::Danger, LOGIN_REQUIRED)
                    .await
                    .map_err(|e| AppError::from(e).into_response())?;
                Err(Redirect::to("/").into_response())
            }
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}
