use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tera::Context;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::dto::{FeedbackForm, FeedbackInput};
use super::repo_types::NewFeedback;
use crate::{
    auth::{
        self, csrf,
        extractors::{CurrentUser, LOGIN_REQUIRED},
    },
    error::AppError,
    flash::{self, Level},
    forms::FieldErrors,
    state::AppState,
    store::StoreError,
    urls,
    users::handlers::NO_PERMISSION,
};

pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:username/feedback/add",
            get(add_feedback_form).post(add_feedback),
        )
        .route(
            "/feedback/:id/update",
            get(update_feedback_form).post(update_feedback),
        )
        .route("/feedback/:id/delete", get(delete_feedback))
}

async fn render_form(
    state: &AppState,
    session: &Session,
    heading: &str,
    action: String,
    form: &FeedbackForm,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("heading", heading);
    ctx.insert("action", &action);
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(state
        .views
        .form(session, "feedback_form.html", ctx)
        .await?
        .into_response())
}

/// CSRF first, then field validation.
async fn checked(
    session: &Session,
    form: &FeedbackForm,
) -> Result<Result<FeedbackInput, FieldErrors>, AppError> {
    if csrf::verify(session, &form.csrf_token).await? {
        Ok(form.validate())
    } else {
        Ok(Err(FieldErrors::csrf()))
    }
}

#[instrument(skip(state, session))]
pub async fn add_feedback_form(
    State(state): State<AppState>,
    CurrentUser(_viewer): CurrentUser,
    session: Session,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let action = urls::add_feedback(&username);
    render_form(
        &state,
        &session,
        "Add feedback",
        action,
        &FeedbackForm::default(),
        &FieldErrors::new(),
    )
    .await
}

/// The owner is always the session user; the path username only shapes the URL.
#[instrument(skip(state, session, form))]
pub async fn add_feedback(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(username): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    let input = match checked(&session, &form).await? {
        Ok(i) => i,
        Err(errors) => {
            let action = urls::add_feedback(&username);
            return render_form(&state, &session, "Add feedback", action, &form, &errors).await;
        }
    };

    let inserted = state
        .store
        .insert_feedback(&NewFeedback {
            title: input.title,
            content: input.content,
            username: viewer.clone(),
        })
        .await;
    let feedback = match inserted {
        Ok(f) => f,
        // the account was deleted from another session
        Err(StoreError::UnknownUser) => {
            warn!(username = %viewer, "feedback from a deleted account");
            auth::log_out(&session).await?;
            flash::push(&session, Level::Danger, LOGIN_REQUIRED).await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    info!(feedback_id = feedback.id, "feedback created");
    flash::push(&session, Level::Primary, "Thank you for your feedback!").await?;
    Ok(Redirect::to(&urls::user_profile(&viewer)).into_response())
}

#[instrument(skip(state, session))]
pub async fn update_feedback_form(
    State(state): State<AppState>,
    CurrentUser(_viewer): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let feedback = state
        .store
        .find_feedback(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let form = FeedbackForm::from(&feedback);
    let action = format!("/feedback/{id}/update");
    render_form(&state, &session, "Edit feedback", action, &form, &FieldErrors::new()).await
}

/// A non-owner's valid submission re-renders the form and changes nothing.
#[instrument(skip(state, session, form))]
pub async fn update_feedback(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    let feedback = state
        .store
        .find_feedback(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let action = format!("/feedback/{id}/update");

    let input = match checked(&session, &form).await? {
        Ok(i) => i,
        Err(errors) => {
            return render_form(&state, &session, "Edit feedback", action, &form, &errors).await;
        }
    };

    if feedback.username != viewer {
        warn!(owner = %feedback.username, "update by non-owner ignored");
        let errors = FieldErrors::new();
        return render_form(&state, &session, "Edit feedback", action, &form, &errors).await;
    }

    match state
        .store
        .update_feedback(id, &viewer, &input.title, &input.content)
        .await?
    {
        Some(_) => {
            info!("feedback updated");
            flash::push(&session, Level::Primary, "Thank you for your feedback!").await?;
            Ok(Redirect::to(&urls::user_profile(&viewer)).into_response())
        }
        // deleted or reassigned between the lookup and the update
        None => Err(AppError::NotFound),
    }
}

#[instrument(skip(state, session))]
pub async fn delete_feedback(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let feedback = state
        .store
        .find_feedback(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if feedback.username == viewer && state.store.delete_feedback(id, &viewer).await? {
        info!("feedback deleted");
        flash::push(&session, Level::Primary, "Feedback was deleted").await?;
    } else {
        warn!(owner = %feedback.username, "delete by non-owner refused");
        flash::push(&session, Level::Danger, NO_PERMISSION).await?;
    }
    Ok(Redirect::to(&urls::user_profile(&viewer)))
}
