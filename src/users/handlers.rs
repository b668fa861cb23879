use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tera::Context;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    auth::{self, csrf, extractors::CurrentUser},
    error::AppError,
    flash::{self, Level},
    forms::FieldErrors,
    state::AppState,
    urls,
    users::{
        dto::{LoginForm, RegisterForm, INVALID_CREDENTIALS, USERNAME_TAKEN},
        services::{authenticate, register_user, RegisterError},
    },
};

pub const NO_PERMISSION: &str = "You don't have permission to do that!";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/users/:username", get(show_user))
        .route("/users/:username/delete", post(delete_user))
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    state.views.page(&session, "index.html", Context::new()).await
}

async fn render_register(
    state: &AppState,
    session: &Session,
    form: &RegisterForm,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(state
        .views
        .form(session, "register.html", ctx)
        .await?
        .into_response())
}

async fn render_login(
    state: &AppState,
    session: &Session,
    form: &LoginForm,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(state
        .views
        .form(session, "login.html", ctx)
        .await?
        .into_response())
}

pub async fn register_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    render_register(&state, &session, &RegisterForm::default(), &FieldErrors::new()).await
}

#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let validated = if csrf::verify(&session, &form.csrf_token).await? {
        form.validate()
    } else {
        Err(FieldErrors::csrf())
    };
    let registration = match validated {
        Ok(r) => r,
        Err(errors) => return render_register(&state, &session, &form, &errors).await,
    };

    let user = match register_user(state.store.as_ref(), registration).await {
        Ok(u) => u,
        Err(RegisterError::UsernameTaken) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return render_register(&state, &session, &form, &errors).await;
        }
        Err(RegisterError::Failed(e)) => return Err(e),
    };

    auth::log_in(&session, &user.username).await?;
    flash::push(&session, Level::Primary, "Welcome! Successfully created your account!").await?;
    info!(username = %user.username, "user registered");
    Ok(Redirect::to(&urls::user_profile(&user.username)).into_response())
}

pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    render_login(&state, &session, &LoginForm::default(), &FieldErrors::new()).await
}

#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let validated = if csrf::verify(&session, &form.csrf_token).await? {
        form.validate()
    } else {
        Err(FieldErrors::csrf())
    };
    let credentials = match validated {
        Ok(c) => c,
        Err(errors) => return render_login(&state, &session, &form, &errors).await,
    };

    let Some(user) = authenticate(state.store.as_ref(), &credentials).await? else {
        warn!("login rejected");
        let mut errors = FieldErrors::new();
        errors.add("password", INVALID_CREDENTIALS);
        return render_login(&state, &session, &form, &errors).await;
    };

    auth::log_in(&session, &user.username).await?;
    flash::push(
        &session,
        Level::Primary,
        format!("Welcome back, {} {}!", user.first_name, user.last_name),
    )
    .await?;
    info!("user logged in");
    Ok(Redirect::to(&urls::user_profile(&user.username)).into_response())
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    if let Some(username) = auth::log_out(&session).await? {
        info!(%username, "user logged out");
    }
    flash::push(&session, Level::Primary, "Goodbye!").await?;
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, session))]
pub async fn show_user(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(username): Path<String>,
) -> Result<Html<String>, AppError> {
    let user = state
        .store
        .find_user(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    let feedback = state.store.list_feedback(&user.username).await?;

    let mut ctx = Context::new();
    ctx.insert("is_owner", &(viewer == user.username));
    ctx.insert("user", &user);
    ctx.insert("feedback", &feedback);
    state.views.page(&session, "user.html", ctx).await
}

#[instrument(skip(state, session))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    let user = state
        .store
        .find_user(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.username != viewer {
        warn!(target_user = %user.username, "delete of another account refused");
        flash::push(&session, Level::Danger, NO_PERMISSION).await?;
        return Ok(Redirect::to(&urls::user_profile(&viewer)));
    }

    state.store.delete_user(&user.username).await?;
    auth::log_out(&session).await?;
    flash::push(&session, Level::Primary, format!("User {} deleted", user.username)).await?;
    info!("user deleted");
    Ok(Redirect::to("/"))
}
