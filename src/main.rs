mod app;
mod auth;
mod config;
mod error;
mod feedback;
mod flash;
mod forms;
mod state;
mod store;
mod urls;
mod users;
mod views;

#[cfg(test)]
mod test_support;

use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "feedback_board=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (app_state, sessions) = state::AppState::init().await?;
    let (host, port) = (app_state.config.host.clone(), app_state.config.port);

    let cleanup = Duration::from_secs(app_state.config.session.cleanup_minutes * 60);
    tokio::spawn(sessions.clone().delete_expired_every(cleanup));

    app::serve(app::build_app(app_state, sessions), &host, port).await
}
