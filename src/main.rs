mod app;
mod auth;
mod catalog;
mod config;
mod dates;
mod nutrition;
mod plans;
mod progress;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutriplan=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    if let (Ok(admin_email), Ok(admin_pass)) =
        (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASS"))
    {
        users::services::ensure_admin_account(app_state.users.as_ref(), &admin_email, &admin_pass)
            .await?;
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
