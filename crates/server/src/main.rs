use anyhow::Context;

mod config;
mod error;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("banchi_server=info,tower_http=info")),
        )
        .init();

    let config = config::Config::from_env();

    // ── Database ──────────────────────────────────────────────────────────────
    let pool = banchi_storage::create_db(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    banchi_storage::seed_default_categories(&pool)
        .await
        .context("Failed to seed default categories")?;

    if config.ai_enabled {
        tracing::info!("AI classification pass-through enabled");
    }

    // ── HTTP server ───────────────────────────────────────────────────────────
    let state = state::AppState::new(pool, &config);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
