mod catalog;
mod config;
mod frame;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => {
            let catalog = catalog::Catalog::from_json_file(path).expect("catalog load failed");
            tracing::info!(path = %path.display(), projects = catalog.projects.len(), "catalog loaded");
            catalog
        }
        None => catalog::Catalog::demo(),
    };

    tracing::info!(
        reply_delay = ?config.timing.reply_delay,
        complete_delay = ?config.timing.complete_delay,
        "reply timing configured"
    );

    let state = state::AppState::new(catalog, config.timing);
    if config.session_idle_ttl.is_zero() {
        tracing::info!("idle session eviction disabled");
    } else {
        services::session::spawn_idle_sweeper(state.clone(), config.session_idle_ttl);
    }
    let app = routes::app(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "builderdesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
