mod config;
mod db;
mod pdf;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::http::HttpPdfSource;
use crate::store::postgres::PgTemplateStore;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    let pdf_source = HttpPdfSource::new(config.pdf_fetch_timeout, config.pdf_connect_timeout)?;
    let state = state::AppState::new(Arc::new(PgTemplateStore::new(pool)), Arc::new(pdf_source));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!(bind_addr = %config.bind_addr, "template server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
