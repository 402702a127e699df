use std::sync::Arc;

use anyhow::{Context, Result};
use shared::config::SessionStorage;
use tracing::info;

use crate::api::BackendClient;
use crate::session::{FileCredentialStore, Session};
use crate::state::AppState;

mod api;
mod cancellation;
mod charts;
mod config;
mod forms;
mod guard;
mod paths;
mod routes;
mod session;
mod state;
mod styles;
#[cfg(test)]
mod test_support;
mod views;

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let config = shared::load_frontend_config!()?;

    let backend = BackendClient::new(&config.api_url).context("Error creating backend client")?;
    let session = match config.session_storage {
        SessionStorage::File => Session::new(Arc::new(FileCredentialStore::new(&config.data_dir))),
        SessionStorage::Memory => Session::in_memory(),
    };
    let state = Arc::new(AppState::new(backend, session, &config.public_url));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!(
        "Dashboard for {} listening on {}",
        config.api_url, config.bind_addr
    );
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
