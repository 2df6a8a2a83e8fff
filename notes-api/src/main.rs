mod config;

mod app;
mod errors;
mod notes;
mod openapi;
mod shared;
mod state;
mod store;

use std::{net::SocketAddr, sync::Arc};

use aide::axum::ApiRouter;
use app::AppParams;
pub use config::config;
pub use errors::{Error, Result};
use notes::NoteService;
use store::InMemoryNoteStore;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config::init_config()?;

    shared::tracing::setup_tracing(config.log_json);

    let notes = NoteService::new(Arc::new(InMemoryNoteStore::new()));
    if config.seed_demo_notes {
        notes::seed_demo_notes(&notes);
    }

    let (app, _api) = app::create(AppParams {
        notes,
        cors_origin: config.cors_origin.clone(),
        router: |state| ApiRouter::new().merge(notes::router(state)),
    })
    .await?;

    let app = shared::tracing::add_tracing_layer(app);

    let listener = TcpListener::bind(config.addr()).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {error}");
    }
    tracing::info!("shutting down, in-memory notes are discarded");
}
