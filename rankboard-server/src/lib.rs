//! HTTP surface for the rankboard kanban engine
//!
//! [`routes::router`] exposes the kanban commands as a JSON API under `/api/v1`;
//! [`serve`] binds it using a [`ServerConfig`].

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ConfigError, ErrorBody};
pub use routes::{router, AppState};

use rankboard_kanban::KanbanContext;
use tokio::net::TcpListener;
use tracing::info;

/// Open the ledger named by `config` and build a context with its settings
pub fn open_context(config: &ServerConfig) -> rankboard_kanban::Result<KanbanContext> {
    Ok(KanbanContext::open(&config.database)?.with_settings(config.kanban_settings()))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let ctx = open_context(config)?;
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        database = %config.database.display(),
        "rankboard listening"
    );
    axum::serve(listener, router(AppState::new(ctx))).await?;
    Ok(())
}
