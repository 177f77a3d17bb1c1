//! HTTP service for Habitual.
//!
//! Exposes goal creation, today's tasks, completion toggles and progress
//! reporting as a JSON API under `/api`.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use api::router;
pub use config::{Cli, ConfigError, ServerConfig, StorageBackend};
pub use error::ApiError;
pub use state::AppState;

use tokio::net::TcpListener;
use tracing::info;

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = router(state);

    let listener = TcpListener::bind(&config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        utc_offset = %config.utc_offset,
        "Habitual server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
