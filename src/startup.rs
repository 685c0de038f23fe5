//! Server bootstrap: shared state, router and listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::routes::create_router;
use crate::state::AppState;

/// Serves the relay on `bind_address` until the process is stopped.
///
/// Fails if the upstream client cannot be built or the listener cannot bind.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config.clone())?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!(
        "Listening on {} (static assets from '{}')",
        listener.local_addr()?,
        config.static_dir
    );

    axum::serve(listener, app).await?;

    Ok(())
}
