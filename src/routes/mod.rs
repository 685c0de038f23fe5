//! Endpoints of the relay: login and token exchange, playlist proxies and
//! health. Any other path is served from the static asset directory.

mod auth_routes;
mod health_routes;
mod playlist_routes;

pub use auth_routes::{AppCallbackResponse, AppLoginResponse, RefreshResponse};

use crate::config::CorsConfig;
use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Builds the cross-origin policy: configured origins, with credentials.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Assembles every route group behind the CORS and tracing layers.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(auth_routes::routes())
        .merge(playlist_routes::routes())
        .merge(health_routes::routes())
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
