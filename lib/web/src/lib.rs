//! HTTP façade for the URDF runtime, mounted under `/urdf`.

use axum::routing::{get, post};
use axum::Router;
use urdf_runtime::RuntimeHandle;

mod error;
mod handlers;

pub use error::UrdfServerError;

/// Configuration for a standalone façade server.
pub struct ServerConfig {
    /// The runtime the façade talks to.
    pub handle: RuntimeHandle,
    /// The IP address or DNS name that the socket binds to.
    pub bind: String,
    /// Whether CORS is enabled.
    pub cors: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub handle: RuntimeHandle,
}

/// The `/urdf` route table.
fn create_urdf_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/size", get(handlers::size))
        .route("/graph", get(handlers::graph))
        .route("/export", get(handlers::export))
        .route("/node", get(handlers::node))
        .route("/zurl", get(handlers::zurl))
        .route("/clear", post(handlers::clear))
        .route("/load", post(handlers::load))
        .route("/loadFile", post(handlers::load_file))
        .route("/query", post(handlers::query))
        .route("/rules/create", post(handlers::rules_create))
        .route("/rules/update", post(handlers::rules_update))
        .route("/rules/delete", post(handlers::rules_delete))
}

/// Builds the full application router around a runtime handle.
pub fn router(handle: RuntimeHandle) -> Router {
    Router::new()
        .nest("/urdf", create_urdf_routes())
        .with_state(AppState { handle })
}

/// Serves the façade until the process ends.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let app = router(config.handle);
    let app = if config.cors {
        app.layer(tower_http::cors::CorsLayer::permissive())
    } else {
        app
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(bind = %config.bind, "urdf façade listening");
    Ok(axum::serve(listener, app).await?)
}
