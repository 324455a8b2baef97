use std::path::Path;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::SharedState;

pub mod docs;
pub mod extract;
pub mod games;
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    Router::new()
        .nest("/api", games::router())
        .merge(health::router())
        .merge(docs::router())
        .with_state(state)
}

/// Build the top-level application: routes, static assets fallback and middleware layers.
pub fn app(state: SharedState, static_dir: &Path) -> Router<()> {
    router(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
