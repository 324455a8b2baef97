use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the installed store and report whether the backend is fully operational.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.game_store().await else {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded(false);
    };

    match store.health_check().await {
        Ok(()) if !state.is_degraded() => HealthResponse::ok(),
        Ok(()) => HealthResponse::degraded(true),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(false)
        }
    }
}
