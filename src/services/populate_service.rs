//! Replace the games table with the merged contents of both remote feeds.
//!
//! The caller gets the mapped records as soon as both feeds are decoded; truncating the
//! table and inserting the records happens afterwards in a background task. Only one
//! populate job may run at a time, from the first fetch until the last insert.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::GameDraft},
    dto::populate::PopulateStatusResponse,
    error::ServiceError,
    services::shape_mapper::{flatten_feed, map_feed_games},
    state::{
        SharedState,
        populate::{PopulatePermit, PopulatePhase},
    },
};

/// Result of the synchronous half of a populate job.
pub struct PopulateOutcome {
    /// Id echoed in the `x-populate-job` header.
    pub job_id: Uuid,
    /// Mapped records, android feed first, in feed order.
    pub games: Vec<GameDraft>,
    /// Background persistence; resolves once the table holds `games`.
    pub persistence: JoinHandle<()>,
}

/// Fetch both feeds, map them, and schedule the table replacement.
pub async fn populate(state: &SharedState) -> Result<PopulateOutcome, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(permit) = state.populate().try_begin().await else {
        return Err(ServiceError::Busy("a populate job is already running".into()));
    };
    let job_id = permit.id();
    info!(%job_id, "populate started");

    let games = match fetch_and_map(state).await {
        Ok(games) => games,
        Err(err) => {
            warn!(%job_id, error = %err, "populate aborted before persistence");
            state
                .populate()
                .finish(
                    permit,
                    PopulatePhase::Failed {
                        fetched: None,
                        error: err.to_string(),
                    },
                )
                .await;
            return Err(err);
        }
    };

    state
        .populate()
        .advance(
            &permit,
            PopulatePhase::Persisting {
                fetched: games.len(),
            },
        )
        .await;

    let persistence = tokio::spawn(persist(state.clone(), store, games.clone(), permit));

    Ok(PopulateOutcome {
        job_id,
        games,
        persistence,
    })
}

/// Report the progress of the latest populate job.
pub async fn populate_status(state: &SharedState) -> PopulateStatusResponse {
    state.populate().last_job().await.into()
}

async fn fetch_and_map(state: &SharedState) -> Result<Vec<GameDraft>, ServiceError> {
    let batch = state.feeds().fetch_all().await?;

    let mut records = flatten_feed(batch.android);
    records.extend(flatten_feed(batch.ios));
    Ok(map_feed_games(records))
}

/// Truncate then bulk insert. The two steps are not atomic: readers may briefly see an
/// empty table.
async fn persist(
    state: SharedState,
    store: Arc<dyn GameStore>,
    games: Vec<GameDraft>,
    permit: PopulatePermit,
) {
    let job_id = permit.id();
    let fetched = games.len();

    let outcome = async {
        let removed = store.truncate().await?;
        info!(%job_id, removed, "games table truncated");
        store.bulk_create(games).await
    }
    .await;

    let phase = match outcome {
        Ok(inserted) => {
            info!(%job_id, inserted = inserted.len(), "populate completed");
            PopulatePhase::Completed {
                fetched,
                inserted: inserted.len(),
            }
        }
        Err(err) => {
            error!(%job_id, error = %err, "populate persistence failed");
            PopulatePhase::Failed {
                fetched: Some(fetched),
                error: err.to_string(),
            }
        }
    };

    state.populate().finish(permit, phase).await;
}
