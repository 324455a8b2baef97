//! Business logic behind the game CRUD and search routes.

use tracing::{debug, info};

use crate::{
    dao::models::{GameDraft, GameFilter},
    dto::game::{DeletedGame, GameInput, GameResponse, SearchRequest},
    error::ServiceError,
    state::SharedState,
};

/// Return every stored game in store order.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameResponse>, ServiceError> {
    search_games(state, SearchRequest::default()).await
}

/// Return games matching the optional name substring and exact platform.
pub async fn search_games(
    state: &SharedState,
    request: SearchRequest,
) -> Result<Vec<GameResponse>, ServiceError> {
    let store = state.require_game_store().await?;
    let filter = GameFilter::from_search(request.name, request.platform);
    debug!(?filter, "querying games");

    let games = store.find_all(filter).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Insert a game built from the client payload as-is.
pub async fn create_game(
    state: &SharedState,
    input: GameInput,
) -> Result<GameResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = store.create(GameDraft::from(input)).await?;
    info!(id = game.id, "game created");
    Ok(game.into())
}

/// Replace every field of an existing game. Fields missing from `input` become null.
pub async fn update_game(
    state: &SharedState,
    raw_id: &str,
    input: GameInput,
) -> Result<GameResponse, ServiceError> {
    let id = parse_game_id(raw_id)?;
    let store = state.require_game_store().await?;

    let Some(game) = store.update(id, GameDraft::from(input)).await? else {
        return Err(not_found(id));
    };

    info!(id, "game updated");
    Ok(game.into())
}

/// Permanently remove a game.
pub async fn delete_game(state: &SharedState, raw_id: &str) -> Result<DeletedGame, ServiceError> {
    let id = parse_game_id(raw_id)?;
    let store = state.require_game_store().await?;

    if !store.destroy(id).await? {
        return Err(not_found(id));
    }

    info!(id, "game deleted");
    Ok(DeletedGame { id })
}

/// Parse a path segment into a primary key. Trailing garbage such as `12abc` is rejected.
pub fn parse_game_id(raw: &str) -> Result<i64, ServiceError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::InvalidInput(format!("game id `{raw}` is not an integer")))
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}
