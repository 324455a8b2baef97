use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::{
    dto::{
        game::{DeletedGame, GameDraftResponse, GameInput, GameResponse, SearchRequest},
        populate::PopulateStatusResponse,
    },
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::{game_service, populate_service},
    state::SharedState,
};

/// Response header carrying the id of the populate job started by the request.
pub const POPULATE_JOB_HEADER: &str = "x-populate-job";

/// Game catalog routes, mounted under `/api`.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/search", post(search_games))
        .route("/games/populate", post(populate_games))
        .route("/games/populate/status", get(populate_status))
        .route("/games/{id}", put(update_game).delete(delete_game))
}

/// List every stored game.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses(
        (status = 200, description = "All stored games", body = [GameResponse]),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Filter games by name substring and exact platform.
#[utoipa::path(
    post,
    path = "/api/games/search",
    tag = "games",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching games", body = [GameResponse]),
        (status = 400, description = "Malformed search body", body = ErrorBody),
        (status = 500, description = "Storage query failed", body = ErrorBody)
    )
)]
pub async fn search_games(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<SearchRequest>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(game_service::search_games(&state, payload).await?))
}

/// Replace the table with both top-100 feeds; answers before the records are stored.
#[utoipa::path(
    post,
    path = "/api/games/populate",
    tag = "games",
    responses(
        (status = 200, description = "Mapped feed records, persistence continues in background", body = [GameDraftResponse],
            headers(("x-populate-job" = String, description = "Job id reported by the status route"))),
        (status = 409, description = "A populate job is already running", body = ErrorBody),
        (status = 502, description = "A feed could not be fetched or decoded", body = ErrorBody)
    )
)]
pub async fn populate_games(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = populate_service::populate(&state).await?;
    let games: Vec<GameDraftResponse> = outcome.games.into_iter().map(Into::into).collect();
    Ok((
        [(POPULATE_JOB_HEADER, outcome.job_id.to_string())],
        Json(games),
    ))
}

/// Progress of the latest populate job.
#[utoipa::path(
    get,
    path = "/api/games/populate/status",
    tag = "games",
    responses((status = 200, description = "Populate job status", body = PopulateStatusResponse))
)]
pub async fn populate_status(State(state): State<SharedState>) -> Json<PopulateStatusResponse> {
    Json(populate_service::populate_status(&state).await)
}

/// Insert a game.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body = GameInput,
    responses(
        (status = 200, description = "Game created", body = GameResponse),
        (status = 400, description = "Malformed game body", body = ErrorBody),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<GameInput>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::create_game(&state, payload).await?))
}

/// Replace every field of a game.
#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Identifier of the game to update")),
    request_body = GameInput,
    responses(
        (status = 200, description = "Game updated", body = GameResponse),
        (status = 400, description = "Id is not an integer or body is malformed", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<GameInput>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::update_game(&state, &id, payload).await?))
}

/// Permanently delete a game.
#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Identifier of the game to delete")),
    responses(
        (status = 200, description = "Game deleted", body = DeletedGame),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedGame>, AppError> {
    Ok(Json(game_service::delete_game(&state, &id).await?))
}
