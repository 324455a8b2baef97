use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the games backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::search_games,
        crate::routes::games::populate_games,
        crate::routes::games::populate_status,
        crate::routes::games::create_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::GameInput,
            crate::dto::game::GameResponse,
            crate::dto::game::GameDraftResponse,
            crate::dto::game::SearchRequest,
            crate::dto::game::DeletedGame,
            crate::dto::populate::PopulateStatusResponse,
            crate::dto::populate::PopulateStateDto,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game catalog management"),
    )
)]
pub struct ApiDoc;
