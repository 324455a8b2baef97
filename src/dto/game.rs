use serde::{Deserialize, Serialize};
use serde_with::{BoolFromInt, PickFirst, formats::Flexible, serde_as};
use utoipa::ToSchema;

use crate::{
    dao::models::{GameDraft, GameEntity},
    dto::{coercion::lenient_string, format_system_time},
};

/// Field set accepted by the create and update routes.
///
/// Every field is optional; omitted values are stored as `null`. Identifiers sent as
/// numbers are kept as strings and `isPublished` accepts booleans or integers.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub publisher_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub store_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bundle_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub app_version: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, BoolFromInt<Flexible>)>>")]
    pub is_published: Option<bool>,
}

impl From<GameInput> for GameDraft {
    fn from(value: GameInput) -> Self {
        Self {
            publisher_id: value.publisher_id,
            name: value.name,
            platform: value.platform,
            store_id: value.store_id,
            bundle_id: value.bundle_id,
            app_version: value.app_version,
            is_published: value.is_published,
        }
    }
}

/// Optional search clauses; an absent or empty value disables the clause.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SearchRequest {
    /// Substring the game name must contain.
    pub name: Option<String>,
    /// Exact platform value (e.g. "ios").
    pub platform: Option<String>,
}

/// Stored game as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: i64,
    pub publisher_id: Option<String>,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub store_id: Option<String>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: Option<bool>,
    /// RFC 3339 insertion timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last update.
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            publisher_id: value.publisher_id,
            name: value.name,
            platform: value.platform,
            store_id: value.store_id,
            bundle_id: value.bundle_id,
            app_version: value.app_version,
            is_published: value.is_published,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Mapped feed record returned by populate before it is persisted (no id yet).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameDraftResponse {
    pub publisher_id: Option<String>,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub store_id: Option<String>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: Option<bool>,
}

impl From<GameDraft> for GameDraftResponse {
    fn from(value: GameDraft) -> Self {
        Self {
            publisher_id: value.publisher_id,
            name: value.name,
            platform: value.platform,
            store_id: value.store_id,
            bundle_id: value.bundle_id,
            app_version: value.app_version,
            is_published: value.is_published,
        }
    }
}

/// Acknowledgement returned once a game is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeletedGame {
    pub id: i64,
}
