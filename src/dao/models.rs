use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Game record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key assigned by the store on insertion.
    pub id: i64,
    /// Identifier of the publisher on the originating app store.
    pub publisher_id: Option<String>,
    /// Display name of the game.
    pub name: Option<String>,
    /// Target platform (e.g. "android", "ios").
    pub platform: Option<String>,
    /// Identifier of the game on its app store.
    pub store_id: Option<String>,
    /// Package or bundle identifier.
    pub bundle_id: Option<String>,
    /// Free-form version string.
    pub app_version: Option<String>,
    /// Whether the game is listed as published.
    pub is_published: Option<bool>,
    /// Insertion timestamp.
    pub created_at: SystemTime,
    /// Last time any field of the record changed.
    pub updated_at: SystemTime,
}

/// Every mutable field of a game, used for inserts and full updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameDraft {
    pub publisher_id: Option<String>,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub store_id: Option<String>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: Option<bool>,
}

impl GameEntity {
    /// Materialize a draft into a record with the given key, stamping both timestamps.
    pub fn from_draft(id: i64, draft: GameDraft, now: SystemTime) -> Self {
        Self {
            id,
            publisher_id: draft.publisher_id,
            name: draft.name,
            platform: draft.platform,
            store_id: draft.store_id,
            bundle_id: draft.bundle_id,
            app_version: draft.app_version,
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every mutable field with the draft contents.
    pub fn apply(&mut self, draft: GameDraft, now: SystemTime) {
        self.publisher_id = draft.publisher_id;
        self.name = draft.name;
        self.platform = draft.platform;
        self.store_id = draft.store_id;
        self.bundle_id = draft.bundle_id;
        self.app_version = draft.app_version;
        self.is_published = draft.is_published;
        self.updated_at = now;
    }
}

/// Optional clauses applied by [`crate::dao::game_store::GameStore::find_all`].
///
/// Clauses that are `None` are ignored; present clauses are intersected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Substring the game name must contain.
    pub name_contains: Option<String>,
    /// Exact platform value.
    pub platform: Option<String>,
}

impl GameFilter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from optional user input, dropping empty values.
    pub fn from_search(name: Option<String>, platform: Option<String>) -> Self {
        Self {
            name_contains: name.filter(|value| !value.is_empty()),
            platform: platform.filter(|value| !value.is_empty()),
        }
    }

    /// Evaluate the filter against a record.
    pub fn matches(&self, game: &GameEntity) -> bool {
        let name_ok = match &self.name_contains {
            Some(needle) => game
                .name
                .as_deref()
                .is_some_and(|name| name.contains(needle.as_str())),
            None => true,
        };
        let platform_ok = match &self.platform {
            Some(platform) => game.platform.as_deref() == Some(platform.as_str()),
            None => true,
        };
        name_ok && platform_ok
    }
}
