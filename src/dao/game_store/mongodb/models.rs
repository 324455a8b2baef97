use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{GameDraft, GameEntity};

/// Name of the counter document that hands out game ids.
pub const GAME_COUNTER: &str = "games";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: i64,
    publisher_id: Option<String>,
    name: Option<String>,
    platform: Option<String>,
    store_id: Option<String>,
    bundle_id: Option<String>,
    app_version: Option<String>,
    is_published: Option<bool>,
    created_at: DateTime,
    updated_at: DateTime,
}

/// Monotonic sequence stored in the `counters` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCounterDocument {
    #[serde(rename = "_id")]
    pub name: String,
    pub seq: i64,
}

impl From<GameEntity> for MongoGameDocument {
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
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            publisher_id: value.publisher_id,
            name: value.name,
            platform: value.platform,
            store_id: value.store_id,
            bundle_id: value.bundle_id,
            app_version: value.app_version,
            is_published: value.is_published,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

pub fn doc_id(id: i64) -> Document {
    doc! {"_id": id}
}

/// `$set` update overwriting every mutable field; absent values are stored as null.
pub fn replace_fields(draft: GameDraft, updated_at: DateTime) -> Document {
    doc! {
        "$set": {
            "publisher_id": draft.publisher_id,
            "name": draft.name,
            "platform": draft.platform,
            "store_id": draft.store_id,
            "bundle_id": draft.bundle_id,
            "app_version": draft.app_version,
            "is_published": draft.is_published,
            "updated_at": updated_at,
        }
    }
}

/// Literal substring match on `name` combined with an exact `platform` match.
pub fn filter_document(name_contains: Option<&str>, platform: Option<&str>) -> Document {
    let mut filter = Document::new();
    if let Some(needle) = name_contains {
        filter.insert("name", doc! { "$regex": regex::escape(needle) });
    }
    if let Some(platform) = platform {
        filter.insert("platform", platform);
    }
    filter
}
