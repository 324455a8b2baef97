//! Reshapes raw feed records into game drafts.

use serde_json::Value;
use tracing::debug;

use crate::{dao::models::GameDraft, dto::feed::RawFeedGame};

/// Splice nested arrays one level deep; the feeds sometimes wrap their records in an extra array.
pub fn flatten_feed(items: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    flat
}

/// Rename feed fields to the game shape. Populated games are always published.
pub fn map_feed_game(raw: RawFeedGame) -> GameDraft {
    GameDraft {
        publisher_id: raw.publisher_id,
        name: raw.name,
        platform: raw.os,
        store_id: raw.id,
        bundle_id: raw.bundle_id,
        app_version: raw.version,
        is_published: Some(true),
    }
}

/// Decode a flattened record without validation; anything but an object maps to all-null fields.
pub fn decode_feed_game(item: Value) -> RawFeedGame {
    match item {
        Value::Object(_) => serde_json::from_value(item).unwrap_or_default(),
        other => {
            debug!(record = %other, "feed record is not an object; mapping it to an empty game");
            RawFeedGame::default()
        }
    }
}

/// Decode and map every flattened record, preserving order.
pub fn map_feed_games(items: Vec<Value>) -> Vec<GameDraft> {
    items
        .into_iter()
        .map(|item| map_feed_game(decode_feed_game(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_exactly_one_level() {
        let items = vec![
            json!([{"name": "a"}, {"name": "b"}]),
            json!({"name": "c"}),
            json!([[{"name": "deep"}]]),
        ];
        let flat = flatten_feed(items);

        assert_eq!(
            flat,
            vec![
                json!({"name": "a"}),
                json!({"name": "b"}),
                json!({"name": "c"}),
                json!([{"name": "deep"}]),
            ]
        );
    }

    #[test]
    fn renames_fields_and_forces_published() {
        let drafts = map_feed_games(vec![json!({
            "publisher_id": 284882218,
            "name": "Candy Crush Saga",
            "os": "ios",
            "id": 553834731,
            "bundle_id": "com.midasplayer.apps.candycrushsaga",
            "version": "1.242.1",
            "is_published": false,
            "rating": 4.7
        })]);

        assert_eq!(
            drafts,
            vec![GameDraft {
                publisher_id: Some("284882218".into()),
                name: Some("Candy Crush Saga".into()),
                platform: Some("ios".into()),
                store_id: Some("553834731".into()),
                bundle_id: Some("com.midasplayer.apps.candycrushsaga".into()),
                app_version: Some("1.242.1".into()),
                is_published: Some(true),
            }]
        );
    }

    #[test]
    fn missing_fields_stay_empty() {
        let drafts = map_feed_games(vec![json!({"name": "Nameless Corp"})]);
        assert_eq!(drafts[0].platform, None);
        assert_eq!(drafts[0].store_id, None);
        assert_eq!(drafts[0].is_published, Some(true));
    }

    #[test]
    fn odd_records_map_to_empty_published_games() {
        let drafts = map_feed_games(vec![
            json!({"name": "Good"}),
            json!({"name": "Odd", "version": {"major": 1}, "id": [1]}),
            json!([{"name": "too deep"}]),
            json!(42),
        ]);

        assert_eq!(drafts.len(), 4);
        assert_eq!(drafts[1].name.as_deref(), Some("Odd"));
        assert_eq!(drafts[1].app_version, None);
        assert_eq!(drafts[1].store_id, None);
        let empty = GameDraft {
            is_published: Some(true),
            ..GameDraft::default()
        };
        assert_eq!(drafts[2], empty);
        assert_eq!(drafts[3], empty);
    }
}
