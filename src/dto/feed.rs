use serde::Deserialize;

use crate::dto::coercion::scalar_or_none;

/// Record shape published by the top-100 feeds.
///
/// Nothing is required or type-checked: absent keys and nested values stay `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawFeedGame {
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub publisher_id: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub os: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub bundle_id: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_none")]
    pub version: Option<String>,
}
