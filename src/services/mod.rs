/// OpenAPI documentation generation.
pub mod documentation;
/// HTTP client for the remote top-100 feeds.
pub mod feed_client;
/// CRUD and search over stored games.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Fetch, reshape and persist both feeds.
pub mod populate_service;
/// Pure mapping from feed records to game drafts.
pub mod shape_mapper;
/// Storage connection supervisor driving degraded mode.
pub mod storage_supervisor;
