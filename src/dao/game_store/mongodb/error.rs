//! Error types shared by the MongoDB storage implementation.

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to allocate {count} id(s) from counter `{counter}`")]
    AllocateIds {
        counter: &'static str,
        count: i64,
        #[source]
        source: MongoError,
    },
    #[error("counter `{counter}` returned no document after upsert")]
    MissingCounter { counter: &'static str },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: i64,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert {count} game(s)")]
    InsertGames {
        count: usize,
        #[source]
        source: MongoError,
    },
    #[error("failed to update game `{id}`")]
    UpdateGame {
        id: i64,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: i64,
        #[source]
        source: MongoError,
    },
    #[error("failed to truncate games")]
    TruncateGames {
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    /// Whether the failure means the database cannot be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            MongoDaoError::InvalidUri { .. }
            | MongoDaoError::ClientConstruction { .. }
            | MongoDaoError::InitialPing { .. }
            | MongoDaoError::HealthPing { .. } => true,
            MongoDaoError::EnsureIndex { source, .. }
            | MongoDaoError::AllocateIds { source, .. }
            | MongoDaoError::ListGames { source }
            | MongoDaoError::LoadGame { source, .. }
            | MongoDaoError::InsertGames { source, .. }
            | MongoDaoError::UpdateGame { source, .. }
            | MongoDaoError::DeleteGame { source, .. }
            | MongoDaoError::TruncateGames { source } => is_network_error(source),
            MongoDaoError::MissingCounter { .. } => false,
        }
    }
}

fn is_network_error(err: &MongoError) -> bool {
    use mongodb::error::ErrorKind;

    matches!(
        *err.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    )
}
