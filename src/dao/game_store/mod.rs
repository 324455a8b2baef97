pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameDraft, GameEntity, GameFilter};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer holding the games table.
pub trait GameStore: Send + Sync {
    /// Every record matching `filter`, ordered by ascending id.
    fn find_all(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn find_by_id(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn create(&self, draft: GameDraft) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Insert every draft, assigning consecutive ids in input order.
    fn bulk_create(
        &self,
        drafts: Vec<GameDraft>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Replace every mutable field of the record; `None` when the id is unknown.
    fn update(
        &self,
        id: i64,
        draft: GameDraft,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Hard-delete a record, returning whether it existed.
    fn destroy(&self, id: i64) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove every record, returning how many were dropped. Ids are not reused afterwards.
    fn truncate(&self) -> BoxFuture<'static, StorageResult<u64>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
