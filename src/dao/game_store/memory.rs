//! Volatile [`GameStore`] backed by an ordered map, used by tests and the `memory` backend.

use std::{collections::BTreeMap, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    game_store::GameStore,
    models::{GameDraft, GameEntity, GameFilter},
    storage::StorageResult,
};

#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    inner: Arc<RwLock<MemoryTable>>,
}

#[derive(Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, GameEntity>,
}

impl MemoryTable {
    fn insert(&mut self, draft: GameDraft, now: SystemTime) -> GameEntity {
        self.last_id += 1;
        let game = GameEntity::from_draft(self.last_id, draft, now);
        self.rows.insert(game.id, game.clone());
        game
    }
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    fn find_all(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let table = inner.read().await;
            Ok(table
                .rows
                .values()
                .filter(|game| filter.matches(game))
                .cloned()
                .collect())
        })
    }

    fn find_by_id(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.rows.get(&id).cloned()) })
    }

    fn create(&self, draft: GameDraft) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut table = inner.write().await;
            Ok(table.insert(draft, SystemTime::now()))
        })
    }

    fn bulk_create(
        &self,
        drafts: Vec<GameDraft>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let now = SystemTime::now();
            let mut table = inner.write().await;
            Ok(drafts
                .into_iter()
                .map(|draft| table.insert(draft, now))
                .collect())
        })
    }

    fn update(
        &self,
        id: i64,
        draft: GameDraft,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut table = inner.write().await;
            Ok(table.rows.get_mut(&id).map(|game| {
                game.apply(draft, SystemTime::now());
                game.clone()
            }))
        })
    }

    fn destroy(&self, id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.write().await.rows.remove(&id).is_some()) })
    }

    fn truncate(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut table = inner.write().await;
            let removed = table.rows.len() as u64;
            table.rows.clear();
            Ok(removed)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
