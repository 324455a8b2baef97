use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        GAME_COUNTER, MongoCounterDocument, MongoGameDocument, doc_id, filter_document,
        replace_fields,
    },
};
use crate::dao::{
    game_store::GameStore,
    models::{GameDraft, GameEntity, GameFilter},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const COUNTER_COLLECTION_NAME: &str = "counters";

/// MongoDB-backed [`GameStore`] implementation.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let stale = {
            let mut guard = self.state.write().await;
            guard.database = database;
            std::mem::replace(&mut guard.client, client)
        };
        stale.shutdown().await;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_name_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn counter_collection(&self) -> Collection<MongoCounterDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoCounterDocument>(COUNTER_COLLECTION_NAME)
    }

    /// Reserve `count` consecutive ids, returning the first one.
    async fn allocate_ids(&self, count: i64) -> MongoResult<i64> {
        let counters = self.counter_collection().await;
        let counter = counters
            .find_one_and_update(doc! {"_id": GAME_COUNTER}, doc! {"$inc": {"seq": count}})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::AllocateIds {
                counter: GAME_COUNTER,
                count,
                source,
            })?
            .ok_or(MongoDaoError::MissingCounter {
                counter: GAME_COUNTER,
            })?;

        Ok(counter.seq - count + 1)
    }

    async fn find_all(&self, filter: GameFilter) -> MongoResult<Vec<GameEntity>> {
        let collection = self.collection().await;
        let query = filter_document(filter.name_contains.as_deref(), filter.platform.as_deref());

        let docs: Vec<MongoGameDocument> = collection
            .find(query)
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn create(&self, draft: GameDraft) -> MongoResult<GameEntity> {
        let id = self.allocate_ids(1).await?;
        let game = GameEntity::from_draft(id, draft, SystemTime::now());
        self.collection()
            .await
            .insert_one(MongoGameDocument::from(game.clone()))
            .await
            .map_err(|source| MongoDaoError::InsertGames { count: 1, source })?;

        Ok(game)
    }

    async fn bulk_create(&self, drafts: Vec<GameDraft>) -> MongoResult<Vec<GameEntity>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let count = drafts.len();
        let first_id = self.allocate_ids(count as i64).await?;
        let now = SystemTime::now();
        let games: Vec<GameEntity> = drafts
            .into_iter()
            .zip(first_id..)
            .map(|(draft, id)| GameEntity::from_draft(id, draft, now))
            .collect();

        let documents: Vec<MongoGameDocument> = games.iter().cloned().map(Into::into).collect();
        self.collection()
            .await
            .insert_many(documents)
            .await
            .map_err(|source| MongoDaoError::InsertGames { count, source })?;

        Ok(games)
    }

    async fn update(&self, id: i64, draft: GameDraft) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;
        let updated = collection
            .find_one_and_update(doc_id(id), replace_fields(draft, DateTime::now()))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame { id, source })?;

        Ok(updated.map(Into::into))
    }

    async fn destroy(&self, id: i64) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn truncate(&self) -> MongoResult<u64> {
        let collection = self.collection().await;
        let result = collection
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::TruncateGames { source })?;
        Ok(result.deleted_count)
    }
}

impl GameStore for MongoGameStore {
    fn find_all(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_all(filter).await.map_err(Into::into) })
    }

    fn find_by_id(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_by_id(id).await.map_err(Into::into) })
    }

    fn create(&self, draft: GameDraft) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create(draft).await.map_err(Into::into) })
    }

    fn bulk_create(
        &self,
        drafts: Vec<GameDraft>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.bulk_create(drafts).await.map_err(Into::into) })
    }

    fn update(
        &self,
        id: i64,
        draft: GameDraft,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update(id, draft).await.map_err(Into::into) })
    }

    fn destroy(&self, id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.destroy(id).await.map_err(Into::into) })
    }

    fn truncate(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.truncate().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
