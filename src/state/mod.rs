pub mod populate;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::RwLock;

use crate::{dao::game_store::GameStore, error::ServiceError, services::feed_client::FeedClient};

use self::populate::PopulateTracker;

pub type SharedState = Arc<AppState>;

/// Application context built once at startup and handed to every route handler.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    degraded: AtomicBool,
    feeds: FeedClient,
    populate: PopulateTracker,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(feeds: FeedClient) -> SharedState {
        Arc::new(Self {
            game_store: RwLock::new(None),
            degraded: AtomicBool::new(true),
            feeds,
            populate: PopulateTracker::new(),
        })
    }

    /// Construct a state with a store already installed.
    pub fn with_store(feeds: FeedClient, store: Arc<dyn GameStore>) -> SharedState {
        Arc::new(Self {
            game_store: RwLock::new(Some(store)),
            degraded: AtomicBool::new(false),
            feeds,
            populate: PopulateTracker::new(),
        })
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current game store, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Flip the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.swap(value, Ordering::AcqRel) != value
    }

    /// HTTP client used to download the populate feeds.
    pub fn feeds(&self) -> &FeedClient {
        &self.feeds
    }

    /// Single-flight guard and progress of the populate job.
    pub fn populate(&self) -> &PopulateTracker {
        &self.populate
    }
}
