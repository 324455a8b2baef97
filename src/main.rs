//! top-games-back binary entrypoint wiring configuration, storage supervision and the REST API.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use top_games_back::{
    config::{AppConfig, StorageBackend, StorageConfig},
    dao::game_store::{GameStore, memory::InMemoryGameStore},
    routes,
    services::feed_client::FeedClient,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let feeds = FeedClient::new(&config.feeds).context("building feed client")?;
    let app_state = AppState::new(feeds);

    start_storage(&app_state, &config.storage).await?;
    // Build the HTTP router once the shared state is ready.
    let app = routes::app(app_state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, static_dir = %config.static_dir.display(), "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured storage backend. MongoDB is connected and supervised in the
/// background; until it answers the API runs in degraded mode.
async fn start_storage(state: &SharedState, config: &StorageConfig) -> anyhow::Result<()> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage; data is lost on restart");
            let store: Arc<dyn GameStore> = Arc::new(InMemoryGameStore::new());
            state.set_game_store(store).await;
            Ok(())
        }
        StorageBackend::Mongo => spawn_mongo_supervisor(state, config),
    }
}

#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: &SharedState, config: &StorageConfig) -> anyhow::Result<()> {
    use top_games_back::{
        dao::{
            game_store::mongodb::{MongoConfig, MongoGameStore},
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let uri = config.mongo_uri.clone();
    let db_name = config.mongo_db.clone();
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let mongo_config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoGameStore::connect(mongo_config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn GameStore>)
        }
    }));
    Ok(())
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(_state: &SharedState, _config: &StorageConfig) -> anyhow::Result<()> {
    anyhow::bail!("MongoDB storage requested but the `mongo-store` feature is disabled")
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
