//! Shared harness: an isolated app over the in-memory store and a local fake feed server.

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use futures::future::BoxFuture;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::get,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Notify};
use top_games_back::{
    config::FeedConfig,
    dao::{
        game_store::{GameStore, memory::InMemoryGameStore},
        models::{GameDraft, GameEntity, GameFilter},
        storage::StorageResult,
    },
    routes,
    services::feed_client::FeedClient,
    state::{AppState, SharedState},
};
use tower::ServiceExt;

/// Application under test plus direct access to its shared state.
pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
}

impl TestApp {
    /// App with an empty in-memory store and feeds pointing at `feeds`.
    pub fn new(feeds: FeedConfig) -> Self {
        let client = FeedClient::new(&feeds).expect("feed client");
        let state = AppState::with_store(client, Arc::new(InMemoryGameStore::new()));
        Self::from_state(state)
    }

    /// App whose feeds point at an unroutable address; for tests that never populate.
    pub fn offline() -> Self {
        Self::new(FeedConfig {
            android_url: "http://127.0.0.1:9/android.json".into(),
            ios_url: "http://127.0.0.1:9/ios.json".into(),
            timeout: Duration::from_secs(2),
        })
    }

    /// App over `store`, with feeds pointing at `feeds`.
    pub fn with_store(feeds: FeedConfig, store: Arc<dyn GameStore>) -> Self {
        let client = FeedClient::new(&feeds).expect("feed client");
        Self::from_state(AppState::with_store(client, store))
    }

    pub fn from_state(state: SharedState) -> Self {
        let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
        Self {
            router: routes::app(state.clone(), &static_dir),
            state,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.request(request).await
    }

    /// Dispatch a prebuilt request, for tests that need custom headers or bodies.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            json,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Poll the status route until the latest populate job leaves its running phases.
    pub async fn wait_for_populate(&self) -> Value {
        for _ in 0..200 {
            let status = self.get("/api/games/populate/status").await.json;
            match status["state"].as_str() {
                Some("fetching") | Some("persisting") => {
                    tokio::time::sleep(Duration::from_millis(10)).await
                }
                _ => return status,
            }
        }
        panic!("populate job did not finish in time");
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
    pub text: String,
}

/// Serve `android` and `ios` documents from a local listener, plus a failing route.
pub async fn spawn_feed_server(android: Value, ios: Value) -> FeedServer {
    let router = Router::new()
        .route("/android.json", get(move || async move { Json(android) }))
        .route("/ios.json", get(move || async move { Json(ios) }))
        .route(
            "/broken.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/not-an-array.json", get(|| async { Json(serde_json::json!({"games": []})) }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind feed server");
    let addr = listener.local_addr().expect("feed server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("feed server");
    });

    FeedServer {
        base_url: format!("http://{addr}"),
    }
}

pub struct FeedServer {
    pub base_url: String,
}

impl FeedServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn config(&self) -> FeedConfig {
        FeedConfig {
            android_url: self.url("android.json"),
            ios_url: self.url("ios.json"),
            timeout: Duration::from_secs(5),
        }
    }
}

/// In-memory store whose bulk inserts wait until [`GatedStore::open`] is called.
#[derive(Clone, Default)]
pub struct GatedStore {
    table: InMemoryGameStore,
    gate: Arc<Notify>,
}

impl GatedStore {
    /// Let one pending (or the next) bulk insert proceed.
    pub fn open(&self) {
        self.gate.notify_one();
    }
}

impl GameStore for GatedStore {
    fn find_all(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        self.table.find_all(filter)
    }

    fn find_by_id(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        self.table.find_by_id(id)
    }

    fn create(&self, draft: GameDraft) -> BoxFuture<'static, StorageResult<GameEntity>> {
        self.table.create(draft)
    }

    fn bulk_create(
        &self,
        drafts: Vec<GameDraft>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let table = self.table.clone();
        let gate = self.gate.clone();
        Box::pin(async move {
            gate.notified().await;
            table.bulk_create(drafts).await
        })
    }

    fn update(
        &self,
        id: i64,
        draft: GameDraft,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        self.table.update(id, draft)
    }

    fn destroy(&self, id: i64) -> BoxFuture<'static, StorageResult<bool>> {
        self.table.destroy(id)
    }

    fn truncate(&self) -> BoxFuture<'static, StorageResult<u64>> {
        self.table.truncate()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.table.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.table.try_reconnect()
    }
}
