//! Populate flow against a local fake feed server.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{GatedStore, TestApp, spawn_feed_server};
use serde_json::{Value, json};
use top_games_back::{config::FeedConfig, routes::games::POPULATE_JOB_HEADER};

fn android_feed() -> Value {
    json!([
        [
            {
                "publisher_id": "pub-a",
                "name": "Subway Surfers",
                "os": "android",
                "id": "com.kiloo.subwaysurf",
                "bundle_id": "com.kiloo.subwaysurf",
                "version": "3.1.0",
                "rating": 4.5
            },
            {
                "publisher_id": "pub-b",
                "name": "Candy Crush Saga",
                "os": "android",
                "id": "com.king.candycrushsaga",
                "bundle_id": "com.king.candycrushsaga",
                "version": "1.242.1"
            }
        ]
    ])
}

fn ios_feed() -> Value {
    json!([
        {
            "publisher_id": 284882218,
            "name": "Candy Crush Saga",
            "os": "ios",
            "id": 553834731,
            "bundle_id": "com.midasplayer.apps.candycrushsaga",
            "version": "1.242.1",
            "is_published": false
        }
    ])
}

fn names(games: &Value) -> Vec<String> {
    games
        .as_array()
        .expect("array body")
        .iter()
        .map(|g| g["name"].as_str().unwrap_or_default().to_owned())
        .collect()
}

#[tokio::test]
async fn populate_returns_mapped_records_then_replaces_table() {
    let feeds = spawn_feed_server(android_feed(), ios_feed()).await;
    let app = TestApp::new(feeds.config());
    app.post("/api/games", json!({"name": "Pre-existing", "platform": "ios"}))
        .await;

    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    let job_id = response
        .headers
        .get(POPULATE_JOB_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("job header")
        .to_owned();

    assert_eq!(
        names(&response.json),
        vec!["Subway Surfers", "Candy Crush Saga", "Candy Crush Saga"]
    );
    let ios = &response.json[2];
    assert_eq!(ios["platform"], "ios");
    assert_eq!(ios["storeId"], "553834731");
    assert_eq!(ios["publisherId"], "284882218");
    assert_eq!(ios["bundleId"], "com.midasplayer.apps.candycrushsaga");
    assert_eq!(ios["appVersion"], "1.242.1");
    assert_eq!(ios["isPublished"], true);
    assert!(ios.get("rating").is_none());

    let status = app.wait_for_populate().await;
    assert_eq!(status["state"], "completed");
    assert_eq!(status["jobId"], job_id);
    assert_eq!(status["fetched"], 3);
    assert_eq!(status["inserted"], 3);

    let listed = app.get("/api/games").await.json;
    assert_eq!(
        names(&listed),
        vec!["Subway Surfers", "Candy Crush Saga", "Candy Crush Saga"]
    );
    assert!(
        listed
            .as_array()
            .unwrap()
            .iter()
            .all(|g| g["isPublished"] == true && g["id"].is_i64())
    );
}

#[tokio::test]
async fn populate_twice_keeps_only_latest_feed_contents() {
    let feeds = spawn_feed_server(json!([]), ios_feed()).await;
    let app = TestApp::new(feeds.config());

    for _ in 0..2 {
        let response = app.post("/api/games/populate", json!({})).await;
        assert_eq!(response.status, StatusCode::OK);
        app.wait_for_populate().await;
    }

    let listed = app.get("/api/games").await.json;
    assert_eq!(names(&listed), vec!["Candy Crush Saga"]);
}

#[tokio::test]
async fn failing_feed_is_bad_gateway_and_leaves_table_untouched() {
    let feeds = spawn_feed_server(android_feed(), ios_feed()).await;
    let app = TestApp::new(FeedConfig {
        ios_url: feeds.url("broken.json"),
        ..feeds.config()
    });
    app.post("/api/games", json!({"name": "Survivor"})).await;

    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.json["message"].is_string());

    let status = app.get("/api/games/populate/status").await.json;
    assert_eq!(status["state"], "failed");
    assert!(status["error"].is_string());

    assert_eq!(names(&app.get("/api/games").await.json), vec!["Survivor"]);
}

#[tokio::test]
async fn non_array_feed_is_bad_gateway() {
    let feeds = spawn_feed_server(android_feed(), ios_feed()).await;
    let app = TestApp::new(FeedConfig {
        android_url: feeds.url("not-an-array.json"),
        ..feeds.config()
    });

    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn concurrent_populate_is_rejected() {
    let feeds = spawn_feed_server(android_feed(), ios_feed()).await;
    let app = TestApp::new(feeds.config());

    let permit = app.state.populate().try_begin().await.expect("first permit");
    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    drop(permit);
    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.wait_for_populate().await["state"], "completed");
}

#[tokio::test]
async fn odd_feed_records_are_kept_as_published_games() {
    let android = json!([[{"name": "Good"}, {"name": "Odd", "version": {"major": 1}}], 7]);
    let feeds = spawn_feed_server(android, json!([])).await;
    let app = TestApp::new(feeds.config());

    let response = app.post("/api/games/populate", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json[1]["name"], "Odd");
    assert_eq!(response.json[1]["appVersion"], Value::Null);
    assert_eq!(response.json[2]["name"], Value::Null);
    assert_eq!(response.json[2]["isPublished"], true);

    assert_eq!(app.wait_for_populate().await["inserted"], 3);
    assert_eq!(app.get("/api/games").await.json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn guard_is_held_until_persistence_finishes() {
    let feeds = spawn_feed_server(android_feed(), ios_feed()).await;
    let store = GatedStore::default();
    let app = TestApp::with_store(feeds.config(), Arc::new(store.clone()));

    let first = app.post("/api/games/populate", json!({})).await;
    assert_eq!(first.status, StatusCode::OK);

    let status = app.get("/api/games/populate/status").await.json;
    assert_eq!(status["state"], "persisting");
    let second = app.post("/api/games/populate", json!({})).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert!(second.json["message"].is_string());

    store.open();
    let status = app.wait_for_populate().await;
    assert_eq!(status["state"], "completed");
    assert!(!app.state.populate().is_running());
    assert_eq!(app.get("/api/games").await.json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn status_is_idle_before_any_job() {
    let app = TestApp::offline();

    let status = app.get("/api/games/populate/status").await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.json, json!({"state": "idle"}));
}
