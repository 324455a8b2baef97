//! Downloads the Android and iOS top-100 documents.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::FeedConfig;

/// Failures that can occur while downloading or decoding a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build feed HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to fetch feed `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The feed answered with a non-success status.
    #[error("unexpected response status {status} for feed `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// The body is not a JSON array.
    #[error("failed to decode feed `{url}` as a JSON array")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Raw documents of both feeds, still nested as published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedBatch {
    pub android: Vec<Value>,
    pub ios: Vec<Value>,
}

/// Thin wrapper over a shared [`reqwest::Client`] bound to the two feed URLs.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    android_url: Arc<str>,
    ios_url: Arc<str>,
}

impl FeedClient {
    /// Build a client for the configured feed locations.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| FeedError::ClientBuilder { source })?;

        Ok(Self {
            client,
            android_url: Arc::from(config.android_url.as_str()),
            ios_url: Arc::from(config.ios_url.as_str()),
        })
    }

    /// Download one feed and parse its top-level JSON array.
    pub async fn fetch(&self, url: &str) -> Result<Vec<Value>, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FeedError::RequestSend {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::RequestStatus {
                url: url.to_owned(),
                status,
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|source| FeedError::DecodeResponse {
                url: url.to_owned(),
                source,
            })
    }

    /// Download both feeds concurrently; the first failure aborts the whole batch.
    pub async fn fetch_all(&self) -> Result<FeedBatch, FeedError> {
        let (android, ios) =
            tokio::try_join!(self.fetch(&self.android_url), self.fetch(&self.ios_url))?;
        Ok(FeedBatch { android, ios })
    }
}
