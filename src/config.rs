//! Application-level configuration loading: listen port, feed locations and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TOP_GAMES_BACK_CONFIG_PATH";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Android top-100 feed.
pub const ANDROID_TOP_100_GAMES_URL: &str =
    "https://interview-marketing-eng-dev.s3.eu-west-1.amazonaws.com/android.top100.json";
/// iOS top-100 feed.
pub const IOS_TOP_100_GAMES_URL: &str =
    "https://interview-marketing-eng-dev.s3.eu-west-1.amazonaws.com/ios.top100.json";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Directory served at the server root for unmatched paths.
    pub static_dir: PathBuf,
    pub feeds: FeedConfig,
    pub storage: StorageConfig,
}

/// Where the populate operation fetches its two feeds from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub android_url: String,
    pub ios_url: String,
    pub timeout: Duration,
}

/// Which storage backend to install and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongo_uri: String,
    pub mongo_db: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MongoDB, supervised in the background.
    Mongo,
    /// Volatile in-process table.
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(Self::Mongo),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `PORT`/`SERVER_PORT`, `MONGO_URI`, `MONGO_DB` and `STORAGE_BACKEND` overrides.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.storage.mongo_uri = uri;
        }
        if let Some(db) = lookup("MONGO_DB") {
            self.storage.mongo_db = Some(db);
        }
        if let Some(raw) = lookup("STORAGE_BACKEND") {
            match StorageBackend::parse(&raw) {
                Some(backend) => self.storage.backend = backend,
                None => warn!(value = %raw, "unknown STORAGE_BACKEND; keeping configured backend"),
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            feeds: FeedConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            android_url: ANDROID_TOP_100_GAMES_URL.to_owned(),
            ios_url: IOS_TOP_100_GAMES_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mongo,
            mongo_uri: DEFAULT_MONGO_URI.to_owned(),
            mongo_db: None,
        }
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    feeds: RawFeeds,
    storage: RawStorage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFeeds {
    android_url: Option<String>,
    ios_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    backend: Option<StorageBackend>,
    mongo_uri: Option<String>,
    mongo_db: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            static_dir: value.static_dir.unwrap_or(defaults.static_dir),
            feeds: FeedConfig {
                android_url: value.feeds.android_url.unwrap_or(defaults.feeds.android_url),
                ios_url: value.feeds.ios_url.unwrap_or(defaults.feeds.ios_url),
                timeout: value
                    .feeds
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.feeds.timeout),
            },
            storage: StorageConfig {
                backend: value.storage.backend.unwrap_or(defaults.storage.backend),
                mongo_uri: value.storage.mongo_uri.unwrap_or(defaults.storage.mongo_uri),
                mongo_db: value.storage.mongo_db.or(defaults.storage.mongo_db),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
