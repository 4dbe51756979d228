// In-memory collaborators and fixtures for unit tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use crate::config::{Config, ConfigError};
use crate::db::{Database, DbError};
use crate::models::AppState;
use crate::storage::{ObjectStore, StoreError};

pub fn required_vars() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG"),
        ("AWS_REGION", "us-east-1"),
        ("S3_BUCKET_NAME", "photos"),
        ("DB_USER", "app"),
        ("DB_PASSWORD", "hunter2"),
        ("DB_NAME", "app"),
        ("DB_HOST", "db.internal"),
        ("DB_PORT", "5432"),
    ])
}

pub fn load_config(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

pub fn test_state(database: Arc<dyn Database>, store: Arc<dyn ObjectStore>) -> AppState {
    let config = load_config(&required_vars()).expect("test configuration is valid");
    AppState::new(config, database, store)
}

/// Objects kept in a sorted map, so listings come back in key order like S3.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, (Bytes, String)>>,
}

impl MemoryStore {
    pub fn insert(&self, key: &str, content_type: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (Bytes::new(), content_type.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        Ok(format!(
            "https://memory.invalid/{}?X-Amz-Expires={}",
            key,
            ttl.as_secs()
        ))
    }
}

/// A store whose every call fails with the same kind of error.
pub struct FailingStore {
    kind: FailureKind,
}

enum FailureKind {
    Client,
    Timeout,
    Unexpected,
}

impl FailingStore {
    pub fn client() -> Self {
        Self { kind: FailureKind::Client }
    }

    pub fn timeout() -> Self {
        Self { kind: FailureKind::Timeout }
    }

    pub fn unexpected() -> Self {
        Self { kind: FailureKind::Unexpected }
    }

    fn error(&self) -> StoreError {
        match self.kind {
            FailureKind::Client => StoreError::Client {
                status: 403,
                message: "AccessDenied".to_string(),
            },
            FailureKind::Timeout => StoreError::Timeout(Duration::from_secs(30)),
            FailureKind::Unexpected => StoreError::Unexpected("connection reset".to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put(&self, _key: &str, _body: Bytes, _content_type: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn list(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(self.error())
    }

    async fn presign_get(&self, _key: &str, _ttl: Duration) -> Result<String, StoreError> {
        Err(self.error())
    }
}

pub struct FixedDatabase(pub DateTime<Utc>);

impl Default for FixedDatabase {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }
}

#[async_trait]
impl Database for FixedDatabase {
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError> {
        Ok(self.0)
    }
}

pub struct UnreachableDatabase;

#[async_trait]
impl Database for UnreachableDatabase {
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError> {
        Err(DbError::Connect(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))))
    }
}

/// Connects fine, then the query itself fails.
pub enum FailingDatabase {
    Query,
    Timeout,
}

#[async_trait]
impl Database for FailingDatabase {
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError> {
        match self {
            FailingDatabase::Query => Err(DbError::Query(sqlx::Error::RowNotFound)),
            FailingDatabase::Timeout => Err(DbError::Timeout(Duration::from_secs(10))),
        }
    }
}

/// Never gets a connection established in time.
pub struct SlowConnectDatabase;

#[async_trait]
impl Database for SlowConnectDatabase {
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError> {
        Err(DbError::ConnectTimeout(Duration::from_secs(10)))
    }
}
