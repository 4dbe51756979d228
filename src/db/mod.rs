// Database access: one short-lived connection per call, no pool

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection};
use thiserror::Error;
use tracing::warn;

use crate::config::DatabaseConfig;

pub mod operations;

pub use operations::*;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("database connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("database query timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Database: Send + Sync {
    /// The database server's current time.
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError>;
}

pub struct PgDatabase {
    options: PgConnectOptions,
    timeout: Duration,
}

impl DbError {
    /// True when no connection was established.
    pub fn is_connect(&self) -> bool {
        matches!(self, DbError::Connect(_) | DbError::ConnectTimeout(_))
    }
}

impl PgDatabase {
    pub fn new(config: &DatabaseConfig) -> Self {
        if !config.tls_verify {
            warn!(
                host = %config.host,
                "Database TLS peer verification is disabled; the server certificate will not be checked"
            );
        }

        Self {
            options: connect_options(config),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn connect(&self) -> Result<PgConnection, DbError> {
        tokio::time::timeout(self.timeout, self.options.connect())
            .await
            .map_err(|_| DbError::ConnectTimeout(self.timeout))?
            .map_err(DbError::Connect)
    }
}

/// TLS is always required. `tls_verify` decides whether the peer's
/// certificate and hostname are checked.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let ssl_mode = if config.tls_verify {
        PgSslMode::VerifyFull
    } else {
        PgSslMode::Require
    };

    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(ssl_mode)
}

#[async_trait]
impl Database for PgDatabase {
    async fn current_time(&self) -> Result<DateTime<Utc>, DbError> {
        let mut conn = self.connect().await?;

        let result = tokio::time::timeout(self.timeout, DatabaseOperations::current_time(&mut conn))
            .await
            .map_err(|_| DbError::Timeout(self.timeout))
            .and_then(|queried| queried.map_err(DbError::Query));

        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection cleanly: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{load_config, required_vars};

    #[test]
    fn test_connect_options_verify_by_default() {
        let config = load_config(&required_vars()).unwrap();
        let options = connect_options(&config.database);

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("app"));
        assert!(matches!(options.get_ssl_mode(), PgSslMode::VerifyFull));
    }

    #[test]
    fn test_connect_options_unverified_tls() {
        let mut vars = required_vars();
        vars.insert("DB_TLS_VERIFY", "false");
        let config = load_config(&vars).unwrap();

        let options = connect_options(&config.database);
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_to_connect() {
        let mut vars = required_vars();
        vars.insert("DB_HOST", "127.0.0.1");
        vars.insert("DB_PORT", "1");
        vars.insert("DB_TIMEOUT_SECS", "5");
        let config = load_config(&vars).unwrap();

        let err = PgDatabase::new(&config.database).current_time().await.unwrap_err();
        assert!(err.is_connect());
    }

    #[tokio::test]
    async fn test_silent_server_times_out_while_connecting() {
        // Accepts the TCP connection but never answers the TLS request.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut config = load_config(&required_vars()).unwrap();
        config.database.host = "127.0.0.1".to_string();
        config.database.port = port;
        config.database.timeout_secs = 1;

        let err = PgDatabase::new(&config.database).current_time().await.unwrap_err();
        assert!(matches!(err, DbError::ConnectTimeout(d) if d == Duration::from_secs(1)));
        assert!(err.is_connect());
        drop(listener);
    }
}
