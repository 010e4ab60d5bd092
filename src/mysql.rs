//! MySQL implementation of the query layer.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions as _, Connection as _};
use tracing::{debug, instrument, warn};

use crate::config::DbConfig;
use crate::db::{sql, ConnectError, Connector, HistoryEntry, SampleRecord, XsecConnection};
use crate::energy::Table;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects with the credentials file, re-read on every connection.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config_path: PathBuf,
}

impl MySqlConnector {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        MySqlConnector {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}

fn connect_options(config: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

#[async_trait]
impl Connector for MySqlConnector {
    type Conn = DbConn;

    #[instrument(skip_all, fields(config = %self.config_path.display()), err)]
    async fn connect(&self) -> Result<DbConn, ConnectError> {
        let config = DbConfig::load(&self.config_path)?;
        debug!(host = %config.host, user = %config.user, "opening connection");
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, connect_options(&config).connect())
            .await
            .map_err(|_| {
                sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "timed out connecting to the database",
                ))
            })??;
        Ok(DbConn(conn))
    }
}

/// A dedicated connection to the cross section database.
#[derive(Debug)]
pub struct DbConn(MySqlConnection);

#[async_trait]
impl XsecConnection for DbConn {
    #[instrument(skip(self), err)]
    async fn samples_with_revisions(&mut self, table: Table) -> Result<Vec<String>, sqlx::Error> {
        let query = sql::samples_with_revisions(table);
        sqlx::query_scalar(&query).fetch_all(&mut self.0).await
    }

    #[instrument(skip(self), err)]
    async fn all_records(&mut self, table: Table) -> Result<Vec<SampleRecord>, sqlx::Error> {
        let query = sql::all_records(table);
        sqlx::query_as(&query).fetch_all(&mut self.0).await
    }

    #[instrument(skip(self), err)]
    async fn cross_section(
        &mut self,
        table: Table,
        sample: &str,
    ) -> Result<Option<Option<f64>>, sqlx::Error> {
        let query = sql::cross_section(table);
        sqlx::query_scalar(&query)
            .bind(sample)
            .fetch_optional(&mut self.0)
            .await
    }

    #[instrument(skip(self), err)]
    async fn history(
        &mut self,
        table: Table,
        sample: &str,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = sql::history(table);
        sqlx::query_as(&query)
            .bind(sample)
            .fetch_all(&mut self.0)
            .await
    }

    #[instrument(skip(self), err)]
    async fn samples_like(
        &mut self,
        table: Table,
        pattern: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let query = sql::samples_like(table);
        sqlx::query_scalar(&query)
            .bind(pattern)
            .fetch_all(&mut self.0)
            .await
    }

    async fn close(self) {
        if let Err(err) = self.0.close().await {
            warn!(error = %err, "error closing connection");
        }
    }
}
