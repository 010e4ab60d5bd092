//! The query layer: everything the request handler and the reader need from the
//! cross section database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ConfigError;
use crate::energy::Table;

/// One row of a cross section table, current or history.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SampleRecord {
    pub sample: String,
    pub cross_section: Option<f64>,
    pub uncertainty: Option<f64>,
    pub last_updated: DateTime<Utc>,
    pub source: Option<String>,
    pub comments: Option<String>,
}

/// One revision of a sample's cross section, as kept in the history table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub cross_section: Option<f64>,
    pub last_updated: DateTime<Utc>,
    pub source: Option<String>,
    pub comments: Option<String>,
}

/// Errors that can occur while opening a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Driver(#[from] sqlx::Error),
}

/// Query texts run against MySQL. The table name is always built from a
/// validated energy; the sample name or pattern is bound as `?`.
pub mod sql {
    use crate::energy::Table;

    pub fn samples_with_revisions(table: Table) -> String {
        indoc::formatdoc! {r#"
            SELECT sample FROM {}
            GROUP BY sample
            HAVING COUNT(*) > 1
        "#, table}
    }

    pub fn all_records(table: Table) -> String {
        indoc::formatdoc! {r#"
            SELECT sample, cross_section, uncertainty, last_updated, source, comments
            FROM {}
            ORDER BY sample ASC, last_updated DESC
        "#, table}
    }

    pub fn cross_section(table: Table) -> String {
        format!("SELECT cross_section FROM {table} WHERE sample = ?")
    }

    pub fn history(table: Table) -> String {
        indoc::formatdoc! {r#"
            SELECT cross_section, last_updated, source, comments
            FROM {}
            WHERE sample = ?
            ORDER BY last_updated DESC
        "#, table}
    }

    pub fn samples_like(table: Table) -> String {
        format!("SELECT sample FROM {table} WHERE sample LIKE ?")
    }
}

/// Opens one short-lived connection per request.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: XsecConnection;

    async fn connect(&self) -> Result<Self::Conn, ConnectError>;
}

/// Read-only queries against the cross section tables.
#[async_trait]
pub trait XsecConnection: Send {
    /// Samples with more than one row in the given (history) table.
    async fn samples_with_revisions(&mut self, table: Table) -> Result<Vec<String>, sqlx::Error>;

    /// Every row of the table, by sample ascending then most recent first.
    async fn all_records(&mut self, table: Table) -> Result<Vec<SampleRecord>, sqlx::Error>;

    /// Cross section stored for exactly this sample name, if any row exists.
    async fn cross_section(
        &mut self,
        table: Table,
        sample: &str,
    ) -> Result<Option<Option<f64>>, sqlx::Error>;

    /// History rows for exactly this sample name, most recent first.
    async fn history(&mut self, table: Table, sample: &str)
        -> Result<Vec<HistoryEntry>, sqlx::Error>;

    /// Sample names matching a SQL `LIKE` pattern.
    async fn samples_like(&mut self, table: Table, pattern: &str)
        -> Result<Vec<String>, sqlx::Error>;

    /// Releases the connection. Must be called exactly once.
    async fn close(self);
}
