//! The cross section request handler.
//!
//! A request is either a browser listing of a whole table or an API lookup of
//! a single sample. Energy is validated before anything else happens, and the
//! connection opened for the request is closed on every path once it exists.

use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, error, instrument};

use crate::db::{ConnectError, Connector, XsecConnection};
use crate::energy::{Energy, InvalidEnergy, Table};
use crate::render::{format_value, BrowsePage, SearchFilter};

/// Raw query string parameters. Flags only need to be present, with any value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct XsecParams {
    pub sample: Option<String>,
    pub browse: Option<String>,
    pub energy: Option<String>,
    pub history: Option<String>,
    pub search: Option<String>,
}

/// A request after mode selection and energy validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsecRequest {
    pub sample: String,
    pub in_browser: bool,
    pub table: Table,
    pub search: Option<String>,
}

impl XsecParams {
    pub fn validate(self) -> Result<XsecRequest, InvalidEnergy> {
        let sample = self.sample.unwrap_or_default();
        let in_browser = self.browse.is_some() || sample.is_empty();
        let energy: Energy = match self.energy.as_deref() {
            Some(raw) => raw.parse()?,
            None => Energy::default(),
        };
        Ok(XsecRequest {
            sample,
            in_browser,
            table: Table::new(energy, self.history.is_some()),
            search: self.search,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum XsecError {
    #[error(transparent)]
    InvalidEnergy(#[from] InvalidEnergy),

    #[error("Connection failed: {0}")]
    Connection(#[from] ConnectError),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl XsecError {
    /// Caused by the request itself rather than the database.
    pub fn is_request_error(&self) -> bool {
        matches!(self, XsecError::InvalidEnergy(_))
    }
}

#[derive(Debug)]
pub enum Response {
    /// The whole plain-text body of an API mode response.
    Text(String),
    Browse(BrowsePage),
}

/// Message written when API mode finds no usable cross section.
pub fn missing_message(sample: &str, energy: Energy) -> String {
    format!("ERROR: cross section missing for {sample} at energy {energy} TeV.")
}

#[instrument(skip_all, fields(sample = ?params.sample, energy = ?params.energy))]
pub async fn handle<C: Connector>(
    connector: &C,
    params: XsecParams,
) -> Result<Response, XsecError> {
    let result = respond(connector, params).await;
    match &result {
        Err(err) if err.is_request_error() => debug!(error = %err, "rejected request"),
        Err(err) => error!(error = %err, "request failed"),
        Ok(_) => {}
    }
    result
}

async fn respond<C: Connector>(
    connector: &C,
    params: XsecParams,
) -> Result<Response, XsecError> {
    let request = params.validate()?;
    let mut conn = connector.connect().await?;
    let response = dispatch(&mut conn, &request).await;
    conn.close().await;
    Ok(response?)
}

async fn dispatch<T: XsecConnection>(
    conn: &mut T,
    request: &XsecRequest,
) -> Result<Response, sqlx::Error> {
    if request.in_browser {
        browse(conn, request).await.map(Response::Browse)
    } else {
        lookup(conn, request.table, &request.sample)
            .await
            .map(Response::Text)
    }
}

async fn browse<T: XsecConnection>(
    conn: &mut T,
    request: &XsecRequest,
) -> Result<BrowsePage, sqlx::Error> {
    let table = request.table;
    let updated: BTreeSet<String> = if table.is_history() {
        BTreeSet::new()
    } else {
        conn.samples_with_revisions(table.history_log())
            .await?
            .into_iter()
            .collect()
    };
    let records = conn.all_records(table).await?;
    debug!(%table, rows = records.len(), updated = updated.len(), "browse");
    Ok(BrowsePage {
        table,
        records,
        updated,
        search: SearchFilter::new(request.search.as_deref()),
    })
}

/// Zero is treated the same as a missing row.
async fn lookup<T: XsecConnection>(
    conn: &mut T,
    table: Table,
    sample: &str,
) -> Result<String, sqlx::Error> {
    match conn.cross_section(table, sample).await? {
        Some(Some(xs)) if xs != 0.0 => Ok(format_value(xs)),
        _ => Ok(missing_message(sample, table.energy())),
    }
}
