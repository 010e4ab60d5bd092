//! Batch reads for scripts: cross sections for many samples, revision
//! history, and pattern searches.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::db::{HistoryEntry, XsecConnection};
use crate::energy::{Energy, Table};

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("No matching dataset found for sample {sample} at energy {energy} TeV")]
    NoMatchingDataset { sample: String, energy: Energy },

    #[error("Dataset {0} is invalid! (cross section = 0)")]
    InvalidDataset(String),

    #[error(transparent)]
    Query(#[from] sqlx::Error),
}

/// Cross sections of `samples` from the current table, in the same order.
///
/// Every sample must have a row, and no stored value may be zero or empty.
#[instrument(skip(conn), err)]
pub async fn get_xsec<T: XsecConnection>(
    conn: &mut T,
    energy: Energy,
    samples: &[String],
) -> Result<Vec<f64>, ReaderError> {
    let table = Table::current(energy);
    let mut found = Vec::with_capacity(samples.len());
    for sample in samples {
        match conn.cross_section(table, sample).await? {
            Some(xs) => found.push((sample, xs)),
            None => {
                return Err(ReaderError::NoMatchingDataset {
                    sample: sample.clone(),
                    energy,
                })
            }
        }
    }

    found
        .into_iter()
        .map(|(sample, xs)| match xs {
            Some(xs) if xs != 0.0 => Ok(xs),
            _ => Err(ReaderError::InvalidDataset(sample.clone())),
        })
        .collect()
}

/// History of each sample, most recent first. Samples without history are left out.
#[instrument(skip(conn), err)]
pub async fn dump_history<T: XsecConnection>(
    conn: &mut T,
    energy: Energy,
    samples: &[String],
) -> Result<BTreeMap<String, Vec<HistoryEntry>>, sqlx::Error> {
    let table = Table::current(energy).history_log();
    let mut output = BTreeMap::new();
    for sample in samples {
        let entries = conn.history(table, sample).await?;
        if !entries.is_empty() {
            output.insert(sample.clone(), entries);
        }
    }
    Ok(output)
}

/// Samples matching any of the SQL `LIKE` patterns, pattern by pattern.
#[instrument(skip(conn), err)]
pub async fn samples_like<T: XsecConnection>(
    conn: &mut T,
    energy: Energy,
    patterns: &[String],
    history: bool,
) -> Result<Vec<String>, sqlx::Error> {
    let table = Table::new(energy, history);
    let mut output = Vec::new();
    for pattern in patterns {
        output.extend(conn.samples_like(table, pattern).await?);
    }
    Ok(output)
}
