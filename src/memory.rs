//! In-memory cross section tables for tests.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use regex::Regex;

use crate::db::{sql, ConnectError, Connector, HistoryEntry, SampleRecord, XsecConnection};
use crate::energy::Table;

pub fn record(sample: &str, cross_section: Option<f64>, last_updated: &str) -> SampleRecord {
    SampleRecord {
        sample: sample.to_string(),
        cross_section,
        uncertainty: None,
        last_updated: NaiveDateTime::parse_from_str(last_updated, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc(),
        source: Some("test".to_string()),
        comments: None,
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    connects: AtomicUsize,
    closes: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl Stats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Records the query text on one line, followed by the bound value if any.
    fn log(&self, query: String, bind: Option<&str>) {
        let mut line = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(bind) = bind {
            line.push_str(&format!(" [{bind}]"));
        }
        self.queries.lock().unwrap().push(line);
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
    tables: BTreeMap<String, Vec<SampleRecord>>,
    refuse: Option<String>,
    stats: Arc<Stats>,
}

impl MemoryConnector {
    pub fn with_table(mut self, name: &str, rows: Vec<SampleRecord>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    /// Every connection attempt fails with this driver message.
    pub fn refusing(mut self, message: &str) -> Self {
        self.refuse = Some(message.to_string());
        self
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Conn = MemoryConnection;

    async fn connect(&self) -> Result<MemoryConnection, ConnectError> {
        if let Some(message) = &self.refuse {
            return Err(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message.clone(),
            ))
            .into());
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            tables: self.tables.clone(),
            stats: self.stats.clone(),
        })
    }
}

pub struct MemoryConnection {
    tables: BTreeMap<String, Vec<SampleRecord>>,
    stats: Arc<Stats>,
}

impl MemoryConnection {
    fn rows(&self, table: Table) -> Result<&[SampleRecord], sqlx::Error> {
        self.tables
            .get(&table.name())
            .map(Vec::as_slice)
            .ok_or_else(|| {
                sqlx::Error::Protocol(format!("Table 'cross_sections.{table}' doesn't exist"))
            })
    }
}

/// SQL `LIKE` under a case-insensitive collation.
fn like_regex(pattern: &str) -> Regex {
    let mut re = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).unwrap()
}

#[async_trait]
impl XsecConnection for MemoryConnection {
    async fn samples_with_revisions(&mut self, table: Table) -> Result<Vec<String>, sqlx::Error> {
        self.stats.log(sql::samples_with_revisions(table), None);
        let mut counts = BTreeMap::<&str, usize>::new();
        for row in self.rows(table)? {
            *counts.entry(&row.sample).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(sample, _)| sample.to_string())
            .collect())
    }

    async fn all_records(&mut self, table: Table) -> Result<Vec<SampleRecord>, sqlx::Error> {
        self.stats.log(sql::all_records(table), None);
        let mut rows = self.rows(table)?.to_vec();
        rows.sort_by(|a, b| {
            a.sample
                .cmp(&b.sample)
                .then(b.last_updated.cmp(&a.last_updated))
        });
        Ok(rows)
    }

    async fn cross_section(
        &mut self,
        table: Table,
        sample: &str,
    ) -> Result<Option<Option<f64>>, sqlx::Error> {
        self.stats.log(sql::cross_section(table), Some(sample));
        Ok(self
            .rows(table)?
            .iter()
            .find(|row| row.sample == sample)
            .map(|row| row.cross_section))
    }

    async fn history(
        &mut self,
        table: Table,
        sample: &str,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        self.stats.log(sql::history(table), Some(sample));
        let mut rows: Vec<_> = self
            .rows(table)?
            .iter()
            .filter(|row| row.sample == sample)
            .map(|row| HistoryEntry {
                cross_section: row.cross_section,
                last_updated: row.last_updated,
                source: row.source.clone(),
                comments: row.comments.clone(),
            })
            .collect();
        rows.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(rows)
    }

    async fn samples_like(
        &mut self,
        table: Table,
        pattern: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        self.stats.log(sql::samples_like(table), Some(pattern));
        let re = like_regex(pattern);
        Ok(self
            .rows(table)?
            .iter()
            .filter(|row| re.is_match(&row.sample))
            .map(|row| row.sample.clone())
            .collect())
    }

    async fn close(self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}
