//! HTML listing for browser mode.

use askama::Template;
use regex::Regex;
use std::collections::BTreeSet;

use crate::db::SampleRecord;
use crate::energy::{Energy, Table};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text form of a stored cross section, as written in API mode.
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_default()
}

/// Filters sample names by a user supplied pattern.
///
/// Patterns that are not valid regular expressions are matched literally.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    raw: String,
    regex: Option<Regex>,
}

impl SearchFilter {
    pub fn new(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or_default().to_string();
        let regex = if raw.is_empty() {
            None
        } else {
            Regex::new(&raw)
                .or_else(|_| Regex::new(&regex::escape(&raw)))
                .ok()
        };
        SearchFilter { raw, regex }
    }

    pub fn is_match(&self, sample: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(sample))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

struct EnergyLink {
    energy: Energy,
    selected: bool,
}

struct RowView {
    sample: String,
    cross_section: String,
    uncertainty: String,
    last_updated: String,
    source: String,
    comments: String,
    updated: bool,
}

impl RowView {
    fn new(record: &SampleRecord, updated: bool) -> Self {
        RowView {
            sample: record.sample.clone(),
            cross_section: format_optional(record.cross_section),
            uncertainty: format_optional(record.uncertainty),
            last_updated: record.last_updated.format(TIMESTAMP_FORMAT).to_string(),
            source: record.source.clone().unwrap_or_default(),
            comments: record.comments.clone().unwrap_or_default(),
            updated,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Cross sections at {{ energy }} TeV{% if history %} (history){% endif %}</title>
    <style>
      body { margin: 0; padding: 16px; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      a { color: #8ab4e8; }
      nav a { margin-right: 10px; }
      nav a.selected { font-weight: 600; color: #cbe3ff; }
      table { border-collapse: collapse; margin-top: 12px; width: 100%; }
      th, td { border-bottom: 1px solid #1f2630; padding: 4px 8px; text-align: left; font-size: 13px; }
      th { color: #9aa3ad; text-transform: uppercase; font-size: 11px; letter-spacing: 0.08em; }
      tr.updated td:first-child { color: #f0c674; }
      .hint { font-size: 12px; color: #7f8895; }
    </style>
  </head>
  <body>
    <nav>
      {% for link in energies %}<a href="?browse&amp;energy={{ link.energy }}{% if history %}&amp;history{% endif %}"{% if link.selected %} class="selected"{% endif %}>{{ link.energy }} TeV</a>{% endfor %}
      {% if history %}<a href="?browse&amp;energy={{ energy }}">Current values</a>{% else %}<a href="?browse&amp;energy={{ energy }}&amp;history">History</a>{% endif %}
    </nav>
    <form method="get">
      <input type="hidden" name="browse" value="" />
      <input type="hidden" name="energy" value="{{ energy }}" />
      {% if history %}<input type="hidden" name="history" value="" />{% endif %}
      <input type="text" name="search" value="{{ search }}" placeholder="Sample regex" />
      <button type="submit">Search</button>
    </form>
    <p class="hint">{{ rows.len() }} of {{ total }} entries in {{ table }}.{% if !history %} Highlighted samples have been updated.{% endif %}</p>
    <table>
      <thead>
        <tr><th>Sample</th><th>Cross section [pb]</th><th>Uncertainty</th><th>Last updated</th><th>Source</th><th>Comments</th></tr>
      </thead>
      <tbody>
        {% for row in rows %}
        <tr{% if row.updated %} class="updated"{% endif %}><td>{{ row.sample }}</td><td>{{ row.cross_section }}</td><td>{{ row.uncertainty }}</td><td>{{ row.last_updated }}</td><td>{{ row.source }}</td><td>{{ row.comments }}</td></tr>
        {% endfor %}
      </tbody>
    </table>
  </body>
</html>"#,
    ext = "html"
)]
struct BrowseTemplate<'a> {
    energy: Energy,
    history: bool,
    table: String,
    energies: Vec<EnergyLink>,
    search: &'a str,
    total: usize,
    rows: Vec<RowView>,
}

/// Everything browser mode hands to the template.
#[derive(Debug, Clone)]
pub struct BrowsePage {
    pub table: Table,
    pub records: Vec<SampleRecord>,
    pub updated: BTreeSet<String>,
    pub search: SearchFilter,
}

impl BrowsePage {
    /// Rows that pass the search filter, in query order, with their updated flag.
    pub fn visible(&self) -> impl Iterator<Item = (&SampleRecord, bool)> + '_ {
        self.records
            .iter()
            .filter(|record| self.search.is_match(&record.sample))
            .map(|record| (record, self.updated.contains(&record.sample)))
    }

    pub fn render(&self) -> askama::Result<String> {
        let energy = self.table.energy();
        BrowseTemplate {
            energy,
            history: self.table.is_history(),
            table: self.table.name(),
            energies: Energy::ALL
                .into_iter()
                .map(|e| EnergyLink {
                    energy: e,
                    selected: e == energy,
                })
                .collect(),
            search: self.search.as_str(),
            total: self.records.len(),
            rows: self
                .visible()
                .map(|(record, updated)| RowView::new(record, updated))
                .collect(),
        }
        .render()
    }
}
