//! Access-log statistics
//!
//! Counts documents of a log collection by HTTP method plus status-check
//! requests. The collection is anything that can answer "how many documents
//! match this filter".

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Methods reported, in report order
pub const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Conjunction of `field == value` conditions. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a `field == value` condition
    pub fn where_eq(mut self, field: &str, value: &str) -> Self {
        self.conditions.push((field.to_string(), value.to_string()));
        self
    }

    /// Check a document against every condition
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| doc.get(field).and_then(Value::as_str) == Some(value.as_str()))
    }
}

/// A collection that can count matching documents
pub trait DocumentCounter {
    /// Number of documents matching `filter`
    fn count_documents(&self, filter: &Filter) -> Result<u64>;
}

/// Log documents loaded from a JSON-lines file
#[derive(Debug, Default)]
pub struct JsonLinesCollection {
    docs: Vec<Map<String, Value>>,
}

impl JsonLinesCollection {
    /// Load one JSON object per line, skipping blank lines
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file {:?}", path))?;

        let collection = Self::parse(&content)?;
        info!("Loaded {} log documents from {:?}", collection.len(), path);
        Ok(collection)
    }

    /// Parse JSON-lines text
    pub fn parse(content: &str) -> Result<Self> {
        let mut docs = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let doc: Map<String, Value> = serde_json::from_str(line)
                .with_context(|| format!("Malformed log document on line {}", lineno + 1))?;
            docs.push(doc);
        }
        Ok(Self { docs })
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }
}

impl DocumentCounter for JsonLinesCollection {
    fn count_documents(&self, filter: &Filter) -> Result<u64> {
        Ok(self.docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }
}

/// Count of requests for one method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCount {
    /// HTTP method
    pub method: String,
    /// Number of log entries
    pub count: u64,
}

/// Aggregate statistics over a log collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStats {
    /// Total log entries
    pub total: u64,
    /// Per-method counts in [`METHODS`] order
    pub methods: Vec<MethodCount>,
    /// `GET /status` requests
    pub status_checks: u64,
}

impl LogStats {
    /// Run the count queries against `counter`
    pub fn collect(counter: &dyn DocumentCounter) -> Result<Self> {
        let total = counter.count_documents(&Filter::all())?;

        let methods = METHODS
            .iter()
            .map(|method| {
                Ok(MethodCount {
                    method: method.to_string(),
                    count: counter.count_documents(&Filter::all().where_eq("method", method))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let status_check = Filter::all()
            .where_eq("method", "GET")
            .where_eq("path", "/status");
        let status_checks = counter.count_documents(&status_check)?;

        Ok(Self {
            total,
            methods,
            status_checks,
        })
    }
}

impl fmt::Display for LogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} logs", self.total)?;
        writeln!(f, "Methods:")?;
        for m in &self.methods {
            writeln!(f, "\tmethod {}: {}", m.method, m.count)?;
        }
        writeln!(f, "{} status check", self.status_checks)
    }
}
