//! Subcommand implementations
//!
//! Each command writes its report to the given writer so the binary prints
//! to stdout and tests capture a buffer.

use anyhow::{Context, Result};
use echocache::{Fetcher, InstrumentedCache, Value, WebCache, STORE_OPERATION};
use echostore::KvStore;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::logs::{JsonLinesCollection, LogStats};

/// Values stored by `exercise` when none are given
pub const DEFAULT_VALUES: [&str; 3] = ["foo", "bar", "42"];

/// Interpret a command-line argument as an integer, a float, or text
pub fn parse_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => Value::Text(raw.to_string()),
    }
}

/// Flush the store, store each value, read it back and replay the calls
pub fn exercise<W: Write>(store: Arc<dyn KvStore>, values: &[String], out: &mut W) -> Result<()> {
    let cache = InstrumentedCache::new(store).context("Failed to initialize cache")?;

    let values: Vec<String> = if values.is_empty() {
        DEFAULT_VALUES.iter().map(|v| v.to_string()).collect()
    } else {
        values.to_vec()
    };

    for raw in &values {
        let value = parse_value(raw);
        let key = cache.store(value.clone())?;
        let stored = cache.retrieve_text(&key)?.unwrap_or_default();
        writeln!(out, "{} = {} (stored as {:?})", key, value.literal(), stored)?;
    }

    writeln!(out)?;
    write!(out, "{}", cache.replay(STORE_OPERATION)?)?;
    Ok(())
}

/// Fetch `url` through the page cache `times` times
pub fn web<F: Fetcher, W: Write>(
    store: Arc<dyn KvStore>,
    fetcher: F,
    url: &str,
    times: u32,
    ttl: Duration,
    out: &mut W,
) -> Result<()> {
    let cache = WebCache::new(store, fetcher).with_ttl(ttl);

    for attempt in 1..=times {
        let body = cache
            .get_page(url)
            .with_context(|| format!("Failed to get {}", url))?;
        writeln!(out, "#{}: {} bytes", attempt, body.len())?;
    }

    info!("Page cache: {}", cache.stats());
    writeln!(
        out,
        "{} fetched, {} from cache",
        cache.stats().fetched(),
        cache.stats().hits()
    )?;
    writeln!(out, "count:{} = {}", url, cache.access_count(url)?)?;
    Ok(())
}

/// Print statistics for a JSON-lines access log
pub fn log_stats<W: Write>(path: &Path, json: bool, out: &mut W) -> Result<()> {
    let logs = JsonLinesCollection::open(path)?;
    let stats = LogStats::collect(&logs)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &stats).context("Failed to serialize stats")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", stats)?;
    }
    Ok(())
}
