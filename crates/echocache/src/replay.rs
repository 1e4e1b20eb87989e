//! Replay of recorded calls
//!
//! Reads an operation's counter and history lists and renders them in call
//! order:
//!
//! ```text
//! Cache.store was called 2 times:
//! Cache.store(*("foo",)) -> 6a1f...
//! Cache.store(*(42,)) -> 0c9e...
//! ```

use std::fmt;
use std::io::Write;

use echostore::KvStore;

use crate::error::{Error, Result};
use crate::operation::{inputs_key, outputs_key};

/// Ordered argument/result history of one operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallHistory {
    /// Rendered argument tuples, oldest first
    pub inputs: Vec<String>,
    /// Rendered results, oldest first
    pub outputs: Vec<String>,
}

impl CallHistory {
    /// Read both history lists of `operation`
    pub fn load(store: &dyn KvStore, operation: &str) -> Result<Self> {
        Ok(Self {
            inputs: read_list(store, &inputs_key(operation))?,
            outputs: read_list(store, &outputs_key(operation))?,
        })
    }

    /// Index-aligned (input, output) pairs
    ///
    /// Stops at the shorter list.
    pub fn calls(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inputs
            .iter()
            .zip(self.outputs.iter())
            .map(|(i, o)| (i.as_str(), o.as_str()))
    }

    /// Number of complete (input, output) pairs
    pub fn len(&self) -> usize {
        self.inputs.len().min(self.outputs.len())
    }

    /// Check if no call was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_list(store: &dyn KvStore, key: &str) -> Result<Vec<String>> {
    Ok(store
        .lrange(key, 0, -1)?
        .into_iter()
        .map(|raw| String::from_utf8_lossy(&raw).into_owned())
        .collect())
}

/// Counter of `operation`, 0 when it was never called
pub fn call_count(store: &dyn KvStore, operation: &str) -> Result<u64> {
    match store.get(operation)? {
        Some(raw) => std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| {
                Error::Decode(format!(
                    "counter '{}' is not an integer: {:?}",
                    operation,
                    String::from_utf8_lossy(&raw)
                ))
            }),
        None => Ok(0),
    }
}

/// Snapshot of an operation's call count and history
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// Operation name
    pub operation: String,
    /// Value of the call counter
    pub calls: u64,
    /// Recorded history
    pub history: CallHistory,
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.operation, self.calls)?;
        for (input, output) in self.history.calls() {
            writeln!(f, "{}(*{}) -> {}", self.operation, input, output)?;
        }
        Ok(())
    }
}

/// Read the replay of `operation` from `store`
///
/// Read-only. An operation that was never called replays as zero calls with
/// no entries.
pub fn replay(store: &dyn KvStore, operation: &str) -> Result<Replay> {
    Ok(Replay {
        operation: operation.to_string(),
        calls: call_count(store, operation)?,
        history: CallHistory::load(store, operation)?,
    })
}

/// Render the replay of `operation` to `out`
pub fn print_replay<W: Write>(store: &dyn KvStore, operation: &str, out: &mut W) -> Result<()> {
    let report = replay(store, operation)?;
    write!(out, "{}", report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InstrumentedCache, STORE_OPERATION};
    use echostore::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_replay_zero_calls() {
        let store = MemoryStore::new();
        let report = replay(&store, STORE_OPERATION).unwrap();

        assert_eq!(report.calls, 0);
        assert!(report.history.is_empty());
        assert_eq!(report.to_string(), "Cache.store was called 0 times:\n");
    }

    #[test]
    fn test_replay_in_call_order() {
        let store = Arc::new(MemoryStore::new());
        let cache = InstrumentedCache::new(store.clone()).unwrap();

        let k1 = cache.store("foo").unwrap();
        let k2 = cache.store("bar").unwrap();
        let k3 = cache.store(42).unwrap();

        let mut out = Vec::new();
        print_replay(&store, STORE_OPERATION, &mut out).unwrap();

        let expected = format!(
            "Cache.store was called 3 times:\n\
             Cache.store(*('foo',)) -> {}\n\
             Cache.store(*('bar',)) -> {}\n\
             Cache.store(*(42,)) -> {}\n",
            k1, k2, k3
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_replay_does_not_mutate() {
        let store = MemoryStore::new();
        store.incr("Op.run").unwrap();
        store.rpush_pair("Op.run:inputs", b"()", "Op.run:outputs", b"ok").unwrap();

        let first = replay(&store, "Op.run").unwrap();
        let second = replay(&store, "Op.run").unwrap();
        assert_eq!(first, second);
        assert_eq!(call_count(&store, "Op.run").unwrap(), 1);
    }

    #[test]
    fn test_count_may_exceed_history() {
        let store = MemoryStore::new();
        store.incr("Op.run").unwrap();
        store.incr("Op.run").unwrap();
        store.rpush_pair("Op.run:inputs", b"()", "Op.run:outputs", b"ok").unwrap();

        let report = replay(&store, "Op.run").unwrap();
        assert_eq!(report.calls, 2);
        assert_eq!(
            report.to_string(),
            "Op.run was called 2 times:\nOp.run(*()) -> ok\n"
        );
    }

    #[test]
    fn test_mismatched_lists_render_aligned_prefix() {
        let store = MemoryStore::new();
        store.rpush("Op.run:inputs", b"(1,)").unwrap();
        store.rpush("Op.run:inputs", b"(2,)").unwrap();
        store.rpush("Op.run:outputs", b"one").unwrap();

        let history = CallHistory::load(&store, "Op.run").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.calls().collect::<Vec<_>>(), vec![("(1,)", "one")]);
    }

    #[test]
    fn test_bad_counter() {
        let store = MemoryStore::new();
        store.set("Op.run", b"many").unwrap();
        assert!(matches!(call_count(&store, "Op.run"), Err(Error::Decode(_))));
    }
}
