//! In-process store implementation
//!
//! Holds strings and lists in a single hash map behind one lock. Expired
//! entries are dropped lazily, the first time a command touches them.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{resolve_range, KvStore};

/// Stored value kinds
#[derive(Debug, Clone)]
enum Value {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// MemoryStore keeps every key in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<AHashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Check if the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop `key` if its TTL has passed, then hand back the live entry
fn live<'a>(entries: &'a mut AHashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
        debug!(key, "evicting expired key");
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn push(entries: &mut AHashMap<String, Entry>, key: &str, value: &[u8]) -> Result<u64> {
    match live(entries, key) {
        Some(Entry {
            value: Value::List(items),
            ..
        }) => {
            items.push(value.to_vec());
            Ok(items.len() as u64)
        }
        Some(_) => Err(Error::WrongType(key.to_string())),
        None => {
            entries.insert(
                key.to_string(),
                Entry::persistent(Value::List(vec![value.to_vec()])),
            );
            Ok(1)
        }
    }
}

fn ensure_list(entries: &mut AHashMap<String, Entry>, key: &str) -> Result<()> {
    match live(entries, key) {
        Some(Entry {
            value: Value::Bytes(_),
            ..
        }) => Err(Error::WrongType(key.to_string())),
        _ => Ok(()),
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry {
                value: Value::Bytes(data),
                ..
            }) => Ok(Some(data.clone())),
            Some(_) => Err(Error::WrongType(key.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.lock().insert(
            key.to_string(),
            Entry::persistent(Value::Bytes(value.to_vec())),
        );
        Ok(())
    }

    fn set_ex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<()> {
        let expires_at = Some(ttl)
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl))
            .ok_or_else(|| Error::Command("invalid expire time in 'setex' command".to_string()))?;

        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: Value::Bytes(value.to_vec()),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry {
                value: Value::Bytes(data),
                ..
            }) => {
                let current = std::str::from_utf8(data)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| {
                        Error::Command("value is not an integer or out of range".to_string())
                    })?;
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| Error::Command("increment would overflow".to_string()))?;
                *data = next.to_string().into_bytes();
                Ok(next)
            }
            Some(_) => Err(Error::WrongType(key.to_string())),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry::persistent(Value::Bytes(b"1".to_vec())),
                );
                Ok(1)
            }
        }
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        push(&mut self.entries.lock(), key, value)
    }

    fn rpush_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<()> {
        let mut entries = self.entries.lock();

        // Check both targets first so a type error leaves neither list touched
        ensure_list(&mut entries, first_key)?;
        ensure_list(&mut entries, second_key)?;

        push(&mut entries, first_key, first)?;
        push(&mut entries, second_key, second)?;
        Ok(())
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry {
                value: Value::List(items),
                ..
            }) => Ok(match resolve_range(items.len(), start, stop) {
                Some((from, to)) => items[from..=to].to_vec(),
                None => Vec::new(),
            }),
            Some(_) => Err(Error::WrongType(key.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut entries = self.entries.lock();
        Ok(live(&mut entries, key)
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(Instant::now())))
    }

    fn flushdb(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("greeting", b"hello").unwrap();
        assert_eq!(store.get("greeting").unwrap(), Some(b"hello".to_vec()));

        store.set("greeting", b"bye").unwrap();
        assert_eq!(store.get("greeting").unwrap(), Some(b"bye".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_incr() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("hits").unwrap(), 1);
        assert_eq!(store.incr("hits").unwrap(), 2);
        assert_eq!(store.get("hits").unwrap(), Some(b"2".to_vec()));

        store.set("seeded", b"41").unwrap();
        assert_eq!(store.incr("seeded").unwrap(), 42);
    }

    #[test]
    fn test_incr_non_integer() {
        let store = MemoryStore::new();
        store.set("name", b"alice").unwrap();
        assert!(matches!(store.incr("name"), Err(Error::Command(_))));
        assert_eq!(store.get("name").unwrap(), Some(b"alice".to_vec()));
    }

    #[test]
    fn test_list_ops() {
        let store = MemoryStore::new();
        assert_eq!(store.rpush("letters", b"a").unwrap(), 1);
        assert_eq!(store.rpush("letters", b"b").unwrap(), 2);
        assert_eq!(store.rpush("letters", b"c").unwrap(), 3);

        assert_eq!(
            store.lrange("letters", 0, -1).unwrap(),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
        assert_eq!(store.lrange("letters", -2, -1).unwrap(), vec![b"b".to_vec(), b"c".to_vec()]);
        assert!(store.lrange("letters", 5, 9).unwrap().is_empty());
        assert!(store.lrange("missing", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_type() {
        let store = MemoryStore::new();
        store.set("plain", b"x").unwrap();
        store.rpush("list", b"y").unwrap();

        assert!(matches!(store.rpush("plain", b"z"), Err(Error::WrongType(_))));
        assert!(matches!(store.lrange("plain", 0, -1), Err(Error::WrongType(_))));
        assert!(matches!(store.get("list"), Err(Error::WrongType(_))));
        assert!(matches!(store.incr("list"), Err(Error::WrongType(_))));
    }

    #[test]
    fn test_rpush_pair() {
        let store = MemoryStore::new();
        store.rpush_pair("in", b"1", "out", b"one").unwrap();
        store.rpush_pair("in", b"2", "out", b"two").unwrap();

        assert_eq!(store.lrange("in", 0, -1).unwrap().len(), 2);
        assert_eq!(
            store.lrange("out", 0, -1).unwrap(),
            vec![b"one".to_vec(), b"two".to_vec()]
        );
    }

    #[test]
    fn test_rpush_pair_wrong_type_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.set("out", b"scalar").unwrap();

        assert!(store.rpush_pair("in", b"1", "out", b"one").is_err());
        assert!(store.lrange("in", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_set_ex_expires() {
        let store = MemoryStore::new();
        store
            .set_ex("short", Duration::from_millis(30), b"soon gone")
            .unwrap();
        assert_eq!(store.get("short").unwrap(), Some(b"soon gone".to_vec()));
        assert!(store.ttl("short").unwrap().is_some());

        thread::sleep(Duration::from_millis(60));

        assert_eq!(store.get("short").unwrap(), None);
        assert_eq!(store.ttl("short").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_clears_ttl() {
        let store = MemoryStore::new();
        store.set_ex("k", Duration::from_secs(10), b"v").unwrap();
        store.set("k", b"v2").unwrap();
        assert_eq!(store.ttl("k").unwrap(), None);
    }

    #[test]
    fn test_set_ex_zero_ttl_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set_ex("k", Duration::ZERO, b"v"),
            Err(Error::Command(_))
        ));
    }

    #[test]
    fn test_set_ex_huge_ttl_rejected() {
        let store = MemoryStore::new();
        let err = store
            .set_ex("k", Duration::from_secs(u64::MAX), b"v")
            .unwrap_err();
        assert!(matches!(err, Error::Command(ref msg) if msg.contains("invalid expire time")));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_flushdb() {
        let store = MemoryStore::new();
        store.set("a", b"1").unwrap();
        store.rpush("b", b"2").unwrap();
        store.incr("c").unwrap();
        assert_eq!(store.len(), 3);

        store.flushdb().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_concurrent_incr() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        store.incr("shared").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("shared").unwrap(), Some(b"1000".to_vec()));
    }
}
