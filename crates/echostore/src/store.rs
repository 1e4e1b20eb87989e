//! The key-value store interface shared by every backend

use std::time::Duration;

use crate::error::Result;

/// Default address of the external store
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379";

/// Blocking key-value store with counters, lists and expiry
///
/// Every call is a single request/response against the store. Implementations
/// own their connection and any locking needed to share it; callers do no
/// coordination of their own.
pub trait KvStore: Send + Sync {
    /// Read a string value. Absent or expired keys yield `None`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a string value, dropping any previous TTL
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Write a string value that the store evicts after `ttl`
    fn set_ex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<()>;

    /// Atomically increment an integer value, treating absent keys as 0
    fn incr(&self, key: &str) -> Result<i64>;

    /// Append to the tail of a list, returning the new length
    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64>;

    /// Append one value to each of two lists as a single atomic step
    fn rpush_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<()>;

    /// Inclusive slice of a list; negative indices count from the tail
    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Remaining time to live. `None` for absent keys and keys without expiry.
    fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Remove every key in the active namespace
    fn flushdb(&self) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_ex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<()> {
        (**self).set_ex(key, ttl, value)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        (**self).incr(key)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).rpush(key, value)
    }

    fn rpush_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<()> {
        (**self).rpush_pair(first_key, first, second_key, second)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        (**self).lrange(key, start, stop)
    }

    fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        (**self).ttl(key)
    }

    fn flushdb(&self) -> Result<()> {
        (**self).flushdb()
    }
}

/// Resolve an inclusive `start..=stop` range against a list of `len` items
///
/// Mirrors LRANGE: negative indices count from the end, out-of-range bounds
/// clamp, and an empty range yields `None`.
pub(crate) fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }

    Some((start as usize, stop as usize))
}
