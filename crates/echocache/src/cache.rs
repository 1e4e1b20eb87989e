//! InstrumentedCache: random-key value cache with call counting and history

use std::fmt::Display;

use echostore::{KvStore, RedisStore};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::operation::{Counted, Operation, OperationExt, Recorded};
use crate::replay::{self, CallHistory, Replay};
use crate::value::Value;

/// Operation name under which `store` calls are counted and recorded
pub const STORE_OPERATION: &str = "Cache.store";

/// Writes a value under a fresh random key
#[derive(Debug, Clone, Copy)]
pub struct StoreValue;

impl Operation for StoreValue {
    type Input = Value;
    type Output = String;

    fn name(&self) -> &str {
        STORE_OPERATION
    }

    fn call(&self, store: &dyn KvStore, data: Value) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        store.set(&key, &data.encode())?;
        Ok(key)
    }
}

/// Cache over a key-value store that counts and records `store` calls
pub struct InstrumentedCache<S: KvStore> {
    /// Underlying store
    store: S,

    /// `store` pipeline: history outermost, then the counter
    store_op: Recorded<Counted<StoreValue>>,
}

impl<S: KvStore> InstrumentedCache<S> {
    /// Wrap `store`, flushing every key it currently holds
    ///
    /// The flush gives each cache instance a clean namespace. Do not point
    /// it at a shared database.
    ///
    /// # Returns
    /// * `Result<InstrumentedCache<S>>` - Cache over the emptied store
    pub fn new(store: S) -> Result<Self> {
        store.flushdb()?;
        info!("Store flushed, instrumented cache ready");

        Ok(Self {
            store,
            store_op: StoreValue.counted().recorded(),
        })
    }

    /// Store a value under a newly generated key
    ///
    /// # Arguments
    /// * `data` - Text, bytes, integer or float
    ///
    /// # Returns
    /// * `Result<String>` - Generated key
    pub fn store(&self, data: impl Into<Value>) -> Result<String> {
        self.store_op.call(&self.store, data.into())
    }

    /// Raw bytes stored under `key`, or `None` if absent
    pub fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(key)?)
    }

    /// Read `key` and convert it with `decode`
    ///
    /// Absent keys skip the decoder. A decoder failure surfaces as
    /// [`Error::Decode`] and leaves the stored bytes untouched.
    pub fn retrieve_with<T, E, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> std::result::Result<T, E>,
        E: Display,
    {
        match self.retrieve(key)? {
            Some(raw) => decode(raw)
                .map(Some)
                .map_err(|e| Error::Decode(format!("key '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Read `key` as UTF-8 text
    pub fn retrieve_text(&self, key: &str) -> Result<Option<String>> {
        self.retrieve_with(key, String::from_utf8)
    }

    /// Read `key` as a decimal integer
    pub fn retrieve_int(&self, key: &str) -> Result<Option<i64>> {
        self.retrieve_with(key, |raw| parse_text::<i64>(&raw))
    }

    /// Read `key` as a floating-point number
    pub fn retrieve_float(&self, key: &str) -> Result<Option<f64>> {
        self.retrieve_with(key, |raw| parse_text::<f64>(&raw))
    }

    /// Number of recorded calls of `operation`
    pub fn call_count(&self, operation: &str) -> Result<u64> {
        replay::call_count(&self.store, operation)
    }

    /// Argument/result history of `operation`
    pub fn history(&self, operation: &str) -> Result<CallHistory> {
        CallHistory::load(&self.store, operation)
    }

    /// Replay of `operation` read from this cache's store
    pub fn replay(&self, operation: &str) -> Result<Replay> {
        replay::replay(&self.store, operation)
    }

    /// Underlying store
    pub fn backend(&self) -> &S {
        &self.store
    }
}

impl InstrumentedCache<RedisStore> {
    /// Connect to a Redis server and flush it
    pub fn connect(url: &str) -> Result<Self> {
        Self::new(RedisStore::open(url)?)
    }
}

fn parse_text<T>(raw: &[u8]) -> std::result::Result<T, String>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    let text = std::str::from_utf8(raw).map_err(|e| e.to_string())?;
    text.trim()
        .parse::<T>()
        .map_err(|e| format!("{} (value {:?})", e, text))
}
