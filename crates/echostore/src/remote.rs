//! Redis-backed store
//!
//! One connection per store handle, shared behind a mutex. Connection
//! failures surface as [`Error::Unavailable`] and are never retried.

use std::time::Duration;

use parking_lot::Mutex;
use redis::{Client, Connection};
use tracing::info;

use crate::error::{Error, Result};
use crate::store::KvStore;

/// RedisStore talks to an external Redis-compatible server
pub struct RedisStore {
    url: String,
    conn: Mutex<Connection>,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1:6379`)
    ///
    /// # Returns
    /// * `Result<RedisStore>` - Connected store handle
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = client.get_connection()?;
        info!("Connected to store at {}", url);

        Ok(Self {
            url: url.to_string(),
            conn: Mutex::new(conn),
        })
    }

    /// Address this store is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.conn.lock();
        Ok(cmd.query(&mut *conn)?)
    }
}

impl KvStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.query(redis::cmd("SET").arg(key).arg(value))
    }

    fn set_ex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<()> {
        // Sub-millisecond TTLs round up so the key still expires
        let millis = i64::try_from(ttl.as_millis().max(1))
            .ok()
            .filter(|_| !ttl.is_zero())
            .ok_or_else(|| Error::Command("invalid expire time in 'setex' command".to_string()))?;
        self.query(redis::cmd("PSETEX").arg(key).arg(millis).arg(value))
    }

    fn incr(&self, key: &str) -> Result<i64> {
        self.query(redis::cmd("INCR").arg(key))
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.query(redis::cmd("RPUSH").arg(key).arg(value))
    }

    fn rpush_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<()> {
        let mut conn = self.conn.lock();
        redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(first_key)
            .arg(first)
            .ignore()
            .cmd("RPUSH")
            .arg(second_key)
            .arg(second)
            .ignore()
            .query::<()>(&mut *conn)?;
        Ok(())
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop))
    }

    fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        // -2 for missing keys, -1 for keys without expiry
        let millis: i64 = self.query(redis::cmd("PTTL").arg(key))?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    fn flushdb(&self) -> Result<()> {
        self.query(&redis::cmd("FLUSHDB"))
    }
}
