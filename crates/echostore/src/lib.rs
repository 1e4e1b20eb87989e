//! # echostore
//!
//! Minimal key-value store interface used by the Echo instrumentation layer.
//!
//! ## Backends
//! - **MemoryStore**: in-process map with lazy TTL eviction (tests, `--memory`)
//! - **RedisStore**: external Redis-compatible server over a single connection
//!
//! ## Operations
//! GET, SET, SETEX, INCR, RPUSH, LRANGE, TTL, FLUSHDB, plus an atomic
//! two-list append used for call history.

#![warn(missing_docs)]

mod error;
mod memory;
mod remote;
mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use remote::RedisStore;
pub use store::{KvStore, DEFAULT_URL};
