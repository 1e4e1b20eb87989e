//! # echocache
//!
//! Instrumented caching over an Echo key-value store.
//!
//! ## Architecture
//! - **InstrumentedCache**: stores values under random keys; every `store`
//!   call is counted and its argument/result recorded in the store
//! - **Operation wrappers**: counting and history are separate layers
//!   (`Counted`, `Recorded`) composed onto any operation at construction
//! - **Replay**: renders an operation's count and history in call order
//! - **WebCache**: page fetches with per-URL access counters and a
//!   10-second cache entry per page
//!
//! ## Store keys
//! - `{operation}`: call counter (e.g. `Cache.store`)
//! - `{operation}:inputs` / `{operation}:outputs`: history lists
//! - `count:{url}` / `cached:{url}`: page access counter and cached body

#![warn(missing_docs)]

mod cache;
mod error;
mod operation;
mod replay;
mod stats;
mod value;
mod web;

pub use cache::{InstrumentedCache, StoreValue, STORE_OPERATION};
pub use error::{Error, Result};
pub use operation::{inputs_key, outputs_key, Counted, Operation, OperationExt, Recorded};
pub use replay::{call_count, print_replay, replay, CallHistory, Replay};
pub use stats::FetchStats;
pub use value::{CallArgs, Value};
pub use web::{cached_key, count_key, Fetcher, HttpFetcher, WebCache, DEFAULT_TIMEOUT, PAGE_TTL};
