//! Storage backends for short links.
//!
//! [`LogRepository`] is the durable store: every save is appended to a
//! line-oriented log that is replayed into an in-memory index when the store
//! is opened. [`InMemoryRepository`] offers the same contract without
//! durability.

pub mod log;
pub mod memory;
pub mod record;

pub use log::{LinkLog, LogOptions, LogRepository, SyncMode};
pub use memory::InMemoryRepository;
pub use record::{LogRecord, PutRecord};
pub use tunnel_core::repository::{LinkRepository, Result};
