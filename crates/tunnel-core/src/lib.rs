//! Core types and traits for the Tunnel URL shortener.
//!
//! This crate provides the types shared by the link store, the shortener
//! service and the HTTP gateway.

pub mod base62;
pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{Binding, LinkInfo, LinkRepository};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
