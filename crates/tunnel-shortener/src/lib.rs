//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which picks or validates a
//! short code and records it in a [`LinkRepository`](tunnel_core::LinkRepository).
//! Core types are re-exported from `tunnel_core`.

pub mod service;

pub use service::ShortenerService;
pub use tunnel_core::{ShortenParams, Shortener, ShortenerError};
