//! HTTP gateway for the Tunnel URL shortener.
//!
//! Exposes link creation, redirects and link inspection over axum. The
//! gateway holds no state of its own beyond an [`AppState`] handle to a
//! [`Shortener`](tunnel_core::Shortener).

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
