mod link;

pub use link::{NewLinkRequest, NewLinkResponse};
pub use tunnel_core::LinkInfo;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
    /// Server time in unix seconds.
    pub ts: i64,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
