use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewLinkRequest {
    pub url: String,
    /// Custom code; an empty string is treated as absent.
    #[serde(default)]
    pub custom: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub ttl: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewLinkResponse {
    pub code: String,
    pub short: String,
}
