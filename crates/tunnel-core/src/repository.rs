use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A code to URL binding as held by a repository.
///
/// Timestamps are kept at whole-second precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub code: ShortCode,
    pub url: String,
    pub created_at: Timestamp,
    /// When the binding stops resolving, if ever.
    pub expires_at: Option<Timestamp>,
}

impl Binding {
    /// Builds a binding created at `now`, expiring `ttl_seconds` later when given.
    pub fn create(
        code: ShortCode,
        url: impl Into<String>,
        now: Timestamp,
        ttl_seconds: Option<NonZeroU64>,
    ) -> Result<Self> {
        let created_at = Timestamp::from_second(now.as_second())
            .map_err(|e| StorageError::InvalidData(format!("invalid creation time: {e}")))?;

        let expires_at = ttl_seconds
            .map(|ttl| {
                i64::try_from(ttl.get())
                    .ok()
                    .and_then(|ttl| created_at.as_second().checked_add(ttl))
                    .and_then(|second| Timestamp::from_second(second).ok())
                    .ok_or_else(|| {
                        StorageError::InvalidData(format!(
                            "ttl of {ttl} seconds is out of the timestamp range"
                        ))
                    })
            })
            .transpose()?;

        Ok(Self {
            code,
            url: url.into(),
            created_at,
            expires_at,
        })
    }

    /// A binding is expired once `now` is strictly past its expiry.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// The diagnostic view of this binding as of `now`.
    pub fn info_at(&self, now: Timestamp) -> LinkInfo {
        LinkInfo {
            code: self.code.clone(),
            url: self.url.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            expired: self.is_expired_at(now),
        }
    }
}

/// Metadata returned by [`LinkRepository::peek`].
///
/// Unlike a fetch, a peek reports bindings that have already expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub code: ShortCode,
    pub url: String,
    #[serde(with = "jiff::fmt::serde::timestamp::second::required")]
    pub created_at: Timestamp,
    #[serde(with = "jiff::fmt::serde::timestamp::second::optional")]
    pub expires_at: Option<Timestamp>,
    pub expired: bool,
}

/// A store of code to URL bindings.
///
/// `save` is an unconditional upsert: callers that care about uniqueness
/// must check with `fetch` first. Absence is a normal `Ok(None)`.
#[async_trait]
pub trait LinkRepository: Send + Sync + 'static {
    /// Records `code -> url`, replacing any earlier binding for `code`.
    async fn save(&self, code: &ShortCode, url: &str, ttl_seconds: Option<NonZeroU64>)
        -> Result<()>;

    /// Returns the URL for `code`, or `None` if it is unknown or expired.
    async fn fetch(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Returns the stored metadata for `code`, expired or not.
    async fn peek(&self, code: &ShortCode) -> Result<Option<LinkInfo>>;
}
