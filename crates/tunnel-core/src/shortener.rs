use crate::repository::LinkInfo;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    #[builder(setter(into))]
    pub url: String,
    /// Optional custom code; a generated one is used otherwise.
    #[builder(default, setter(strip_option))]
    pub custom: Option<ShortCode>,
    /// Lifetime of the link in seconds. Must be positive when given.
    #[builder(default, setter(strip_option))]
    pub ttl_seconds: Option<i64>,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns its short code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Resolves a short code to its target URL.
    /// Returns `None` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Returns the stored metadata for a short code, including expired ones.
    async fn inspect(&self, code: &ShortCode) -> Result<Option<LinkInfo>>;
}
