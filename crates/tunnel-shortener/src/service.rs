use async_trait::async_trait;
use std::num::NonZeroU64;
use std::sync::Arc;
use tracing::{debug, info, trace};
use tunnel_core::{LinkInfo, LinkRepository, ShortCode, ShortenParams, Shortener, ShortenerError};
use tunnel_generator::Generator;

/// How many times a taken generated code is replaced before giving up.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `LinkRepository` and a `Generator` to handle:
/// - Short code selection (custom, or generated with collision retries)
/// - TTL and URL validation
///
/// The repository upserts unconditionally, so uniqueness is checked here
/// with a `fetch` before every save. An expired code counts as free.
#[derive(Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    max_retries: usize,
}

impl<R: LinkRepository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates that the URL has a valid format (has a scheme and host).
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };

        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        }

        Ok(())
    }

    fn validate_ttl(ttl_seconds: Option<i64>) -> Result<Option<NonZeroU64>, ShortenerError> {
        ttl_seconds
            .map(|ttl| {
                u64::try_from(ttl)
                    .ok()
                    .and_then(NonZeroU64::new)
                    .ok_or(ShortenerError::InvalidTtl(ttl))
            })
            .transpose()
    }

    /// Generates codes until one is not currently resolvable.
    async fn free_code(&self) -> Result<ShortCode, ShortenerError> {
        let mut code: ShortCode = self.generator.generate().into();
        let mut retries = 0;

        while self.repository.fetch(&code).await?.is_some() {
            if retries == self.max_retries {
                return Err(ShortenerError::CodeSpaceExhausted {
                    attempts: retries + 1,
                });
            }
            debug!(code = %code, "generated code is taken; retrying");
            retries += 1;
            code = self.generator.generate().into();
        }

        Ok(code)
    }
}

#[async_trait]
impl<R: LinkRepository, G: Generator> Shortener for ShortenerService<R, G> {
    /// The custom-code conflict check and the save are separate repository
    /// calls, so two concurrent requests for the same free custom code can
    /// both succeed and the later save shadows the earlier one.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode, ShortenerError> {
        let ttl_seconds = Self::validate_ttl(params.ttl_seconds)?;
        Self::validate_url(&params.url)?;

        let code = match params.custom {
            Some(code) => {
                if self.repository.fetch(&code).await?.is_some() {
                    return Err(ShortenerError::AliasConflict(code.to_string()));
                }
                code
            }
            None => self.free_code().await?,
        };

        self.repository
            .save(&code, &params.url, ttl_seconds)
            .await?;

        info!(code = %code, url = %params.url, "link created");
        Ok(code)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError> {
        trace!(code = %code, "resolving short code");
        Ok(self.repository.fetch(code).await?)
    }

    async fn inspect(&self, code: &ShortCode) -> Result<Option<LinkInfo>, ShortenerError> {
        Ok(self.repository.peek(code).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use tunnel_core::ManualClock;
    use tunnel_generator::SeqGenerator;
    use tunnel_storage::InMemoryRepository;

    /// Always hands out the same code.
    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        type Output = ShortCode;

        fn generate(&self) -> ShortCode {
            ShortCode::new_unchecked(self.0)
        }
    }

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(InMemoryRepository::new(), SeqGenerator::with_prefix("wh"))
    }

    #[tokio::test]
    async fn shorten_with_generated_code() {
        let service = test_service();

        let params = ShortenParams::builder().url("https://example.com").build();
        let code = service.shorten(params).await.unwrap();
        assert_eq!(code.as_str(), "wh000000");

        let url = service.resolve(&code).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn shorten_with_custom_code() {
        let service = test_service();

        let params = ShortenParams::builder()
            .url("https://example.com")
            .custom(ShortCode::new("myalias").unwrap())
            .build();

        let code = service.shorten(params).await.unwrap();
        assert_eq!(code.as_str(), "myalias");
    }

    #[tokio::test]
    async fn shorten_with_taken_custom_code_fails() {
        let service = test_service();
        let custom = ShortCode::new("myalias").unwrap();

        let first = ShortenParams::builder()
            .url("https://example1.com")
            .custom(custom.clone())
            .build();
        let second = ShortenParams::builder()
            .url("https://example2.com")
            .custom(custom.clone())
            .build();

        service.shorten(first).await.unwrap();
        let err = service.shorten(second).await.unwrap_err();
        assert!(matches!(err, ShortenerError::AliasConflict(_)));

        // the original binding is untouched
        let url = service.resolve(&custom).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://example1.com"));
    }

    #[tokio::test]
    async fn expired_custom_code_can_be_reused() {
        let clock = ManualClock::new(Timestamp::from_second(1_000).unwrap());
        let service = ShortenerService::new(
            InMemoryRepository::with_clock(clock.clone()),
            SeqGenerator::with_prefix("wh"),
        );
        let custom = ShortCode::new("promo").unwrap();

        let first = ShortenParams::builder()
            .url("https://old.com")
            .custom(custom.clone())
            .ttl_seconds(10)
            .build();
        service.shorten(first).await.unwrap();

        clock.advance(SignedDuration::from_secs(11));

        let second = ShortenParams::builder()
            .url("https://new.com")
            .custom(custom.clone())
            .build();
        service.shorten(second).await.unwrap();

        let info = service.inspect(&custom).await.unwrap().unwrap();
        assert_eq!(info.url, "https://new.com");
        assert!(!info.expired);
    }

    #[tokio::test]
    async fn shorten_retries_taken_generated_codes() {
        let repo = InMemoryRepository::new();
        let taken = ShortCode::new_unchecked("wh000000");
        repo.save(&taken, "https://taken.com", None).await.unwrap();

        let service = ShortenerService::new(repo, SeqGenerator::with_prefix("wh"));
        let params = ShortenParams::builder().url("https://example.com").build();

        let code = service.shorten(params).await.unwrap();
        assert_eq!(code.as_str(), "wh000001");
    }

    #[tokio::test]
    async fn shorten_gives_up_after_max_retries() {
        let repo = InMemoryRepository::new();
        let taken = ShortCode::new_unchecked("same");
        repo.save(&taken, "https://taken.com", None).await.unwrap();

        let service = ShortenerService::new(repo, FixedGenerator("same"));
        let params = ShortenParams::builder().url("https://example.com").build();

        let err = service.shorten(params).await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::CodeSpaceExhausted { attempts: 6 }
        ));

        // nothing was overwritten
        let url = service.resolve(&taken).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://taken.com"));
    }

    #[tokio::test]
    async fn shorten_with_invalid_url_fails() {
        let service = test_service();

        for url in [
            "",
            "not-a-valid-url",
            "ftp://example.com",
            "https://",
            "https:///path",
            "https://exa mple.com",
            "https://a.com/\u{1}",
            "https://a.com/\u{7f}",
        ] {
            let params = ShortenParams::builder().url(url).build();
            let err = service.shorten(params).await.unwrap_err();
            assert!(
                matches!(err, ShortenerError::InvalidUrl(_)),
                "expected invalid url for {url:?}"
            );
        }
    }

    #[tokio::test]
    async fn shorten_with_non_positive_ttl_fails() {
        let service = test_service();

        for ttl in [0, -5] {
            let params = ShortenParams::builder()
                .url("https://example.com")
                .ttl_seconds(ttl)
                .build();
            let err = service.shorten(params).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidTtl(t) if t == ttl));
        }
    }

    #[tokio::test]
    async fn shorten_with_ttl_expires() {
        let clock = ManualClock::new(Timestamp::from_second(1_000).unwrap());
        let service = ShortenerService::new(
            InMemoryRepository::with_clock(clock.clone()),
            SeqGenerator::with_prefix("wh"),
        );

        let params = ShortenParams::builder()
            .url("https://a.com")
            .ttl_seconds(1)
            .build();
        let code = service.shorten(params).await.unwrap();
        assert!(service.resolve(&code).await.unwrap().is_some());

        clock.advance(SignedDuration::from_secs(2));
        assert!(service.resolve(&code).await.unwrap().is_none());

        let info = service.inspect(&code).await.unwrap().unwrap();
        assert!(info.expired);
        assert_eq!(info.url, "https://a.com");
    }

    #[tokio::test]
    async fn resolve_nonexistent_code() {
        let service = test_service();

        let code = ShortCode::new("nothere").unwrap();
        assert!(service.resolve(&code).await.unwrap().is_none());
        assert!(service.inspect(&code).await.unwrap().is_none());
    }
}
