use async_trait::async_trait;
use dashmap::DashMap;
use std::num::NonZeroU64;
use tunnel_core::repository::{LinkRepository, Result};
use tunnel_core::{Binding, Clock, LinkInfo, ShortCode, SystemClock};

/// In-memory implementation of [`LinkRepository`] using DashMap.
///
/// Same upsert and expiry semantics as [`LogRepository`](crate::LogRepository),
/// with nothing written to disk.
#[derive(Debug)]
pub struct InMemoryRepository<C: Clock = SystemClock> {
    storage: DashMap<String, Binding>,
    clock: C,
}

impl InMemoryRepository<SystemClock> {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> InMemoryRepository<C> {
    /// Creates a new in-memory repository reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }
}

impl Default for InMemoryRepository<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Clock> LinkRepository for InMemoryRepository<C> {
    async fn save(
        &self,
        code: &ShortCode,
        url: &str,
        ttl_seconds: Option<NonZeroU64>,
    ) -> Result<()> {
        let binding = Binding::create(code.clone(), url, self.clock.now(), ttl_seconds)?;
        self.storage.insert(code.as_str().to_owned(), binding);
        Ok(())
    }

    async fn fetch(&self, code: &ShortCode) -> Result<Option<String>> {
        let Some(binding) = self.storage.get(code.as_str()) else {
            return Ok(None);
        };

        if binding.is_expired_at(self.clock.now()) {
            return Ok(None);
        }

        Ok(Some(binding.url.clone()))
    }

    async fn peek(&self, code: &ShortCode) -> Result<Option<LinkInfo>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|binding| binding.info_at(self.clock.now())))
    }
}
