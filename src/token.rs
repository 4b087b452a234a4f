use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use time::{Duration, OffsetDateTime};

use crate::intent::{GatewayError, Provider};

/// Tokens are refreshed this long before they actually expire.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(30);

/// Provider access token. Never leaves the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderToken {
    access_token: String,
    expires_at: OffsetDateTime,
}

impl ProviderToken {
    pub fn new(access_token: String, expires_at: OffsetDateTime) -> Self {
        Self {
            access_token,
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub fn is_usable_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

impl std::fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Single credential exchange against a provider's token endpoint.
pub trait TokenExchange: Send + Sync {
    /// `now` is the instant the token lifetime is counted from.
    fn exchange(
        &self,
        now: OffsetDateTime,
    ) -> impl Future<Output = Result<ProviderToken, GatewayError>> + Send;
}

/// Exchange of providers that work without a token.
#[derive(Debug)]
pub enum NoExchange {}

impl TokenExchange for NoExchange {
    async fn exchange(&self, _now: OffsetDateTime) -> Result<ProviderToken, GatewayError> {
        match *self {}
    }
}

/// Process-wide cache holding one token per provider.
///
/// Concurrent misses may each run an exchange; the last one to finish wins.
/// Entries are always replaced whole.
pub struct TokenCache {
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    entries: Mutex<HashMap<Provider, ProviderToken>>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("safety_margin", &self.safety_margin)
            .field("entries", &self.lock().len())
            .finish_non_exhaustive()
    }
}

impl TokenCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Provider, ProviderToken>> {
        // entries are replaced whole, a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached token while it is usable, otherwise runs exactly one exchange.
    pub async fn get_token(
        &self,
        provider: Provider,
        exchange: &impl TokenExchange,
    ) -> Result<ProviderToken, GatewayError> {
        let now = self.clock.now();
        {
            let mut entries = self.lock();
            if let Some(token) = entries
                .get(&provider)
                .filter(|token| token.is_usable_at(now, self.safety_margin))
            {
                tracing::trace!(?provider, "Using cached access token");
                return Ok(token.clone());
            }
            if let Some(stale) = entries.remove(&provider) {
                tracing::debug!(?provider, expires_at = %stale.expires_at, "Discarded expiring access token");
            }
        }

        let token = exchange.exchange(now).await?;
        tracing::debug!(?provider, expires_at = %token.expires_at, "Obtained access token");
        self.lock().insert(provider, token.clone());
        Ok(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    pub struct ManualClock(Mutex<OffsetDateTime>);

    impl ManualClock {
        pub fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(
                OffsetDateTime::UNIX_EPOCH + Duration::days(20_000),
            )))
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> OffsetDateTime {
            *self.0.lock().unwrap()
        }
    }

    /// Hands out `token-1`, `token-2`, ... valid for `ttl`.
    struct CountingExchange {
        calls: AtomicUsize,
        ttl: Duration,
    }

    impl CountingExchange {
        fn new(ttl: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                ttl,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenExchange for CountingExchange {
        async fn exchange(&self, now: OffsetDateTime) -> Result<ProviderToken, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // suspend like a real network call would
            tokio::task::yield_now().await;
            Ok(ProviderToken::new(format!("token-{n}"), now + self.ttl))
        }
    }

    struct RejectingExchange;

    impl TokenExchange for RejectingExchange {
        async fn exchange(&self, _now: OffsetDateTime) -> Result<ProviderToken, GatewayError> {
            Err(GatewayError::Auth {
                message: "invalid_client".into(),
                payload: None,
            })
        }
    }

    #[tokio::test]
    async fn reuses_token_within_lifetime() {
        let clock = ManualClock::new();
        let cache = TokenCache::new(clock.clone());
        let exchange = CountingExchange::new(Duration::hours(1));

        let first = cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        clock.advance(Duration::minutes(20));
        let second = cache.get_token(Provider::Paypal, &exchange).await.unwrap();

        assert_eq!(exchange.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second.access_token(), "token-1");
    }

    #[tokio::test]
    async fn refetches_expired_token() {
        let clock = ManualClock::new();
        let cache = TokenCache::new(clock.clone());
        let exchange = CountingExchange::new(Duration::hours(1));

        let old = cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        clock.advance(Duration::hours(2));
        let fresh = cache.get_token(Provider::Paypal, &exchange).await.unwrap();

        assert_eq!(exchange.calls(), 2);
        assert_eq!(fresh.access_token(), "token-2");
        assert!(fresh.expires_at() > old.expires_at());
        assert_eq!(
            cache.get_token(Provider::Paypal, &exchange).await.unwrap(),
            fresh
        );
        assert_eq!(exchange.calls(), 2);
    }

    #[tokio::test]
    async fn refreshes_inside_safety_margin() {
        let clock = ManualClock::new();
        let cache = TokenCache::new(clock.clone());
        let exchange = CountingExchange::new(Duration::minutes(5));

        cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        clock.advance(Duration::minutes(5) - Duration::seconds(10));
        let token = cache.get_token(Provider::Paypal, &exchange).await.unwrap();

        assert_eq!(exchange.calls(), 2);
        assert_eq!(token.access_token(), "token-2");
    }

    #[tokio::test]
    async fn failed_exchange_leaves_no_token() {
        let clock = ManualClock::new();
        let cache = TokenCache::new(clock.clone());
        let exchange = CountingExchange::new(Duration::minutes(1));

        cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        clock.advance(Duration::minutes(2));
        let err = cache
            .get_token(Provider::Paypal, &RejectingExchange)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Auth { .. }));
        assert!(cache.lock().is_empty());
    }

    #[tokio::test]
    async fn concurrent_misses_keep_last_written_token() {
        let cache = TokenCache::new(ManualClock::new());
        let exchange = CountingExchange::new(Duration::hours(1));

        let (first, second) = tokio::join!(
            cache.get_token(Provider::Paypal, &exchange),
            cache.get_token(Provider::Paypal, &exchange),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(exchange.calls(), 2);
        assert_eq!(first.access_token(), "token-1");
        assert_eq!(second.access_token(), "token-2");

        let cached = cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        assert_eq!(cached, second);
        assert_eq!(exchange.calls(), 2);
        assert_eq!(cache.lock().len(), 1);
    }

    #[tokio::test]
    async fn tokens_are_kept_per_provider() {
        let cache = TokenCache::new(ManualClock::new());
        let exchange = CountingExchange::new(Duration::hours(1));

        cache.get_token(Provider::Paypal, &exchange).await.unwrap();
        let upi = cache.get_token(Provider::Upi, &exchange).await.unwrap();

        assert_eq!(exchange.calls(), 2);
        assert_eq!(upi.access_token(), "token-2");
    }

    #[test]
    fn debug_hides_access_token() {
        let token = ProviderToken::new("A21AAF-secret".into(), OffsetDateTime::UNIX_EPOCH);
        assert!(!format!("{token:?}").contains("A21AAF"));
    }
}
