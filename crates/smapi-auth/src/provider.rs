//! Cached, single-flight access token provider
//!
//! One `TokenProvider` owns the token cache for one credentials + grant pair.
//! The read path takes only a shared `RwLock` read. The refresh transition is
//! serialized by a separate `Mutex`, and every completed exchange bumps a
//! generation counter: a caller that queued behind an in-flight exchange sees
//! the generation move and returns that exchange's outcome (token or error)
//! instead of starting another one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use transport::Transport;

use crate::constants::{DEFAULT_REFRESH_SKEW_SECS, TOKEN_ENDPOINT};
use crate::credentials::Credentials;
use crate::error::Result;
use crate::token::{self, AccessToken};

/// Outcome of the most recent exchange plus the number of exchanges so far.
#[derive(Default)]
struct CacheState {
    generation: u64,
    outcome: Option<Result<AccessToken>>,
}

/// Cached token state and the guard for the refresh transition.
#[derive(Default)]
struct TokenCacheEntry {
    state: RwLock<CacheState>,
    refresh: Mutex<()>,
}

pub struct TokenProvider {
    credentials: Credentials,
    endpoint: String,
    skew: Duration,
    transport: Arc<dyn Transport>,
    cache: TokenCacheEntry,
}

impl TokenProvider {
    /// Create a provider for the LWA token endpoint with the default skew.
    ///
    /// Fails if the credentials are incomplete; nothing is fetched until the
    /// first `access_token()` call.
    pub fn new(credentials: Credentials, transport: Arc<dyn Transport>) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            credentials,
            endpoint: TOKEN_ENDPOINT.to_string(),
            skew: Duration::from_secs(DEFAULT_REFRESH_SKEW_SECS),
            transport,
            cache: TokenCacheEntry::default(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Return a token that is usable for at least the skew, refreshing if needed.
    ///
    /// Concurrent callers that find the cache empty or stale trigger a single
    /// exchange and all receive its result. A failed exchange is returned to
    /// everyone who waited on it; the next caller after that tries again.
    pub async fn access_token(&self) -> Result<AccessToken> {
        let observed = {
            let state = self.cache.state.read().await;
            if let Some(Ok(token)) = &state.outcome {
                if token.is_usable_at(Instant::now(), self.skew) {
                    return Ok(token.clone());
                }
            }
            state.generation
        };

        let _refresh = self.cache.refresh.lock().await;

        {
            let state = self.cache.state.read().await;
            if state.generation != observed {
                if let Some(outcome) = &state.outcome {
                    debug!(
                        client_id = self.credentials.client_id(),
                        "joined completed refresh"
                    );
                    return outcome.clone();
                }
            }
        }

        debug!(
            client_id = self.credentials.client_id(),
            generation = observed,
            "cached token absent or expiring, refreshing"
        );
        let outcome =
            token::exchange(self.transport.as_ref(), &self.endpoint, &self.credentials).await;

        match &outcome {
            Ok(_) => {
                metrics::counter!("smapi_token_refresh_total", "outcome" => "success").increment(1);
                info!(client_id = self.credentials.client_id(), "access token refreshed");
            }
            Err(e) => {
                metrics::counter!("smapi_token_refresh_total", "outcome" => "failure").increment(1);
                warn!(client_id = self.credentials.client_id(), error = %e, "access token refresh failed");
            }
        }

        let mut state = self.cache.state.write().await;
        state.generation += 1;
        state.outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use transport::{HttpResponse, MockTransport};

    /// Token endpoint that issues `Atza|<n>` on the n-th call.
    fn counting_endpoint(expires_in: u64) -> MockTransport {
        let issued = AtomicUsize::new(0);
        MockTransport::new(move |_| {
            let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(HttpResponse::json(
                200,
                format!(r#"{{"access_token":"Atza|{n}","expires_in":{expires_in}}}"#),
            ))
        })
    }

    fn provider(transport: Arc<MockTransport>) -> TokenProvider {
        TokenProvider::new(
            Credentials::refresh_token("amzn1.application-oa2-client.abc", "s3cr3t", "Atzr|rt"),
            transport,
        )
        .unwrap()
    }

    fn bearer(token: &AccessToken) -> String {
        token
            .authorization_header()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn rejects_incomplete_credentials() {
        let transport = Arc::new(counting_endpoint(3600));
        let result = TokenProvider::new(Credentials::refresh_token("id", "secret", ""), transport);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn sequential_calls_reuse_cached_token() {
        let transport = Arc::new(counting_endpoint(3600));
        let provider = provider(transport.clone());

        for _ in 0..10 {
            let token = provider.access_token().await.unwrap();
            assert_eq!(bearer(&token), "Bearer Atza|1");
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_once_skew_window_is_reached() {
        let transport = Arc::new(counting_endpoint(3600));
        let provider = provider(transport.clone());

        assert_eq!(bearer(&provider.access_token().await.unwrap()), "Bearer Atza|1");

        tokio::time::advance(Duration::from_secs(3500)).await;
        assert_eq!(bearer(&provider.access_token().await.unwrap()), "Bearer Atza|1");
        assert_eq!(transport.calls(), 1);

        // 3550s elapsed: within 60s of expiry, so no longer handed out
        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(bearer(&provider.access_token().await.unwrap()), "Bearer Atza|2");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_skew_and_endpoint_are_used() {
        let transport = Arc::new(counting_endpoint(100));
        let provider = provider(transport.clone())
            .with_skew(Duration::from_secs(10))
            .with_endpoint("http://127.0.0.1:9001/auth/o2/token");

        provider.access_token().await.unwrap();
        tokio::time::advance(Duration::from_secs(85)).await;
        provider.access_token().await.unwrap();
        assert_eq!(transport.calls(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        provider.access_token().await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(
            transport.requests()[0].url,
            "http://127.0.0.1:9001/auth/o2/token"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn token_shorter_lived_than_skew_is_still_reused() {
        let transport = Arc::new(counting_endpoint(30));
        let provider = provider(transport.clone());

        for _ in 0..5 {
            let token = provider.access_token().await.unwrap();
            assert!(token.is_usable_at(Instant::now(), provider.skew));
            assert_eq!(bearer(&token), "Bearer Atza|1");
        }
        assert_eq!(transport.calls(), 1);

        // Skew is capped at half the 30s lifetime
        tokio::time::advance(Duration::from_secs(14)).await;
        assert_eq!(bearer(&provider.access_token().await.unwrap()), "Bearer Atza|1");
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(bearer(&provider.access_token().await.unwrap()), "Bearer Atza|2");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_exchange() {
        let transport =
            Arc::new(counting_endpoint(3600).with_latency(Duration::from_millis(100)));
        let provider = Arc::new(provider(transport.clone()));

        let mut handles = vec![];
        for _ in 0..16 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move {
                provider.access_token().await.map(|t| bearer(&t))
            }));
        }

        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), "Bearer Atza|1");
        }
        assert_eq!(transport.calls(), 1, "token endpoint must be hit exactly once");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_failure() {
        let transport = Arc::new(
            MockTransport::new(|_| Ok(HttpResponse::new(429, "Rate exceeded")))
                .with_latency(Duration::from_millis(100)),
        );
        let provider = Arc::new(provider(transport.clone()));

        let mut handles = vec![];
        for _ in 0..8 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move { provider.access_token().await }));
        }

        for h in handles {
            let err = h.await.unwrap().unwrap_err();
            assert!(matches!(err, Error::RateLimited { status: 429, .. }), "got: {err}");
        }
        assert_eq!(transport.calls(), 1);

        // The failure is not cached for later callers
        assert!(provider.access_token().await.is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_after_expiry_refresh_once() {
        let transport =
            Arc::new(counting_endpoint(3600).with_latency(Duration::from_millis(100)));
        let provider = Arc::new(provider(transport.clone()));
        provider.access_token().await.unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;

        let mut handles = vec![];
        for _ in 0..8 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move {
                provider.access_token().await.map(|t| bearer(&t))
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), "Bearer Atza|2");
        }
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn refresh_outcomes_are_counted() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let transport = Arc::new(counting_endpoint(3600));
        provider(transport).access_token().await.unwrap();

        let failing = Arc::new(MockTransport::new(|_| Ok(HttpResponse::new(401, "denied"))));
        assert!(provider(failing).access_token().await.is_err());

        let output = handle.render();
        assert!(output.contains("smapi_token_refresh_total"));
        assert!(output.contains("outcome=\"success\""));
        assert!(output.contains("outcome=\"failure\""));
    }
}
