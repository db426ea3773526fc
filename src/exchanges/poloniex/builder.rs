use crate::core::config::{ConfigError, ExchangeConfig};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    HmacSha512Signer, HttpClient, NonceSequencer, RateGate, ReqwestRest, RestClientBuilder,
    RestClientConfig, RetryPolicy, Signer,
};
use crate::exchanges::poloniex::commands::CommandRegistry;
use crate::exchanges::poloniex::dispatcher::RequestDispatcher;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Which command table a dispatcher serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Market data only, no credentials
    Public,
    /// Trading API only, credentials required
    Private,
    /// Both tables, signing when credentials are present
    Combined,
}

/// Builder for Poloniex dispatchers
///
/// By default each built dispatcher gets its own [`RateGate`] and
/// [`NonceSequencer`]. Pass shared ones to make several dispatchers respect a
/// single quota and a single nonce sequence.
#[derive(Default)]
pub struct PoloniexBuilder {
    config: ExchangeConfig,
    rate_gate: Option<Arc<RateGate>>,
    nonces: Option<Arc<NonceSequencer>>,
}

impl PoloniexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exchange configuration
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set API credentials
    pub fn with_credentials(mut self, api_key: String, secret_key: String) -> Self {
        self.config.api_key = secrecy::Secret::new(api_key);
        self.config.secret_key = secrecy::Secret::new(secret_key);
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    /// Per-attempt request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.timeout_seconds = timeout_seconds;
        self
    }

    /// Delays between attempts, in seconds
    pub fn with_retry_delays(mut self, delays: Vec<u64>) -> Self {
        self.config.retry_delays_secs = delays;
        self
    }

    /// Quota for a gate created by this builder
    pub fn with_rate_limit(mut self, calls: u32, period_ms: u64) -> Self {
        self.config.rate_limit_calls = calls;
        self.config.rate_limit_period_ms = period_ms;
        self
    }

    pub fn with_start_nonce(mut self, nonce: u64) -> Self {
        self.config.start_nonce = Some(nonce);
        self
    }

    /// Use an existing gate instead of creating one
    pub fn with_rate_gate(mut self, rate_gate: Arc<RateGate>) -> Self {
        self.rate_gate = Some(rate_gate);
        self
    }

    /// Use an existing sequencer instead of creating one
    pub fn with_nonce_sequencer(mut self, nonces: Arc<NonceSequencer>) -> Self {
        self.nonces = Some(nonces);
        self
    }

    /// Market data client over reqwest
    pub fn build_public(self) -> Result<RequestDispatcher<ReqwestRest>, ExchangeError> {
        let http = self.default_http()?;
        self.build_with(ClientKind::Public, http)
    }

    /// Trading client over reqwest; fails without credentials
    pub fn build_private(self) -> Result<RequestDispatcher<ReqwestRest>, ExchangeError> {
        let http = self.default_http()?;
        self.build_with(ClientKind::Private, http)
    }

    /// Client for every command over reqwest
    pub fn build(self) -> Result<RequestDispatcher<ReqwestRest>, ExchangeError> {
        let http = self.default_http()?;
        self.build_with(ClientKind::Combined, http)
    }

    /// Build over any transport
    pub fn build_with<H: HttpClient>(
        self,
        kind: ClientKind,
        http: H,
    ) -> Result<RequestDispatcher<H>, ExchangeError> {
        self.config.validate()?;

        let has_credentials = self.config.has_credentials();
        if kind == ClientKind::Private && !has_credentials {
            return Err(ExchangeError::MissingCredentials("the trading API".to_string()));
        }

        let registry = match kind {
            ClientKind::Public => CommandRegistry::public(),
            ClientKind::Private => CommandRegistry::private(),
            ClientKind::Combined => CommandRegistry::combined(),
        };

        let signer: Option<Arc<dyn Signer>> = if has_credentials && registry.requires_auth() {
            Some(Arc::new(HmacSha512Signer::new(
                self.config.api_key().to_string(),
                self.config.secret_key().to_string(),
            )))
        } else {
            None
        };

        let rate_gate = match self.rate_gate {
            Some(gate) => gate,
            None => {
                let calls = NonZeroU32::new(self.config.rate_limit_calls).ok_or_else(|| {
                    ConfigError::InvalidConfiguration("rate limit must be non-zero".to_string())
                })?;
                Arc::new(RateGate::new(calls, self.config.rate_limit_period()))
            }
        };

        let nonces = self.nonces.unwrap_or_else(|| {
            Arc::new(
                self.config
                    .start_nonce
                    .map_or_else(NonceSequencer::from_clock, NonceSequencer::new),
            )
        });

        Ok(RequestDispatcher {
            http,
            registry,
            signer,
            rate_gate,
            nonces,
            retry: RetryPolicy::new(self.config.retry_delay_durations()),
            base_url: self.config.resolved_base_url().to_string(),
            timeout: self.config.request_timeout(),
        })
    }

    fn default_http(&self) -> Result<ReqwestRest, ExchangeError> {
        RestClientBuilder::new(
            RestClientConfig::new("poloniex".to_string()).with_timeout(self.config.timeout_seconds),
        )
        .build()
    }
}

/// Create a dispatcher for every command from a configuration
pub fn build_connector(config: ExchangeConfig) -> Result<RequestDispatcher<ReqwestRest>, ExchangeError> {
    PoloniexBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Access;
    use nonzero_ext::nonzero;
    use std::time::Duration;

    #[test]
    fn test_build_public_without_credentials() {
        let client = PoloniexBuilder::new().build_public().unwrap();
        assert!(!client.can_authenticate());
        assert_eq!(client.base_url(), "https://poloniex.com");
        assert!(client.registry().lookup("buy").is_err());
    }

    #[test]
    fn test_public_client_never_signs() {
        let client = PoloniexBuilder::new()
            .with_credentials("key".to_string(), "secret".to_string())
            .build_public()
            .unwrap();
        assert!(!client.can_authenticate());
    }

    #[test]
    fn test_build_private_requires_credentials() {
        let err = PoloniexBuilder::new().build_private().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_build_private_with_credentials() {
        let client = PoloniexBuilder::new()
            .with_credentials("key".to_string(), "secret".to_string())
            .build_private()
            .unwrap();
        assert!(client.can_authenticate());
        assert_eq!(client.registry().lookup("buy").unwrap().access, Access::Private);
    }

    #[test]
    fn test_combined_without_credentials_rejects_private_commands() {
        let client = PoloniexBuilder::new().build().unwrap();
        assert!(client.resolve("returnTicker").is_ok());
        assert!(matches!(
            client.resolve("returnBalances"),
            Err(ExchangeError::MissingCredentials(_))
        ));
        assert!(matches!(
            client.resolve("notACommand"),
            Err(ExchangeError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_shared_gate_and_sequencer() {
        let gate = Arc::new(RateGate::new(nonzero!(6u32), Duration::from_secs(1)));
        let nonces = Arc::new(NonceSequencer::new(1));

        let a = PoloniexBuilder::new()
            .with_rate_gate(Arc::clone(&gate))
            .with_nonce_sequencer(Arc::clone(&nonces))
            .build_public()
            .unwrap();
        let b = PoloniexBuilder::new()
            .with_credentials("key".to_string(), "secret".to_string())
            .with_rate_gate(a.rate_gate())
            .with_nonce_sequencer(a.nonce_sequencer())
            .build_private()
            .unwrap();

        assert!(Arc::ptr_eq(&a.rate_gate(), &gate));
        assert!(Arc::ptr_eq(&b.rate_gate(), &gate));
        assert!(Arc::ptr_eq(&b.nonce_sequencer(), &nonces));
    }

    #[test]
    fn test_builder_settings_flow_through() {
        let client = PoloniexBuilder::new()
            .with_base_url("http://localhost:8080".to_string())
            .with_retry_delays(vec![1, 1])
            .with_rate_limit(2, 500)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.retry_policy().max_attempts(), 3);
        assert_eq!(client.rate_gate().capacity(), 2);
        assert_eq!(client.rate_gate().period(), Duration::from_millis(500));
        assert!(!client.rate_gate().is_started());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let result = PoloniexBuilder::new().with_rate_limit(0, 1_000).build();
        assert!(matches!(result, Err(ExchangeError::ConfigError(_))));
    }
}
