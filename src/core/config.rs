use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://poloniex.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_DELAYS_SECS: [u64; 4] = [0, 2, 5, 30];
pub const DEFAULT_RATE_LIMIT_CALLS: u32 = 6;
pub const DEFAULT_RATE_LIMIT_PERIOD_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub retry_delays_secs: Vec<u64>,
    pub rate_limit_calls: u32,
    pub rate_limit_period_ms: u64,
    pub start_nonce: Option<u64>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 8)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.serialize_field("retry_delays_secs", &self.retry_delays_secs)?;
        state.serialize_field("rate_limit_calls", &self.rate_limit_calls)?;
        state.serialize_field("rate_limit_period_ms", &self.rate_limit_period_ms)?;
        state.serialize_field("start_nonce", &self.start_nonce)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        fn default_timeout() -> u64 {
            DEFAULT_TIMEOUT_SECONDS
        }
        fn default_retries() -> Vec<u64> {
            DEFAULT_RETRY_DELAYS_SECS.to_vec()
        }
        fn default_calls() -> u32 {
            DEFAULT_RATE_LIMIT_CALLS
        }
        fn default_period() -> u64 {
            DEFAULT_RATE_LIMIT_PERIOD_MS
        }

        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            #[serde(default)]
            api_key: String,
            #[serde(default)]
            secret_key: String,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default = "default_timeout")]
            timeout_seconds: u64,
            #[serde(default = "default_retries")]
            retry_delays_secs: Vec<u64>,
            #[serde(default = "default_calls")]
            rate_limit_calls: u32,
            #[serde(default = "default_period")]
            rate_limit_period_ms: u64,
            #[serde(default)]
            start_nonce: Option<u64>,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            base_url: helper.base_url,
            timeout_seconds: helper.timeout_seconds,
            retry_delays_secs: helper.retry_delays_secs,
            rate_limit_calls: helper.rate_limit_calls,
            rate_limit_period_ms: helper.rate_limit_period_ms,
            start_nonce: helper.start_nonce,
        })
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self::read_only()
    }
}

impl ExchangeConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_delays_secs: DEFAULT_RETRY_DELAYS_SECS.to_vec(),
            rate_limit_calls: DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period_ms: DEFAULT_RATE_LIMIT_PERIOD_MS,
            start_nonce: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `POLONIEX_API_KEY`)
    /// - `{PREFIX}_SECRET_KEY` (e.g., `POLONIEX_SECRET_KEY`)
    /// - `{PREFIX}_BASE_URL` (optional)
    /// - `{PREFIX}_TIMEOUT` (optional, seconds)
    /// - `{PREFIX}_RETRY_DELAYS` (optional, comma separated seconds, e.g. `0,2,5,30`)
    /// - `{PREFIX}_RATE_LIMIT` (optional, calls per second)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let mut config = Self::new(api_key, secret_key);
        config.base_url = env::var(format!("{}_BASE_URL", prefix)).ok();

        if let Ok(raw) = env::var(format!("{}_TIMEOUT", prefix)) {
            config.timeout_seconds = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!("invalid timeout '{}'", raw))
            })?;
        }

        if let Ok(raw) = env::var(format!("{}_RETRY_DELAYS", prefix)) {
            config.retry_delays_secs = parse_delays(&raw)?;
        }

        if let Ok(raw) = env::var(format!("{}_RATE_LIMIT", prefix)) {
            config.rate_limit_calls = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!("invalid rate limit '{}'", raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // no .env file, fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Configuration for public endpoints only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Check if this configuration has valid credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    /// Reject settings that would make the client unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_calls == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "rate limit must allow at least one call per window".to_string(),
            ));
        }
        if self.rate_limit_period_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "rate limit window must be non-zero".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the per-attempt request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the retry delay sequence, in seconds
    #[must_use]
    pub fn retry_delays(mut self, delays: Vec<u64>) -> Self {
        self.retry_delays_secs = delays;
        self
    }

    /// Set the call quota per window
    #[must_use]
    pub const fn rate_limit(mut self, calls: u32, period_ms: u64) -> Self {
        self.rate_limit_calls = calls;
        self.rate_limit_period_ms = period_ms;
        self
    }

    /// Start the nonce sequence from an explicit value
    #[must_use]
    pub const fn start_nonce(mut self, nonce: u64) -> Self {
        self.start_nonce = Some(nonce);
        self
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn rate_limit_period(&self) -> Duration {
        Duration::from_millis(self.rate_limit_period_ms)
    }

    pub fn retry_delay_durations(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect()
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

fn parse_delays(raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                ConfigError::InvalidConfiguration(format!("invalid retry delay '{}'", part))
            })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_exchange_quota() {
        let config = ExchangeConfig::read_only();
        assert!(!config.has_credentials());
        assert_eq!(config.rate_limit_calls, 6);
        assert_eq!(config.rate_limit_period(), Duration::from_secs(1));
        assert_eq!(config.retry_delays_secs, vec![0, 2, 5, 30]);
        assert_eq!(config.resolved_base_url(), DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_need_key_and_secret() {
        assert!(ExchangeConfig::new("key".into(), "secret".into()).has_credentials());
        assert!(!ExchangeConfig::new("key".into(), String::new()).has_credentials());
        assert!(!ExchangeConfig::new(String::new(), "secret".into()).has_credentials());
    }

    #[test]
    fn test_serialization_redacts_secrets() {
        let config = ExchangeConfig::new("my-key".into(), "my-secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("my-key"));
        assert!(!json.contains("my-secret"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ExchangeConfig =
            serde_json::from_str(r#"{"api_key":"k","secret_key":"s","start_nonce":42}"#).unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.start_nonce, Some(42));
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.retry_delays_secs, DEFAULT_RETRY_DELAYS_SECS.to_vec());
    }

    #[test]
    fn test_validate_rejects_zero_quota() {
        let config = ExchangeConfig::read_only().rate_limit(0, 1_000);
        assert!(config.validate().is_err());
        let config = ExchangeConfig::read_only().rate_limit(6, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_delays() {
        assert_eq!(parse_delays("0, 2,5 ,30").unwrap(), vec![0, 2, 5, 30]);
        assert!(parse_delays("").unwrap().is_empty());
        assert!(parse_delays("1,x").is_err());
    }
}
