use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    #[error("An API key and secret are needed for {0}")]
    MissingCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Retryable API error: {0}")]
    RetryableApiError(String),

    #[error("Nonce out of order (server minimum {minimum}): {message}")]
    NonceOutOfOrder { minimum: u64, message: String },

    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ExchangeError>,
    },

    #[error("Nonce space exhausted at {current}")]
    NonceExhausted { current: u64 },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid json response returned: {0}")]
    ProtocolError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ExchangeError {
    /// Whether the retry policy should try the whole request again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::RetryableApiError(_) | Self::NonceOutOfOrder { .. }
        )
    }

    /// Errors raised before any quota or network I/O was spent.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand(_) | Self::MissingCredentials(_) | Self::ConfigError(_)
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ExchangeError::NetworkError("reset".into()).is_transient());
        assert!(ExchangeError::RetryableApiError("Please try again.".into()).is_transient());
        assert!(ExchangeError::NonceOutOfOrder {
            minimum: 10,
            message: String::new()
        }
        .is_transient());

        assert!(!ExchangeError::ApiError("Invalid order.".into()).is_transient());
        assert!(!ExchangeError::ProtocolError("<html>".into()).is_transient());
        assert!(!ExchangeError::UnknownCommand("nope".into()).is_transient());
    }

    #[test]
    fn test_exhausted_is_terminal_and_keeps_source() {
        let err = ExchangeError::RetriesExhausted {
            attempts: 4,
            source: Box::new(ExchangeError::NetworkError("timed out".into())),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("timed out"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_nonce_exhaustion_is_terminal() {
        let err = ExchangeError::NonceExhausted { current: u64::MAX };
        assert!(!err.is_transient());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_reqwest_error_maps_to_network_error() {
        let reqwest_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = ExchangeError::from(reqwest_err);
        assert!(matches!(err, ExchangeError::NetworkError(_)));
    }
}
