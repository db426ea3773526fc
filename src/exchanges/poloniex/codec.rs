use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpResponse;
use serde_json::Value;
use tracing::error;

const NONCE_ERROR: &str = "Nonce must be greater";
const TRY_AGAIN: &str = "please try again";

/// Decode a response body and turn an `error` field into a typed error.
pub fn decode_response(response: &HttpResponse) -> Result<Value, ExchangeError> {
    if response.is_retryable_status() {
        return Err(ExchangeError::NetworkError(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }

    let value: Value = serde_json::from_str(&response.body).map_err(|e| {
        error!(status = response.status, body = %response.body, "undecodable response");
        ExchangeError::ProtocolError(e.to_string())
    })?;

    if let Some(reported) = value.get("error") {
        let message = match reported {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Err(classify_error(message));
    }

    if !(200..300).contains(&response.status) {
        return Err(ExchangeError::ApiError(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }

    Ok(value)
}

/// Map a server-reported error message onto the error taxonomy.
pub fn classify_error(message: String) -> ExchangeError {
    if message.contains(NONCE_ERROR) {
        return match parse_nonce_minimum(&message) {
            Some(minimum) => ExchangeError::NonceOutOfOrder { minimum, message },
            None => ExchangeError::RetryableApiError(message),
        };
    }

    if message.to_lowercase().contains(TRY_AGAIN) {
        return ExchangeError::RetryableApiError(message);
    }

    ExchangeError::ApiError(message)
}

/// "Nonce must be greater than 12345. You provided 12300." -> 12345
///
/// `u64::MAX` is rejected: no nonce could ever exceed it.
fn parse_nonce_minimum(message: &str) -> Option<u64> {
    message
        .split('.')
        .next()?
        .split_whitespace()
        .last()?
        .parse::<u64>()
        .ok()
        .filter(|minimum| *minimum < u64::MAX)
}
