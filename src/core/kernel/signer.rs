use crate::core::errors::ExchangeError;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Result type for signing operations: headers to attach to the request
pub type SignatureResult = Result<Vec<(String, String)>, ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations receive the exact bytes that will go over the wire and
/// return the authentication headers for them.
pub trait Signer: Send + Sync {
    /// Sign an encoded request payload
    ///
    /// # Arguments
    /// * `payload` - The form-encoded request body, nonce included
    ///
    /// # Returns
    /// Headers to include in the request
    fn sign_request(&self, payload: &[u8]) -> SignatureResult;
}

/// HMAC-SHA512 signer producing the `Key` and `Sign` headers
pub struct HmacSha512Signer {
    api_key: String,
    secret_key: Secret<String>,
}

impl HmacSha512Signer {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key: Secret::new(secret_key),
        }
    }
}

impl std::fmt::Debug for HmacSha512Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSha512Signer")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl Signer for HmacSha512Signer {
    fn sign_request(&self, payload: &[u8]) -> SignatureResult {
        let signature = sign(self.secret_key.expose_secret(), payload)?;
        Ok(vec![
            ("Key".to_string(), self.api_key.clone()),
            ("Sign".to_string(), signature),
        ])
    }
}

/// Lowercase hex HMAC-SHA512 of `message` keyed with `secret`
pub fn sign(secret: &str, message: &[u8]) -> Result<String, ExchangeError> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_vector() {
        // RFC 4231 test case 2
        let digest = sign("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            digest,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_signer_headers() {
        let signer = HmacSha512Signer::new("my-key".to_string(), "my-secret".to_string());
        let headers = signer.sign_request(b"command=returnBalances&nonce=1").unwrap();

        assert_eq!(headers[0], ("Key".to_string(), "my-key".to_string()));
        assert_eq!(headers[1].0, "Sign");
        assert_eq!(headers[1].1.len(), 128);
        assert_eq!(
            headers[1].1,
            sign("my-secret", b"command=returnBalances&nonce=1").unwrap()
        );
    }

    #[test]
    fn test_signature_depends_on_payload() {
        let a = sign("secret", b"nonce=1").unwrap();
        let b = sign("secret", b"nonce=2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = HmacSha512Signer::new("k".to_string(), "super-secret".to_string());
        assert!(!format!("{:?}", signer).contains("super-secret"));
    }
}
