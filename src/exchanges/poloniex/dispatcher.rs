use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    encode_form, HttpClient, HttpRequest, HttpResponse, NonceSequencer, RateGate, ReqwestRest,
    RetryPolicy, Signer,
};
use crate::core::types::{Access, CommandSpec, Verb};
use crate::exchanges::poloniex::codec::decode_response;
use crate::exchanges::poloniex::commands::CommandRegistry;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, field, instrument, Span};

pub const PUBLIC_PATH: &str = "/public";
pub const PRIVATE_PATH: &str = "/tradingApi";

/// Executes named API commands
///
/// Each call is checked against the command table, throttled by the shared
/// [`RateGate`], signed under the [`NonceSequencer`] lock when the command is
/// private, and retried on transient failures by the [`RetryPolicy`]. A retry
/// repeats the whole request: new permit, new nonce, new signature.
///
/// Build one with [`PoloniexBuilder`](super::builder::PoloniexBuilder).
pub struct RequestDispatcher<H: HttpClient = ReqwestRest> {
    pub(crate) http: H,
    pub(crate) registry: CommandRegistry,
    pub(crate) signer: Option<Arc<dyn Signer>>,
    pub(crate) rate_gate: Arc<RateGate>,
    pub(crate) nonces: Arc<NonceSequencer>,
    pub(crate) retry: RetryPolicy,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

/// Dispatcher over the default reqwest transport
pub type Poloniex = RequestDispatcher<ReqwestRest>;

impl<H: HttpClient> std::fmt::Debug for RequestDispatcher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("base_url", &self.base_url)
            .field("commands", &self.registry.len())
            .field("has_signer", &self.signer.is_some())
            .field("rate_gate", &self.rate_gate)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<H: HttpClient> RequestDispatcher<H> {
    /// Invoke `command` with `args` and return the decoded payload.
    #[instrument(
        skip(self, args),
        fields(command = %command, access = field::Empty, arg_count = args.len())
    )]
    pub async fn call(&self, command: &str, args: &[(&str, &str)]) -> Result<Value, ExchangeError> {
        let spec = *self.resolve(command)?;
        Span::current().record("access", field::display(spec.access));
        self.retry.run(|| self.attempt(spec, args)).await
    }

    /// Like [`call`](Self::call), deserializing the payload into `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        command: &str,
        args: &[(&str, &str)],
    ) -> Result<T, ExchangeError> {
        let value = self.call(command, args).await?;
        serde_json::from_value(value).map_err(|e| {
            ExchangeError::ProtocolError(format!("Failed to deserialize {}: {}", command, e))
        })
    }

    /// Check the command exists and can be authenticated. No I/O.
    pub fn resolve(&self, command: &str) -> Result<&CommandSpec, ExchangeError> {
        let spec = self.registry.lookup(command)?;
        if spec.requires_auth() && self.signer.is_none() {
            return Err(ExchangeError::MissingCredentials(command.to_string()));
        }
        Ok(spec)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn can_authenticate(&self) -> bool {
        self.signer.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The gate, for sharing with another client
    pub fn rate_gate(&self) -> Arc<RateGate> {
        Arc::clone(&self.rate_gate)
    }

    /// The sequencer, for sharing with another client
    pub fn nonce_sequencer(&self) -> Arc<NonceSequencer> {
        Arc::clone(&self.nonces)
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    async fn attempt(&self, spec: CommandSpec, args: &[(&str, &str)]) -> Result<Value, ExchangeError> {
        self.rate_gate.acquire().await;

        match spec.access {
            Access::Public => {
                let request = self.build_request(&spec, Self::params(&spec, args, None), Vec::new())?;
                let response = self.http.send(request).await?;
                decode_response(&response)
            }
            Access::Private => self.attempt_signed(&spec, args).await,
        }
    }

    /// Issue, sign and send under the sequencing lock, so requests reach the
    /// server in the order their nonces were issued.
    async fn attempt_signed(
        &self,
        spec: &CommandSpec,
        args: &[(&str, &str)],
    ) -> Result<Value, ExchangeError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| ExchangeError::MissingCredentials(spec.name.to_string()))?;

        let mut nonces = self.nonces.lock().await;
        let nonce = nonces.next()?;
        debug!(nonce, "signing request");

        let params = Self::params(spec, args, Some(nonce));
        let payload = encode_form(&params)?;
        let headers = signer.sign_request(payload.as_bytes())?;
        let request = self.build_encoded_request(spec, params, payload, headers);

        let response: HttpResponse = self.http.send(request).await?;
        let decoded = decode_response(&response);

        if let Err(ExchangeError::NonceOutOfOrder { minimum, .. }) = &decoded {
            nonces.force_to(*minimum);
        }
        decoded
    }

    fn params(spec: &CommandSpec, args: &[(&str, &str)], nonce: Option<u64>) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(args.len() + 2);
        params.push(("command".to_string(), spec.name.to_string()));
        params.extend(
            args.iter()
                .filter(|(key, _)| *key != "command" && *key != "nonce")
                .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
        );
        if let Some(nonce) = nonce {
            params.push(("nonce".to_string(), nonce.to_string()));
        }
        params
    }

    fn url(&self, spec: &CommandSpec) -> String {
        let path = match spec.access {
            Access::Public => PUBLIC_PATH,
            Access::Private => PRIVATE_PATH,
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build_request(
        &self,
        spec: &CommandSpec,
        params: Vec<(String, String)>,
        headers: Vec<(String, String)>,
    ) -> Result<HttpRequest, ExchangeError> {
        let payload = match spec.verb {
            Verb::Query => String::new(),
            Verb::Body => encode_form(&params)?,
        };
        Ok(self.build_encoded_request(spec, params, payload, headers))
    }

    fn build_encoded_request(
        &self,
        spec: &CommandSpec,
        params: Vec<(String, String)>,
        payload: String,
        headers: Vec<(String, String)>,
    ) -> HttpRequest {
        let (query, body) = match spec.verb {
            Verb::Query => (params, None),
            Verb::Body => (Vec::new(), Some(payload)),
        };

        HttpRequest {
            verb: spec.verb,
            url: self.url(spec),
            query,
            body,
            headers,
            timeout: self.timeout,
        }
    }
}
