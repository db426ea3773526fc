//! Exchange-agnostic request machinery
//!
//! Everything a signed, throttled, retried REST call needs, with no knowledge
//! of which commands exist:
//!
//! - [`RateGate`]: fixed-window call quota, hard reset every window
//! - [`NonceSequencer`]: strictly increasing nonces with a lock that can be
//!   held across sign-and-send
//! - [`RetryPolicy`]: retry of transient failures over a delay schedule
//! - [`HttpClient`] / [`ReqwestRest`]: the transport seam and its reqwest
//!   implementation
//! - [`Signer`] / [`HmacSha512Signer`]: request authentication
//!
//! # Sharing one quota between two clients
//! ```rust,no_run
//! use poloniex::core::kernel::{NonceSequencer, RateGate};
//! use poloniex::exchanges::poloniex::PoloniexBuilder;
//! use nonzero_ext::nonzero;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), poloniex::ExchangeError> {
//! let gate = Arc::new(RateGate::per_second(nonzero!(6u32)));
//! let nonces = Arc::new(NonceSequencer::from_clock());
//!
//! let market = PoloniexBuilder::new()
//!     .with_rate_gate(Arc::clone(&gate))
//!     .build_public()?;
//! let trading = PoloniexBuilder::new()
//!     .with_credentials("key".to_string(), "secret".to_string())
//!     .with_rate_gate(gate)
//!     .with_nonce_sequencer(nonces)
//!     .build_private()?;
//! # let _ = (market, trading);
//! # Ok(())
//! # }
//! ```

pub mod nonce;
pub mod rate_gate;
pub mod rest;
pub mod retry;
pub mod signer;

pub use nonce::{NonceGuard, NonceSequencer};
pub use rate_gate::RateGate;
pub use rest::{
    encode_form, HttpClient, HttpRequest, HttpResponse, ReqwestRest, RestClientBuilder,
    RestClientConfig,
};
pub use retry::RetryPolicy;
pub use signer::{sign, HmacSha512Signer, SignatureResult, Signer};
