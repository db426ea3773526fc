pub mod core;
pub mod exchanges;

pub use crate::core::{errors::ExchangeError, types::*};
pub use exchanges::poloniex::{Poloniex, PoloniexBuilder, RequestDispatcher};
