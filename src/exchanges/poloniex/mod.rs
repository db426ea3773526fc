pub mod account;
pub mod builder;
pub mod codec;
pub mod commands;
pub mod dispatcher;
pub mod market_data;
pub mod types;

pub use builder::{build_connector, ClientKind, PoloniexBuilder};
pub use commands::{CommandRegistry, PRIVATE_COMMANDS, PUBLIC_COMMANDS};
pub use dispatcher::{Poloniex, RequestDispatcher};
pub use types::{
    PoloniexBalances, PoloniexOpenOrder, PoloniexOrderBook, PoloniexTicker, PoloniexTickers,
};
