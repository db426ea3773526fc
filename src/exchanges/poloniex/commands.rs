use crate::core::errors::ExchangeError;
use crate::core::types::{Access, CommandSpec};
use std::collections::HashMap;

/// Market data commands, sent as GET to `/public`
pub const PUBLIC_COMMANDS: &[&str] = &[
    "returnTicker",
    "return24hVolume",
    "returnOrderBook",
    "returnTradeHistory",
    "returnChartData",
    "returnCurrencies",
    "returnLoanOrders",
];

/// Signed commands, sent as POST to `/tradingApi`
pub const PRIVATE_COMMANDS: &[&str] = &[
    "returnBalances",
    "returnCompleteBalances",
    "returnDepositAddresses",
    "generateNewAddress",
    "returnDepositsWithdrawals",
    "returnOpenOrders",
    "returnTradeHistory",
    "returnAvailableAccountBalances",
    "returnTradableBalances",
    "returnOpenLoanOffers",
    "returnOrderTrades",
    "returnActiveLoans",
    "returnLendingHistory",
    "createLoanOffer",
    "cancelLoanOffer",
    "toggleAutoRenew",
    "buy",
    "sell",
    "cancelOrder",
    "moveOrder",
    "withdraw",
    "returnFeeInfo",
    "transferBalance",
    "returnMarginAccountSummary",
    "marginBuy",
    "marginSell",
    "getMarginPosition",
    "closeMarginPosition",
];

/// Name-to-descriptor table consulted once per call
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandSpec>,
}

impl CommandRegistry {
    pub fn public() -> Self {
        Self::from_specs(PUBLIC_COMMANDS.iter().copied().map(CommandSpec::public))
    }

    pub fn private() -> Self {
        Self::from_specs(PRIVATE_COMMANDS.iter().copied().map(CommandSpec::private))
    }

    /// Both tables; a name in both resolves to its private form.
    pub fn combined() -> Self {
        Self::from_specs(
            PUBLIC_COMMANDS
                .iter()
                .copied()
                .map(CommandSpec::public)
                .chain(PRIVATE_COMMANDS.iter().copied().map(CommandSpec::private)),
        )
    }

    fn from_specs(specs: impl Iterator<Item = CommandSpec>) -> Self {
        let mut commands = HashMap::new();
        for spec in specs {
            commands.insert(spec.name, spec);
        }
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Result<&CommandSpec, ExchangeError> {
        self.commands
            .get(name)
            .ok_or_else(|| ExchangeError::UnknownCommand(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn requires_auth(&self) -> bool {
        self.commands.values().any(|spec| spec.access == Access::Private)
    }
}
