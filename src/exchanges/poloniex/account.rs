use super::dispatcher::RequestDispatcher;
use super::types::{PoloniexBalances, PoloniexOpenOrder};
use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpClient;
use tracing::instrument;

/// Signed account helpers
impl<H: HttpClient> RequestDispatcher<H> {
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn return_balances(&self) -> Result<PoloniexBalances, ExchangeError> {
        self.call_json("returnBalances", &[]).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex", pair = %currency_pair))]
    pub async fn return_open_orders(
        &self,
        currency_pair: &str,
    ) -> Result<Vec<PoloniexOpenOrder>, ExchangeError> {
        self.call_json("returnOpenOrders", &[("currencyPair", currency_pair)])
            .await
    }
}
