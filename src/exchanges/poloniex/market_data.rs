use super::dispatcher::RequestDispatcher;
use super::types::{PoloniexOrderBook, PoloniexTickers};
use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpClient;
use serde_json::Value;
use tracing::instrument;

/// Public market data helpers
impl<H: HttpClient> RequestDispatcher<H> {
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn return_ticker(&self) -> Result<PoloniexTickers, ExchangeError> {
        self.call_json("returnTicker", &[]).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex", pair = %currency_pair))]
    pub async fn return_order_book(
        &self,
        currency_pair: &str,
        depth: Option<u32>,
    ) -> Result<PoloniexOrderBook, ExchangeError> {
        let depth = depth.map(|d| d.to_string());
        let mut params = vec![("currencyPair", currency_pair)];
        if let Some(ref depth) = depth {
            params.push(("depth", depth.as_str()));
        }
        self.call_json("returnOrderBook", &params).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn return_currencies(&self) -> Result<Value, ExchangeError> {
        self.call("returnCurrencies", &[]).await
    }
}
