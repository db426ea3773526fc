use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One entry of `returnTicker`, keyed by currency pair in the response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoloniexTicker {
    pub id: u64,
    pub last: String,
    pub lowest_ask: String,
    pub highest_bid: String,
    pub percent_change: String,
    pub base_volume: String,
    pub quote_volume: String,
    #[serde(default)]
    pub is_frozen: String,
    #[serde(default, rename = "high24hr")]
    pub high_24hr: Option<String>,
    #[serde(default, rename = "low24hr")]
    pub low_24hr: Option<String>,
}

pub type PoloniexTickers = HashMap<String, PoloniexTicker>;

/// `returnOrderBook` for a single pair
///
/// Levels are `[price, amount]`; the exchange sends the price as a string
/// and the amount as a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoloniexOrderBook {
    pub asks: Vec<(String, Value)>,
    pub bids: Vec<(String, Value)>,
    #[serde(default)]
    pub is_frozen: String,
    #[serde(default)]
    pub seq: u64,
}

/// `returnBalances`: currency -> available amount
pub type PoloniexBalances = HashMap<String, String>;

/// One entry of `returnOpenOrders`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoloniexOpenOrder {
    pub order_number: String,
    #[serde(rename = "type")]
    pub side: String,
    pub rate: String,
    pub amount: String,
    pub total: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_deserializes() {
        let raw = r#"{"BTC_ETH":{"id":7,"last":"0.02510000","lowestAsk":"0.02589999",
            "highestBid":"0.02510000","percentChange":"0.02390438","baseVolume":"6.16485315",
            "quoteVolume":"245.82513926","isFrozen":"0","high24hr":"0.026","low24hr":"0.024"}}"#;
        let tickers: PoloniexTickers = serde_json::from_str(raw).unwrap();
        let eth = &tickers["BTC_ETH"];
        assert_eq!(eth.id, 7);
        assert_eq!(eth.lowest_ask, "0.02589999");
        assert_eq!(eth.high_24hr.as_deref(), Some("0.026"));
    }

    #[test]
    fn test_order_book_deserializes() {
        let raw = r#"{"asks":[["0.00007600",1164],["0.00007620",1300]],
            "bids":[["0.00006901",200]],"isFrozen":"0","seq":18849}"#;
        let book: PoloniexOrderBook = serde_json::from_str(raw).unwrap();
        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.bids[0].0, "0.00006901");
        assert_eq!(book.seq, 18_849);
    }
}
