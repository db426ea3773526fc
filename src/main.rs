use poloniex::core::config::ExchangeConfig;
use poloniex::PoloniexBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Credentials are optional; without them only public commands work.
    #[cfg(feature = "env-file")]
    let config = ExchangeConfig::from_env_file("POLONIEX").unwrap_or_else(|_| ExchangeConfig::read_only());
    #[cfg(not(feature = "env-file"))]
    let config = ExchangeConfig::from_env("POLONIEX").unwrap_or_else(|_| ExchangeConfig::read_only());

    let client = PoloniexBuilder::new().with_config(config).build()?;

    println!("Fetching tickers...");
    let tickers = client.return_ticker().await?;
    println!("Found {} markets", tickers.len());
    for (pair, ticker) in tickers.iter().take(5) {
        println!(
            "{}: last {} (bid {}, ask {})",
            pair, ticker.last, ticker.highest_bid, ticker.lowest_ask
        );
    }

    if client.can_authenticate() {
        let balances = client.return_balances().await?;
        for (currency, amount) in balances.iter().filter(|(_, amount)| amount.as_str() != "0.00000000") {
            println!("{}: {}", currency, amount);
        }
    }

    Ok(())
}
