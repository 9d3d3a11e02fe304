use anyhow::{Context, Result, bail};
use moonstone::{
    config::WalletConfig,
    wallet::{
        ChainSource, ChainStatus, WalletAggregator, WalletTarget, evm::EvmRpcSource,
        price::CoinGeckoPrices, solana::SolanaRpcSource,
    },
};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

fn targets(config: &WalletConfig, client: &reqwest::Client) -> Vec<WalletTarget> {
    let mut targets = Vec::new();
    if let (Some(url), Some(address)) = (&config.eth_rpc_url, &config.evm_address) {
        let source: Arc<dyn ChainSource> = Arc::new(EvmRpcSource::new(client.clone(), url));
        targets.push(WalletTarget {
            source,
            address: address.clone(),
        });
    }
    if let (Some(url), Some(address)) = (&config.solana_rpc_url, &config.solana_address) {
        let source: Arc<dyn ChainSource> = Arc::new(SolanaRpcSource::new(client.clone(), url));
        targets.push(WalletTarget {
            source,
            address: address.clone(),
        });
    }
    targets
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = WalletConfig::from_env().context("Failed to load wallet config")?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build HTTP client")?;

    let targets = targets(&config, &client);
    if targets.is_empty() {
        bail!("no wallet configured, set ETH_RPC_URL/EVM_ADDRESS or SOLANA_RPC_URL/SOLANA_ADDRESS");
    }

    let aggregator = WalletAggregator::new(Arc::new(CoinGeckoPrices::new(
        client.clone(),
        &config.price_api_url,
    )));

    let mut ticker = tokio::time::interval(Duration::from_secs(config.resync_secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let portfolio = aggregator.aggregate(&targets).await;
                for chain in &portfolio.chains {
                    match &chain.status {
                        ChainStatus::Available => info!(
                            chain = %chain.chain,
                            address = %chain.address,
                            tokens = chain.tokens.len(),
                            subtotal_usd = chain.subtotal_usd,
                            "wallet synced"
                        ),
                        ChainStatus::Unavailable { reason } => warn!(
                            chain = %chain.chain,
                            address = %chain.address,
                            %reason,
                            "wallet unavailable"
                        ),
                    }
                }
                info!(total_usd = portfolio.total_usd, "portfolio total");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down wallet sync...");
                break;
            }
        }
    }
    Ok(())
}
