use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    model::{
        Chain, ChainHoldings, ChainStatus, RawToken, TokenData, WalletPortfolio, is_stablecoin,
        round_usd,
    },
    source::{ChainSource, PriceSource},
};

pub struct WalletTarget {
    pub source: Arc<dyn ChainSource>,
    pub address: String,
}

/// Every run is a fresh, side-effect free read; re-running simply replaces
/// the previous totals.
pub struct WalletAggregator {
    prices: Arc<dyn PriceSource>,
}

impl WalletAggregator {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        WalletAggregator { prices }
    }

    pub async fn aggregate(&self, targets: &[WalletTarget]) -> WalletPortfolio {
        let chains = join_all(targets.iter().map(|target| self.collect(target))).await;
        let total_usd = round_usd(chains.iter().map(|c| c.subtotal_usd).sum());
        info!(chains = chains.len(), total_usd, "wallet aggregation finished");
        WalletPortfolio { chains, total_usd }
    }

    async fn collect(&self, target: &WalletTarget) -> ChainHoldings {
        let chain = target.source.chain();
        let address = target.address.as_str();

        let native = match target.source.native_balance(address).await {
            Ok(native) => native,
            Err(e) => {
                warn!(%chain, address, error = ?e, "chain balance unavailable");
                return ChainHoldings::unavailable(chain, address, e.to_string());
            }
        };

        let mut raw = vec![native];
        match target.source.token_balances(address).await {
            Ok(tokens) => raw.extend(tokens),
            Err(e) => warn!(%chain, address, error = ?e, "token list unavailable, native coin only"),
        }

        let mut tokens = join_all(raw.into_iter().map(|token| self.price(chain, token))).await;
        tokens.sort_by(|a, b| b.usd_value.total_cmp(&a.usd_value));
        let subtotal_usd = round_usd(tokens.iter().map(|t| t.usd_value).sum());

        ChainHoldings {
            chain,
            address: address.to_string(),
            status: ChainStatus::Available,
            tokens,
            subtotal_usd,
        }
    }

    /// A failed lookup prices the token at zero rather than failing the chain.
    async fn price(&self, chain: Chain, token: RawToken) -> TokenData {
        let price_usd = if is_stablecoin(&token.symbol) {
            1.0
        } else if let Some(quoted) = token.quoted_price {
            quoted
        } else {
            match self.prices.price_usd(chain, &token).await {
                Ok(price) => price,
                Err(e) => {
                    warn!(%chain, symbol = %token.symbol, error = ?e, "price lookup failed");
                    0.0
                }
            }
        };

        TokenData {
            usd_value: round_usd(token.amount * price_usd),
            symbol: token.symbol,
            name: token.name,
            amount: token.amount,
            price_usd,
            contract_address: token.contract,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CustomError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeChain {
        chain: Chain,
        native: Option<f64>,
        tokens: Option<Vec<RawToken>>,
    }

    #[async_trait]
    impl ChainSource for FakeChain {
        fn chain(&self) -> Chain {
            self.chain
        }

        async fn native_balance(&self, _address: &str) -> Result<RawToken, CustomError> {
            self.native
                .map(|amount| RawToken::native(self.chain, amount))
                .ok_or_else(|| CustomError::Upstream("rpc down".to_string()))
        }

        async fn token_balances(&self, _address: &str) -> Result<Vec<RawToken>, CustomError> {
            self.tokens
                .clone()
                .ok_or_else(|| CustomError::Upstream("indexer down".to_string()))
        }
    }

    struct FakePrices(HashMap<&'static str, f64>);

    #[async_trait]
    impl PriceSource for FakePrices {
        async fn price_usd(&self, _chain: Chain, token: &RawToken) -> Result<f64, CustomError> {
            self.0
                .get(token.symbol.as_str())
                .copied()
                .ok_or_else(|| CustomError::Upstream("rate limited".to_string()))
        }
    }

    fn token(symbol: &str, amount: f64) -> RawToken {
        RawToken {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            amount,
            contract: Some(format!("0x{symbol}")),
            quoted_price: None,
        }
    }

    fn target(source: FakeChain) -> WalletTarget {
        WalletTarget {
            source: Arc::new(source),
            address: "addr".to_string(),
        }
    }

    fn aggregator(prices: &[(&'static str, f64)]) -> WalletAggregator {
        WalletAggregator::new(Arc::new(FakePrices(prices.iter().copied().collect())))
    }

    #[tokio::test]
    async fn failed_price_degrades_to_zero() {
        let eth = FakeChain {
            chain: Chain::Ethereum,
            native: Some(1.5),
            tokens: Some(vec![token("LINK", 10.0), token("PEPE", 1_000_000.0)]),
        };
        let portfolio = aggregator(&[("ETH", 2000.0), ("LINK", 14.25)])
            .aggregate(&[target(eth)])
            .await;

        let chain = &portfolio.chains[0];
        assert_eq!(chain.status, ChainStatus::Available);
        let pepe = chain.tokens.iter().find(|t| t.symbol == "PEPE").unwrap();
        assert_eq!(pepe.price_usd, 0.0);
        assert_eq!(pepe.usd_value, 0.0);

        let symbols: Vec<&str> = chain.tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["ETH", "LINK", "PEPE"]);
        assert_eq!(chain.subtotal_usd, 3142.5);
        assert_eq!(portfolio.total_usd, 3142.5);
    }

    #[tokio::test]
    async fn stablecoins_and_quoted_prices_skip_lookup() {
        let mut jup = token("JUP", 100.0);
        jup.quoted_price = Some(0.5);
        let sol = FakeChain {
            chain: Chain::Solana,
            native: Some(0.0),
            tokens: Some(vec![token("USDC", 25.0), jup]),
        };
        let portfolio = aggregator(&[]).aggregate(&[target(sol)]).await;

        let tokens = &portfolio.chains[0].tokens;
        let usdc = tokens.iter().find(|t| t.symbol == "USDC").unwrap();
        assert_eq!(usdc.price_usd, 1.0);
        assert_eq!(usdc.usd_value, 25.0);
        let jup = tokens.iter().find(|t| t.symbol == "JUP").unwrap();
        assert_eq!(jup.usd_value, 50.0);
        assert_eq!(portfolio.total_usd, 75.0);
    }

    #[tokio::test]
    async fn dead_chain_is_reported_without_sinking_the_other() {
        let eth = FakeChain {
            chain: Chain::Ethereum,
            native: None,
            tokens: None,
        };
        let sol = FakeChain {
            chain: Chain::Solana,
            native: Some(2.0),
            tokens: None,
        };
        let portfolio = aggregator(&[("SOL", 150.0)])
            .aggregate(&[target(eth), target(sol)])
            .await;

        assert!(matches!(
            portfolio.chains[0].status,
            ChainStatus::Unavailable { .. }
        ));
        assert_eq!(portfolio.chains[0].subtotal_usd, 0.0);

        // token list failure keeps the native coin
        let sol = &portfolio.chains[1];
        assert_eq!(sol.status, ChainStatus::Available);
        assert_eq!(sol.tokens.len(), 1);
        assert_eq!(sol.subtotal_usd, 300.0);
        assert_eq!(portfolio.total_usd, 300.0);
    }

    #[tokio::test]
    async fn usd_values_round_to_cents() {
        let eth = FakeChain {
            chain: Chain::Ethereum,
            native: Some(0.333),
            tokens: Some(Vec::new()),
        };
        let portfolio = aggregator(&[("ETH", 3.0)]).aggregate(&[target(eth)]).await;
        assert_eq!(portfolio.chains[0].tokens[0].usd_value, 1.0);
    }
}
