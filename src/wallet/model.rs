use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Solana,
}

impl Chain {
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Solana => "SOL",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Solana => "Solana",
        }
    }

    /// Id of the native coin on the price API, and the platform name used
    /// for contract/mint lookups. They happen to coincide for both chains.
    pub fn price_id(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Solana => "solana",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.price_id())
    }
}

/// A balance as reported by a chain, before pricing. `contract` is `None`
/// for the chain's native coin.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken {
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub contract: Option<String>,
    /// Price already supplied by the chain's indexer, if any.
    pub quoted_price: Option<f64>,
}

impl RawToken {
    pub fn native(chain: Chain, amount: f64) -> Self {
        RawToken {
            symbol: chain.native_symbol().to_string(),
            name: chain.native_name().to_string(),
            amount,
            contract: None,
            quoted_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub price_usd: f64,
    pub usd_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ChainStatus {
    Available,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHoldings {
    pub chain: Chain,
    pub address: String,
    pub status: ChainStatus,
    pub tokens: Vec<TokenData>,
    pub subtotal_usd: f64,
}

impl ChainHoldings {
    pub fn unavailable(chain: Chain, address: &str, reason: String) -> Self {
        ChainHoldings {
            chain,
            address: address.to_string(),
            status: ChainStatus::Unavailable { reason },
            tokens: Vec::new(),
            subtotal_usd: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPortfolio {
    pub chains: Vec<ChainHoldings>,
    pub total_usd: f64,
}

/// USD amounts are shown with two decimals.
pub fn round_usd(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn is_stablecoin(symbol: &str) -> bool {
    matches!(symbol.to_uppercase().as_str(), "USDC" | "USDT")
}
