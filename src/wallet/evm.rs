use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{
    model::{Chain, RawToken},
    rpc::{call, hex_to_f64},
    source::ChainSource,
};
use crate::error::CustomError;

const WEI_PER_ETH: f64 = 1e18;

/// Ethereum-compatible node with the Alchemy token extensions.
pub struct EvmRpcSource {
    client: Client,
    rpc_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalances {
    token_balances: Vec<TokenBalance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    contract_address: String,
    token_balance: Option<String>,
}

#[derive(Deserialize)]
struct TokenMetadata {
    decimals: Option<u32>,
    symbol: Option<String>,
    name: Option<String>,
}

impl EvmRpcSource {
    pub fn new(client: Client, rpc_url: impl Into<String>) -> Self {
        EvmRpcSource {
            client,
            rpc_url: rpc_url.into(),
        }
    }

    async fn describe(&self, contract: String, raw_balance: f64) -> Option<RawToken> {
        let metadata: TokenMetadata = match call(
            &self.client,
            &self.rpc_url,
            "alchemy_getTokenMetadata",
            json!([contract]),
        )
        .await
        {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(%contract, error = ?e, "token metadata unavailable");
                return None;
            }
        };
        let decimals = metadata.decimals?;
        let symbol = metadata.symbol.unwrap_or_else(|| "UNKNOWN".to_string());
        Some(RawToken {
            name: metadata.name.unwrap_or_else(|| "Unknown Token".to_string()),
            symbol,
            amount: raw_balance / 10f64.powi(decimals as i32),
            contract: Some(contract),
            quoted_price: None,
        })
    }
}

#[async_trait]
impl ChainSource for EvmRpcSource {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn native_balance(&self, address: &str) -> Result<RawToken, CustomError> {
        let wei: String = call(
            &self.client,
            &self.rpc_url,
            "eth_getBalance",
            json!([address, "latest"]),
        )
        .await?;
        let wei = hex_to_f64(&wei)
            .ok_or_else(|| CustomError::Upstream(format!("eth_getBalance: bad quantity {wei}")))?;
        Ok(RawToken::native(Chain::Ethereum, wei / WEI_PER_ETH))
    }

    async fn token_balances(&self, address: &str) -> Result<Vec<RawToken>, CustomError> {
        let balances: TokenBalances = call(
            &self.client,
            &self.rpc_url,
            "alchemy_getTokenBalances",
            json!([address, "erc20"]),
        )
        .await?;

        let held = balances.token_balances.into_iter().filter_map(|t| {
            let raw = t.token_balance.as_deref().and_then(hex_to_f64)?;
            (raw > 0.0).then_some((t.contract_address, raw))
        });

        let tokens = join_all(held.map(|(contract, raw)| self.describe(contract, raw))).await;
        Ok(tokens.into_iter().flatten().collect())
    }
}
