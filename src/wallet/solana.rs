use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{
    model::{Chain, RawToken},
    rpc::call,
    source::ChainSource,
};
use crate::error::CustomError;

const LAMPORTS_PER_SOL: f64 = 1e9;
const PAGE_LIMIT: u32 = 1000;

/// Solana RPC endpoint that also serves the DAS asset API.
pub struct SolanaRpcSource {
    client: Client,
    rpc_url: String,
}

#[derive(Deserialize)]
struct Lamports {
    value: u64,
}

#[derive(Deserialize)]
struct AssetPage {
    items: Vec<DasAsset>,
}

#[derive(Deserialize)]
struct DasAsset {
    id: String,
    interface: String,
    content: Option<DasContent>,
    token_info: Option<DasTokenInfo>,
}

#[derive(Deserialize)]
struct DasContent {
    metadata: Option<DasMetadata>,
}

#[derive(Deserialize)]
struct DasMetadata {
    symbol: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct DasTokenInfo {
    balance: Option<f64>,
    decimals: Option<u32>,
    price_info: Option<DasPrice>,
}

#[derive(Deserialize)]
struct DasPrice {
    price_per_token: Option<f64>,
}

impl SolanaRpcSource {
    pub fn new(client: Client, rpc_url: impl Into<String>) -> Self {
        SolanaRpcSource {
            client,
            rpc_url: rpc_url.into(),
        }
    }
}

fn fungible(asset: DasAsset) -> Option<RawToken> {
    if asset.interface != "FungibleToken" {
        return None;
    }
    let info = asset.token_info?;
    let metadata = asset.content.and_then(|c| c.metadata);
    let symbol = metadata
        .as_ref()
        .and_then(|m| m.symbol.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let name = metadata
        .and_then(|m| m.name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| symbol.clone());
    let amount = info.balance.unwrap_or(0.0) / 10f64.powi(info.decimals.unwrap_or(0) as i32);

    Some(RawToken {
        symbol,
        name,
        amount,
        contract: Some(asset.id),
        quoted_price: info.price_info.and_then(|p| p.price_per_token),
    })
}

#[async_trait]
impl ChainSource for SolanaRpcSource {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn native_balance(&self, address: &str) -> Result<RawToken, CustomError> {
        let lamports: Lamports = call(
            &self.client,
            &self.rpc_url,
            "getBalance",
            json!([address, { "commitment": "confirmed" }]),
        )
        .await?;
        Ok(RawToken::native(
            Chain::Solana,
            lamports.value as f64 / LAMPORTS_PER_SOL,
        ))
    }

    async fn token_balances(&self, address: &str) -> Result<Vec<RawToken>, CustomError> {
        let page: AssetPage = call(
            &self.client,
            &self.rpc_url,
            "getAssetsByOwner",
            json!({
                "ownerAddress": address,
                "page": 1,
                "limit": PAGE_LIMIT,
                "displayOptions": { "showFungible": true },
            }),
        )
        .await?;
        Ok(page.items.into_iter().filter_map(fungible).collect())
    }
}
