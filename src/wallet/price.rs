use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

use super::{
    model::{Chain, RawToken},
    source::PriceSource,
};
use crate::error::CustomError;

type PriceTable = HashMap<String, HashMap<String, f64>>;

/// CoinGecko-compatible `simple` price endpoints.
pub struct CoinGeckoPrices {
    client: Client,
    base_url: String,
}

impl CoinGeckoPrices {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        CoinGeckoPrices {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<PriceTable, CustomError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CustomError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CustomError::Upstream(format!(
                "price API returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| CustomError::Upstream(e.to_string()))
    }
}

fn usd(table: &PriceTable, key: &str) -> Option<f64> {
    table
        .get(key)
        .or_else(|| table.get(&key.to_lowercase()))
        .and_then(|quote| quote.get("usd"))
        .copied()
}

#[async_trait]
impl PriceSource for CoinGeckoPrices {
    async fn price_usd(&self, chain: Chain, token: &RawToken) -> Result<f64, CustomError> {
        let (table, key) = match &token.contract {
            None => {
                let url = format!("{}/simple/price", self.base_url);
                let id = chain.price_id();
                (self.fetch(&url, &[("ids", id), ("vs_currencies", "usd")]).await?, id)
            }
            Some(contract) => {
                let url = format!("{}/simple/token_price/{}", self.base_url, chain.price_id());
                let query = [("contract_addresses", contract.as_str()), ("vs_currencies", "usd")];
                (self.fetch(&url, &query).await?, contract.as_str())
            }
        };
        usd(&table, key)
            .ok_or_else(|| CustomError::Upstream(format!("no USD quote for {}", token.symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_lookup_falls_back_to_lowercase() {
        let table: PriceTable = serde_json::from_str(
            r#"{"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48":{"usd":1.0},"ethereum":{"usd":3100.5}}"#,
        )
        .unwrap();
        assert_eq!(usd(&table, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), Some(1.0));
        assert_eq!(usd(&table, "ethereum"), Some(3100.5));
        assert_eq!(usd(&table, "solana"), None);
    }
}
