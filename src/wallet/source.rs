use async_trait::async_trait;

use super::model::{Chain, RawToken};
use crate::error::CustomError;

#[async_trait]
pub trait ChainSource: Send + Sync {
    fn chain(&self) -> Chain;
    async fn native_balance(&self, address: &str) -> Result<RawToken, CustomError>;
    async fn token_balances(&self, address: &str) -> Result<Vec<RawToken>, CustomError>;
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price_usd(&self, chain: Chain, token: &RawToken) -> Result<f64, CustomError>;
}
