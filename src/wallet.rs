//! On-chain wallet balances normalised into one token list with USD totals.
//! Nothing here touches the database.

pub mod aggregator;
pub mod evm;
pub mod model;
pub mod price;
mod rpc;
pub mod solana;
pub mod source;

pub use aggregator::{WalletAggregator, WalletTarget};
pub use model::{Chain, ChainHoldings, ChainStatus, RawToken, TokenData, WalletPortfolio};
pub use source::{ChainSource, PriceSource};
