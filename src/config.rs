use std::{env, str::FromStr};

use dotenvy::dotenv;

use crate::{
    constants::{DEFAULT_BIND_ADDR, DEFAULT_PRICE_API_URL, DEFAULT_RESYNC_SECS},
    error::CustomError,
};

pub struct Config {
    pub jwt_private_key: String,
    pub jwt_public_key: String,
    pub database_url: String,
    pub bind_addr: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
    pub admin: Option<AdminSeed>,
}

pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, CustomError> {
        dotenv().ok();

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminSeed { username, password }),
            _ => None,
        };

        Ok(Config {
            jwt_private_key: required("JWT_PRIVATE_KEY")?,
            jwt_public_key: required("JWT_PUBLIC_KEY")?,
            database_url: required("DATABASE_URL")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            token_ttl_hours: parsed_or("TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: parsed_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            admin,
        })
    }
}

/// Settings for the wallet resync client.
pub struct WalletConfig {
    pub eth_rpc_url: Option<String>,
    pub solana_rpc_url: Option<String>,
    pub price_api_url: String,
    pub evm_address: Option<String>,
    pub solana_address: Option<String>,
    pub resync_secs: u64,
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, CustomError> {
        dotenv().ok();

        Ok(WalletConfig {
            eth_rpc_url: env::var("ETH_RPC_URL").ok(),
            solana_rpc_url: env::var("SOLANA_RPC_URL").ok(),
            price_api_url: env::var("PRICE_API_URL")
                .unwrap_or_else(|_| DEFAULT_PRICE_API_URL.to_string()),
            evm_address: env::var("EVM_ADDRESS").ok(),
            solana_address: env::var("SOLANA_ADDRESS").ok(),
            resync_secs: parsed_or("RESYNC_SECS", DEFAULT_RESYNC_SECS)?,
        })
    }
}

fn required(key: &str) -> Result<String, CustomError> {
    env::var(key).map_err(|e| CustomError::EnvError(key.to_string(), e))
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, CustomError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CustomError::ConfigError(key.to_string())),
        Err(_) => Ok(default),
    }
}
