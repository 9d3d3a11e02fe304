use std::{error::Error, fmt::Debug};

use crate::constants::{
    BAD_GATEWAY, BAD_REQUEST, CONFLICT, INTERNAL_ERROR, NOT_FOUND, PAYLOAD_TOO_LARGE,
    UNAUTHORIZED,
};

#[derive(thiserror::Error)]
pub enum CustomError {
    #[error("ENV '{0}' Not Found")]
    EnvError(String, #[source] std::env::VarError),

    #[error("Invalid configuration value for '{0}'")]
    ConfigError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Username or password is incorrect")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Username already registered")]
    UsernameExists,

    #[error("{0}")]
    Conflict(String),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Error encode private key")]
    EncodeError(#[source] jsonwebtoken::errors::Error),

    #[error("Token error")]
    TokenError(#[source] jsonwebtoken::errors::Error),

    #[error("Password hashing")]
    HashError(#[source] bcrypt::BcryptError),

    #[error("Serialization")]
    SerdeError(#[source] serde_json::Error),

    #[error("Corrupt stored value: {0}")]
    CorruptData(String),

    #[error("Database query")]
    DBError(#[source] sqlx::Error),
}

impl CustomError {
    pub fn status_line(&self) -> &'static str {
        match self {
            CustomError::Unauthorized
            | CustomError::InvalidCredentials
            | CustomError::TokenError(_) => UNAUTHORIZED,
            CustomError::Validation(_) => BAD_REQUEST,
            CustomError::NotFound(_) => NOT_FOUND,
            CustomError::UsernameExists | CustomError::Conflict(_) => CONFLICT,
            CustomError::BodyTooLarge => PAYLOAD_TOO_LARGE,
            CustomError::Upstream(_) => BAD_GATEWAY,
            _ => INTERNAL_ERROR,
        }
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self.status_line() {
            INTERNAL_ERROR => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for CustomError {
    fn from(e: sqlx::Error) -> Self {
        CustomError::DBError(e)
    }
}

impl Debug for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = self.source() {
            write!(f, " (Caused by: {})", source)?;
        }
        Ok(())
    }
}
