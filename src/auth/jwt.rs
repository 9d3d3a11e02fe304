use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::model::{Claims, Session, User};
use crate::error::CustomError;

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    /// Keys may come from env vars with literal `\n` escapes.
    pub fn from_pem(private_pem: &str, public_pem: &str, ttl_hours: i64) -> Result<Self, CustomError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem.replace("\\n", "\n").as_bytes())
            .map_err(CustomError::EncodeError)?;
        let decoding = DecodingKey::from_rsa_pem(public_pem.replace("\\n", "\n").as_bytes())
            .map_err(CustomError::EncodeError)?;
        Ok(TokenKeys {
            encoding,
            decoding,
            ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn create_jwt(&self, user: &User) -> Result<String, CustomError> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| CustomError::ConfigError("TOKEN_TTL_HOURS".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            name: user.username.clone(),
            exp: expiration,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding)
            .map_err(CustomError::EncodeError)
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Session, CustomError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::RS256))
            .map_err(CustomError::TokenError)?;
        Ok(Session {
            user_id: data.claims.sub,
            username: data.claims.name,
        })
    }
}
