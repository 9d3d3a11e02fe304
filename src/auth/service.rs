use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    jwt::TokenKeys,
    model::{Credentials, LoginResponse, RegisterResponse, Session, User},
    repository::AuthRepository,
};
use crate::{
    error::CustomError,
    utils::{encrypt, extract_token, is_password_valid},
};

pub struct AuthService {
    repository: AuthRepository,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repository: AuthRepository, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        AuthService {
            repository,
            keys,
            bcrypt_cost,
        }
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginResponse, CustomError> {
        let user_db = match self.repository.query_user(&credentials.username).await? {
            Some(user) => user,
            None => {
                warn!(username = %credentials.username, "login for unknown user");
                return Err(CustomError::InvalidCredentials);
            }
        };

        if !is_password_valid(&credentials.password, &user_db.password) {
            warn!(username = %credentials.username, "wrong password");
            return Err(CustomError::InvalidCredentials);
        }

        let token = self.keys.create_jwt(&user_db)?;
        info!(username = %user_db.username, "login succeeded");
        Ok(LoginResponse { token })
    }

    pub async fn register(&self, credentials: Credentials) -> Result<RegisterResponse, CustomError> {
        let username = credentials.username.trim().to_string();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(CustomError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let new_user = User {
            id: Uuid::now_v7().to_string(),
            username,
            password: encrypt(&credentials.password, self.bcrypt_cost)?,
        };
        self.repository
            .insert_user(&new_user, Utc::now().timestamp_millis())
            .await?;

        info!(username = %new_user.username, user_id = %new_user.id, "user registered");
        Ok(RegisterResponse {
            user_id: new_user.id,
            username: new_user.username,
        })
    }

    /// Resolves the bearer token into the caller's session.
    pub fn authenticate(&self, headers: &HashMap<String, String>) -> Result<Session, CustomError> {
        let token = extract_token(headers).ok_or(CustomError::Unauthorized)?;
        self.keys.verify_jwt(&token).map_err(|e| {
            warn!(error = ?e, "token rejected");
            CustomError::Unauthorized
        })
    }

    /// Creates the user unless the username is already taken.
    pub async fn ensure_user(&self, username: &str, password: &str) -> Result<(), CustomError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.register(credentials).await {
            Ok(_) | Err(CustomError::UsernameExists) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
