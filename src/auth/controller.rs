use std::collections::HashMap;

use super::{model::Session, service::AuthService};
use crate::{
    constants::{CREATED, OK_RESPONSE},
    error::CustomError,
    utils::{des_from_str, error_response, respond},
};

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(service: AuthService) -> Self {
        AuthController { service }
    }

    pub async fn login(&self, request: &str) -> (String, String) {
        let result = match des_from_str(request) {
            Ok(credentials) => self.service.login(credentials).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn register(&self, request: &str) -> (String, String) {
        let result = match des_from_str(request) {
            Ok(credentials) => self.service.register(credentials).await,
            Err(e) => Err(e),
        };
        respond(CREATED, result)
    }

    pub fn validate(&self, headers: &HashMap<String, String>) -> (String, String) {
        respond(OK_RESPONSE, self.service.authenticate(headers))
    }

    /// The session for a protected route, or the 401 to send back.
    pub fn session(&self, headers: &HashMap<String, String>) -> Result<Session, (String, String)> {
        self.service
            .authenticate(headers)
            .map_err(|_| error_response(&CustomError::Unauthorized))
    }

    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<(), CustomError> {
        self.service.ensure_user(username, password).await
    }
}
