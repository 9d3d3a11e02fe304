use super::service::AccountService;
use crate::{
    auth::model::Session,
    constants::{CREATED, OK_RESPONSE},
    utils::{des_from_str, respond},
};

pub struct AccountController {
    service: AccountService,
}

impl AccountController {
    pub fn new(service: AccountService) -> Self {
        AccountController { service }
    }

    pub async fn list(&self, session: &Session) -> (String, String) {
        respond(OK_RESPONSE, self.service.balance_record(session).await)
    }

    pub async fn create(&self, session: &Session, body: &str) -> (String, String) {
        let result = match des_from_str(body) {
            Ok(input) => self.service.create_asset(session, input).await,
            Err(e) => Err(e),
        };
        respond(CREATED, result)
    }

    pub async fn edit_by_label(&self, session: &Session, body: &str) -> (String, String) {
        let result = match des_from_str(body) {
            Ok(input) => self.service.edit_balance_by_label(session, input).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn update_balance(&self, session: &Session, body: &str) -> (String, String) {
        let result = match des_from_str(body) {
            Ok(input) => self.service.edit_balance(session, input).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn delete(&self, session: &Session, body: &str) -> (String, String) {
        let result = match des_from_str(body) {
            Ok(input) => self.service.delete_asset(session, input).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn salary(&self, session: &Session, body: &str) -> (String, String) {
        let result = match des_from_str(body) {
            Ok(input) => self.service.apply_salary(session, input).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn wipe(&self, session: &Session) -> (String, String) {
        respond(OK_RESPONSE, self.service.wipe(session).await)
    }
}
