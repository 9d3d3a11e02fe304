use std::collections::HashMap;

use super::{model::EventQuery, service::EventService};
use crate::{auth::model::Session, constants::OK_RESPONSE, utils::respond};

pub struct EventController {
    service: EventService,
}

impl EventController {
    pub fn new(service: EventService) -> Self {
        EventController { service }
    }

    pub async fn events(&self, session: &Session, params: &HashMap<String, String>) -> (String, String) {
        let result = match EventQuery::from_params(params) {
            Ok(query) => self.service.list(session, &query).await,
            Err(e) => Err(e),
        };
        respond(OK_RESPONSE, result)
    }

    pub async fn analytics(&self, session: &Session) -> (String, String) {
        respond(OK_RESPONSE, self.service.analytics(session).await)
    }
}
