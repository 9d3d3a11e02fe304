use super::{
    analytics::AnalyticsReport,
    model::{Event, EventPage, EventQuery, PageMeta},
    repository::EventRepository,
};
use crate::{auth::model::Session, error::CustomError};

/// Read-only views over the event log, always scoped to the caller.
pub struct EventService {
    repository: EventRepository,
}

impl EventService {
    pub fn new(repository: EventRepository) -> Self {
        EventService { repository }
    }

    pub async fn list(&self, session: &Session, query: &EventQuery) -> Result<EventPage, CustomError> {
        let (rows, total) = self.repository.list_page(&session.user_id, query).await?;
        let data = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total_pages = (total + query.limit - 1) / query.limit;
        Ok(EventPage {
            data,
            meta: PageMeta {
                total,
                page: query.page,
                limit: query.limit,
                total_pages,
            },
        })
    }

    pub async fn analytics(&self, session: &Session) -> Result<AnalyticsReport, CustomError> {
        let events = self
            .repository
            .list_all(&session.user_id)
            .await?
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        AnalyticsReport::from_events(&events)
    }
}
