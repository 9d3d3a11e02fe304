use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use uuid::Uuid;

use crate::{
    account::model::{Asset, decimal_to_db, parse_decimal},
    constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
    error::CustomError,
};

/// Where a balance change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    Manual,
    Salary,
    Onchain,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Manual => "MANUAL",
            EventSource::Salary => "SALARY",
            EventSource::Onchain => "ONCHAIN",
        }
    }
}

impl FromStr for EventSource {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANUAL" => Ok(EventSource::Manual),
            "SALARY" => Ok(EventSource::Salary),
            "ONCHAIN" => Ok(EventSource::Onchain),
            other => Err(CustomError::Validation(format!("unknown source '{other}'"))),
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One balance-affecting action. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub source: EventSource,
    pub delta: Decimal,
    pub balance_after: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

impl Event {
    /// Copies category, subcategory and currency off the asset as they are now.
    pub fn for_asset(
        user_id: &str,
        asset: &Asset,
        source: EventSource,
        delta: Decimal,
        balance_after: Decimal,
        month: Option<String>,
    ) -> Self {
        Event {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            account_id: asset.id.clone(),
            category: asset.category.as_str().to_string(),
            subcategory: Some(asset.sub_category.clone()),
            source,
            delta,
            balance_after,
            currency: asset.currency.clone(),
            timestamp: Utc::now(),
            metadata: month.map(|month| EventMetadata {
                month: Some(month),
                note: None,
            }),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub source: String,
    pub delta: String,
    pub balance_after: String,
    pub currency: String,
    pub timestamp: i64,
    pub month: Option<String>,
    pub note: Option<String>,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        let metadata = event.metadata.clone().unwrap_or_default();
        EventRow {
            id: event.id.clone(),
            user_id: event.user_id.clone(),
            account_id: event.account_id.clone(),
            category: event.category.clone(),
            subcategory: event.subcategory.clone(),
            source: event.source.as_str().to_string(),
            delta: decimal_to_db(event.delta),
            balance_after: decimal_to_db(event.balance_after),
            currency: event.currency.clone(),
            timestamp: event.timestamp.timestamp_millis(),
            month: metadata.month,
            note: metadata.note,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = CustomError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let source = row
            .source
            .parse()
            .map_err(|_| CustomError::CorruptData(format!("event source '{}'", row.source)))?;
        let timestamp = DateTime::from_timestamp_millis(row.timestamp)
            .ok_or_else(|| CustomError::CorruptData(format!("timestamp {}", row.timestamp)))?;
        let metadata = match (row.month, row.note) {
            (None, None) => None,
            (month, note) => Some(EventMetadata { month, note }),
        };
        Ok(Event {
            id: row.id,
            user_id: row.user_id,
            account_id: row.account_id,
            category: row.category,
            subcategory: row.subcategory,
            source,
            delta: parse_decimal(&row.delta)?,
            balance_after: parse_decimal(&row.balance_after)?,
            currency: row.currency,
            timestamp,
            metadata,
        })
    }
}

/// Filters and paging for the audit trail listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub source: Option<String>,
    pub category: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for EventQuery {
    fn default() -> Self {
        EventQuery {
            source: None,
            category: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl EventQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, CustomError> {
        let number = |key: &str, default: i64| -> Result<i64, CustomError> {
            match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| CustomError::Validation(format!("'{key}' must be a number"))),
                None => Ok(default),
            }
        };
        let text = |key: &str| params.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let page = number("page", 1)?.max(1);
        let limit = number("limit", DEFAULT_PAGE_LIMIT)?.clamp(1, MAX_PAGE_LIMIT);
        if (page - 1).checked_mul(limit).is_none() {
            return Err(CustomError::Validation("'page' is out of range".to_string()));
        }

        Ok(EventQuery {
            source: text("source").map(|s| s.to_uppercase()),
            category: text("category"),
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct EventPage {
    pub data: Vec<Event>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn query_defaults_and_normalises_source() {
        let query = EventQuery::from_params(&params(&[("source", "manual")])).unwrap();
        assert_eq!(query.source.as_deref(), Some("MANUAL"));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn query_clamps_paging() {
        let query = EventQuery::from_params(&params(&[("page", "0"), ("limit", "5000")])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_PAGE_LIMIT);

        let query = EventQuery::from_params(&params(&[("page", "3"), ("limit", "10")])).unwrap();
        assert_eq!(query.offset(), 20);

        let huge = i64::MAX.to_string();
        let overflow = EventQuery::from_params(&params(&[("page", huge.as_str())]));
        assert!(matches!(overflow, Err(CustomError::Validation(_))));

        let built = EventQuery {
            page: i64::MAX,
            limit: MAX_PAGE_LIMIT,
            ..EventQuery::default()
        };
        assert_eq!(built.offset(), i64::MAX);
    }

    #[test]
    fn query_rejects_garbage_numbers() {
        assert!(EventQuery::from_params(&params(&[("limit", "ten")])).is_err());
    }
}
