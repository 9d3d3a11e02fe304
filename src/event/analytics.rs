//! Statistics derived purely from the event log. Current asset balances are
//! never consulted, so charts survive asset deletion unchanged.

use rust_decimal::Decimal;
use serde::Serialize;
use std::{cmp::Ordering, collections::BTreeMap};

use super::model::Event;
use crate::{constants::TOP_MOVERS, error::CustomError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub net_change: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMovers {
    pub gains: Vec<Event>,
    pub losses: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub net_total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub daily_stats: Vec<DailyStat>,
    pub top_events: TopMovers,
    pub summary: Summary,
}

impl AnalyticsReport {
    pub fn from_events(events: &[Event]) -> Result<Self, CustomError> {
        Ok(AnalyticsReport {
            daily_stats: daily_stats(events)?,
            top_events: top_movers(events),
            summary: summary(events)?,
        })
    }
}

fn accumulate(total: &mut Decimal, delta: Decimal) -> Result<(), CustomError> {
    *total = total
        .checked_add(delta)
        .ok_or_else(|| CustomError::CorruptData("event totals out of range".to_string()))?;
    Ok(())
}

/// Ascending by date. Running totals are left to the caller.
pub fn daily_stats(events: &[Event]) -> Result<Vec<DailyStat>, CustomError> {
    let mut days: BTreeMap<String, DailyStat> = BTreeMap::new();
    for event in events {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let day = days.entry(date.clone()).or_insert_with(|| DailyStat {
            date,
            net_change: Decimal::ZERO,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            transaction_count: 0,
        });
        accumulate(&mut day.net_change, event.delta)?;
        if event.delta > Decimal::ZERO {
            accumulate(&mut day.income, event.delta)?;
        } else if event.delta < Decimal::ZERO {
            accumulate(&mut day.expense, event.delta)?;
        }
        day.transaction_count += 1;
    }
    Ok(days.into_values().collect())
}

pub fn top_movers(events: &[Event]) -> TopMovers {
    let newest_first = |a: &&Event, b: &&Event| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id));

    let mut gains: Vec<&Event> = events.iter().filter(|e| e.delta > Decimal::ZERO).collect();
    gains.sort_by(|a, b| match b.delta.cmp(&a.delta) {
        Ordering::Equal => newest_first(a, b),
        other => other,
    });

    let mut losses: Vec<&Event> = events.iter().filter(|e| e.delta < Decimal::ZERO).collect();
    losses.sort_by(|a, b| match a.delta.cmp(&b.delta) {
        Ordering::Equal => newest_first(a, b),
        other => other,
    });

    TopMovers {
        gains: gains.into_iter().take(TOP_MOVERS).cloned().collect(),
        losses: losses.into_iter().take(TOP_MOVERS).cloned().collect(),
    }
}

pub fn summary(events: &[Event]) -> Result<Summary, CustomError> {
    events.iter().try_fold(Summary::default(), |mut acc, event| {
        if event.delta > Decimal::ZERO {
            accumulate(&mut acc.total_in, event.delta)?;
        } else {
            accumulate(&mut acc.total_out, event.delta)?;
        }
        accumulate(&mut acc.net_total, event.delta)?;
        Ok(acc)
    })
}
