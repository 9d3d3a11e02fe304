use chrono::{TimeZone, Utc};
use common::{controllers, event_service, json, setup_test_db};
use moonstone::{
    auth::model::Session,
    constants::{BAD_REQUEST, OK_RESPONSE},
    event::model::{EventQuery, EventSource},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
mod common;

fn caller(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        username: user_id.to_string(),
    }
}

async fn insert_event(
    pool: &sqlx::AnyPool,
    id: &str,
    user_id: &str,
    source: &str,
    category: &str,
    delta: &str,
    timestamp_ms: i64,
) {
    sqlx::query(
        r#"
        INSERT INTO events
            (id, user_id, account_id, category, subcategory, source, delta,
             balance_after, currency, timestamp, month, note)
        VALUES ($1, $2, 'acc-1', $3, 'General', $4, $5, '0', 'HUF', $6, NULL, NULL)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(category)
    .bind(source)
    .bind(delta)
    .bind(timestamp_ms)
    .execute(pool)
    .await
    .expect("Failed to insert test event");
}

fn at(day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0)
        .unwrap()
        .timestamp_millis()
}

async fn seed(pool: &sqlx::AnyPool) {
    let rows = [
        ("e01", "MANUAL", "BANK", "500", at(2, 9)),
        ("e02", "MANUAL", "CASH", "-120.5", at(1, 23)),
        ("e03", "SALARY", "BANK", "300000", at(5, 0)),
        ("e04", "MANUAL", "BANK", "-30", at(2, 10)),
        ("e05", "SALARY", "INCOME", "250000", at(3, 8)),
        ("e06", "MANUAL", "INVESTMENT", "-2000", at(5, 12)),
        ("e07", "MANUAL", "BANK", "1000", at(1, 1)),
    ];
    for (id, source, category, delta, ts) in rows {
        insert_event(pool, id, "u-1", source, category, delta, ts).await;
    }
    insert_event(pool, "x01", "u-2", "MANUAL", "BANK", "99999", at(4, 4)).await;
}

#[tokio::test]
async fn source_filter_returns_newest_first() {
    let pool = setup_test_db().await;
    seed(&pool).await;

    let query = EventQuery {
        source: Some("MANUAL".to_string()),
        ..EventQuery::default()
    };
    let page = event_service(&pool).list(&caller("u-1"), &query).await.unwrap();

    assert_eq!(page.meta.total, 5);
    assert!(page.data.iter().all(|e| e.source == EventSource::Manual));
    assert!(page.data.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    let ids: Vec<&str> = page.data.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e06", "e04", "e01", "e02", "e07"]);
}

#[tokio::test]
async fn category_filter_and_paging() {
    let pool = setup_test_db().await;
    seed(&pool).await;
    let events = event_service(&pool);

    let query = EventQuery {
        category: Some("BANK".to_string()),
        page: 2,
        limit: 2,
        ..EventQuery::default()
    };
    let page = events.list(&caller("u-1"), &query).await.unwrap();
    assert_eq!(page.meta.total, 4);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.meta.page, 2);
    let ids: Vec<&str> = page.data.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e01", "e07"]);

    let past_the_end = EventQuery {
        page: 9,
        limit: 3,
        ..EventQuery::default()
    };
    let page = events.list(&caller("u-1"), &past_the_end).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.meta.total, 7);
    assert_eq!(page.meta.total_pages, 3);
}

#[tokio::test]
async fn analytics_totals_agree_with_daily_stats() {
    let pool = setup_test_db().await;
    seed(&pool).await;

    let report = event_service(&pool).analytics(&caller("u-1")).await.unwrap();

    let dates: Vec<&str> = report.daily_stats.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-05"]);

    let net: Decimal = report.daily_stats.iter().map(|d| d.net_change).sum();
    let income: Decimal = report.daily_stats.iter().map(|d| d.income).sum();
    let expense: Decimal = report.daily_stats.iter().map(|d| d.expense).sum();
    assert_eq!(net, report.summary.net_total);
    assert_eq!(income, report.summary.total_in);
    assert_eq!(expense, report.summary.total_out);
    assert_eq!(report.summary.total_in, dec!(551500));
    assert_eq!(report.summary.total_out, dec!(-2150.5));
    assert_eq!(report.summary.net_total, dec!(549349.5));

    let gains: Vec<&str> = report.top_events.gains.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(gains, ["e03", "e05", "e07"]);
    let losses: Vec<&str> = report.top_events.losses.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(losses, ["e06", "e02", "e04"]);
}

#[tokio::test]
async fn analytics_for_user_without_events_is_empty() {
    let pool = setup_test_db().await;
    let report = event_service(&pool).analytics(&caller("nobody")).await.unwrap();

    assert!(report.daily_stats.is_empty());
    assert!(report.top_events.gains.is_empty());
    assert_eq!(report.summary.net_total, Decimal::ZERO);
}

#[tokio::test]
async fn controller_parses_query_params() {
    let pool = setup_test_db().await;
    seed(&pool).await;
    let controllers = controllers(&pool);

    let params = HashMap::from([
        ("source".to_string(), "salary".to_string()),
        ("limit".to_string(), "500".to_string()),
    ]);
    let (status, body) = controllers.events.events(&caller("u-1"), &params).await;
    assert_eq!(status, OK_RESPONSE.to_string());
    let body = json(&body);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["limit"], 100);
    assert_eq!(body["data"][0]["id"], "e03");

    let params = HashMap::from([("page".to_string(), "two".to_string())]);
    let (status, _) = controllers.events.events(&caller("u-1"), &params).await;
    assert_eq!(status, BAD_REQUEST.to_string());
}
