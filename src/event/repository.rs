use sqlx::{AnyConnection, AnyPool};

use super::model::{Event, EventQuery, EventRow};
use crate::error::CustomError;

const EVENT_COLUMNS: &str = "id, user_id, account_id, category, subcategory, source, delta, \
     balance_after, currency, timestamp, month, note";

pub struct EventRepository {
    pool: AnyPool,
}

impl EventRepository {
    pub fn new(pool: AnyPool) -> Self {
        EventRepository { pool }
    }

    /// Only called from inside a balance mutation's transaction.
    pub(crate) async fn insert(
        &self,
        conn: &mut AnyConnection,
        event: &Event,
    ) -> Result<(), CustomError> {
        let row = EventRow::from(event);
        sqlx::query(&format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.account_id)
        .bind(row.category)
        .bind(row.subcategory)
        .bind(row.source)
        .bind(row.delta)
        .bind(row.balance_after)
        .bind(row.currency)
        .bind(row.timestamp)
        .bind(row.month)
        .bind(row.note)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Newest first, with the total count of matching rows.
    pub async fn list_page(
        &self,
        user_id: &str,
        query: &EventQuery,
    ) -> Result<(Vec<EventRow>, i64), CustomError> {
        let mut binds = vec![user_id.to_string()];
        let mut conditions = vec!["user_id = $1".to_string()];
        if let Some(source) = &query.source {
            binds.push(source.clone());
            conditions.push(format!("source = ${}", binds.len()));
        }
        if let Some(category) = &query.category {
            binds.push(category.clone());
            conditions.push(format!("category = ${}", binds.len()));
        }
        let where_clause = conditions.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM events WHERE {where_clause}");
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let (total,) = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE {where_clause} \
             ORDER BY timestamp DESC, id DESC LIMIT ${} OFFSET ${}",
            binds.len() + 1,
            binds.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, EventRow>(&list_sql);
        for value in &binds {
            list_query = list_query.bind(value);
        }
        let rows = list_query
            .bind(query.limit)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn list_all(&self, user_id: &str) -> Result<Vec<EventRow>, CustomError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = $1 ORDER BY timestamp, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub(crate) async fn delete_all(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
    ) -> Result<u64, CustomError> {
        let result = sqlx::query("DELETE FROM events WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
