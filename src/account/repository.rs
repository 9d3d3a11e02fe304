use sqlx::{Any, AnyConnection, AnyPool, Transaction};

use super::model::AssetRow;
use crate::error::CustomError;

pub struct AccountRepository {
    pool: AnyPool,
}

impl AccountRepository {
    pub fn new(pool: AnyPool) -> Self {
        AccountRepository { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Any>, CustomError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn record_updated_at(&self, user_id: &str) -> Result<Option<i64>, CustomError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT updated_at FROM balances WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn list_assets(&self, user_id: &str) -> Result<Vec<AssetRow>, CustomError> {
        let rows = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT id, user_id, label, category, sub_category, currency, balance, created_at
            FROM manual_assets
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Creates the user's record, or bumps `updated_at` if it already exists.
    pub async fn touch_record(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
        now_ms: i64,
    ) -> Result<(), CustomError> {
        sqlx::query(
            r#"
            INSERT INTO balances (user_id, updated_at)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(now_ms)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn find_asset(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
        asset_id: &str,
    ) -> Result<Option<AssetRow>, CustomError> {
        let row = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT id, user_id, label, category, sub_category, currency, balance, created_at
            FROM manual_assets
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(asset_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn find_asset_ids_by_label(
        &self,
        user_id: &str,
        label: &str,
    ) -> Result<Vec<String>, CustomError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT id FROM manual_assets WHERE user_id = $1 AND label = $2")
                .bind(user_id)
                .bind(label)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    pub async fn insert_asset(
        &self,
        conn: &mut AnyConnection,
        asset: &AssetRow,
    ) -> Result<(), CustomError> {
        sqlx::query(
            r#"
            INSERT INTO manual_assets
                (id, user_id, label, category, sub_category, currency, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&asset.id)
        .bind(&asset.user_id)
        .bind(&asset.label)
        .bind(&asset.category)
        .bind(&asset.sub_category)
        .bind(&asset.currency)
        .bind(&asset.balance)
        .bind(asset.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Writes `new_balance` only if the stored balance is still `expected`.
    /// Returns the number of rows changed (0 means another writer got there first).
    pub async fn compare_and_set_balance(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
        asset_id: &str,
        expected: &str,
        new_balance: &str,
    ) -> Result<u64, CustomError> {
        let result = sqlx::query(
            "UPDATE manual_assets SET balance = $1 WHERE id = $2 AND user_id = $3 AND balance = $4",
        )
        .bind(new_balance)
        .bind(asset_id)
        .bind(user_id)
        .bind(expected)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_asset(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
        asset_id: &str,
    ) -> Result<u64, CustomError> {
        let result = sqlx::query("DELETE FROM manual_assets WHERE id = $1 AND user_id = $2")
            .bind(asset_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all_assets(
        &self,
        conn: &mut AnyConnection,
        user_id: &str,
    ) -> Result<u64, CustomError> {
        let result = sqlx::query("DELETE FROM manual_assets WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
