use crate::error::CustomError;

use super::model::User;

pub struct AuthRepository {
    pool: sqlx::AnyPool,
}

impl AuthRepository {
    pub fn new(pool: sqlx::AnyPool) -> Self {
        AuthRepository { pool }
    }

    pub async fn query_user(&self, username: &str) -> Result<Option<User>, CustomError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts the user together with their empty balance record.
    pub async fn insert_user(&self, new_user: &User, now_ms: i64) -> Result<(), CustomError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password)
            VALUES ($1, $2, $3)"#,
        )
        .bind(&new_user.id)
        .bind(&new_user.username)
        .bind(&new_user.password)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => CustomError::UsernameExists,
            e => CustomError::DBError(e),
        })?;

        sqlx::query("INSERT INTO balances (user_id, updated_at) VALUES ($1, $2)")
            .bind(&new_user.id)
            .bind(now_ms)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
