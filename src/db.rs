use sqlx::{AnyPool, Pool};
use tracing::info;

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS balances (
        user_id TEXT PRIMARY KEY,
        updated_at BIGINT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS manual_assets (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        label TEXT NOT NULL,
        category TEXT NOT NULL,
        sub_category TEXT NOT NULL,
        currency TEXT NOT NULL,
        balance TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        account_id TEXT NOT NULL,
        category TEXT NOT NULL,
        subcategory TEXT,
        source TEXT NOT NULL,
        delta TEXT NOT NULL,
        balance_after TEXT NOT NULL,
        currency TEXT NOT NULL,
        timestamp BIGINT NOT NULL,
        month TEXT,
        note TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS manual_assets_user_idx ON manual_assets (user_id)",
    "CREATE INDEX IF NOT EXISTS events_user_ts_idx ON events (user_id, timestamp)",
];

pub struct Database;

impl Database {
    pub async fn new_pool(url: &str, max_connections: u32) -> Result<AnyPool, sqlx::Error> {
        sqlx::any::install_default_drivers();
        sqlx::any::AnyPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(30))
            .connect(url)
            .await
    }

    pub async fn migrate(pool: &Pool<sqlx::Any>) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("database schema ready");
        Ok(())
    }

    pub fn log_pool_stats(pool: &AnyPool) {
        info!(
            total = pool.size(),
            idle = pool.num_idle(),
            "db pool stats"
        );
    }
}
