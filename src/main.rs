use anyhow::{Context, Result};
use moonstone::{
    account::{controller::AccountController, repository::AccountRepository, service::AccountService},
    auth::{
        controller::AuthController, jwt::TokenKeys, repository::AuthRepository,
        service::AuthService,
    },
    config::Config,
    db::Database,
    event::{controller::EventController, repository::EventRepository, service::EventService},
    server::{Controllers, Server},
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load config")?;

    let pool = Database::new_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to create DB pool")?;
    Database::migrate(&pool).await.context("Failed to apply schema")?;
    Database::log_pool_stats(&pool);

    let keys = TokenKeys::from_pem(
        &config.jwt_private_key,
        &config.jwt_public_key,
        config.token_ttl_hours,
    )
    .context("Failed to load JWT keys")?;

    let auth = AuthController::new(AuthService::new(
        AuthRepository::new(pool.clone()),
        keys,
        config.bcrypt_cost,
    ));
    if let Some(admin) = &config.admin {
        auth.seed_admin(&admin.username, &admin.password)
            .await
            .context("Failed to seed admin user")?;
        info!(username = %admin.username, "admin user present");
    }

    let controllers = Arc::new(Controllers {
        auth,
        accounts: AccountController::new(AccountService::new(
            AccountRepository::new(pool.clone()),
            EventRepository::new(pool.clone()),
        )),
        events: EventController::new(EventService::new(EventRepository::new(pool.clone()))),
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
        }
        let _ = shutdown_tx.send(());
    });

    let server = Server::new(controllers);
    server.start(&config.bind_addr, shutdown_rx).await?;

    pool.close().await;
    Ok(())
}
