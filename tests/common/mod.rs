#![allow(dead_code)]

use moonstone::{
    account::{controller::AccountController, repository::AccountRepository, service::AccountService},
    auth::{
        controller::AuthController, jwt::TokenKeys, model::Session, repository::AuthRepository,
        service::AuthService,
    },
    db::Database,
    event::{controller::EventController, repository::EventRepository, service::EventService},
    server::Controllers,
};
use rand::Rng;
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
};
use sqlx::{AnyPool, any::install_default_drivers};
use std::{collections::HashMap, sync::OnceLock};

/// Lowest cost bcrypt accepts; keeps password hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub async fn setup_test_db() -> AnyPool {
    install_default_drivers();
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    let db_name = format!("test_{}", suffix);
    let database_url = format!("sqlite:file:{}?mode=memory&cache=shared", db_name);

    // Create the pool (which will internally use shared memory DB)
    let pool = AnyPool::connect(&database_url)
        .await
        .expect("Failed to create in-memory SQLite DB");
    Database::migrate(&pool).await.expect("Failed to apply schema");

    pool
}

/// One RSA key pair per test binary; generating them is slow.
fn test_keys() -> &'static (String, String) {
    static KEYS: OnceLock<(String, String)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("Failed to generate key");
        let public = RsaPublicKey::from(&private);
        (
            private
                .to_pkcs8_pem(LineEnding::LF)
                .expect("Failed to encode private key")
                .to_string(),
            public
                .to_public_key_pem(LineEnding::LF)
                .expect("Failed to encode public key"),
        )
    })
}

pub fn token_keys() -> TokenKeys {
    let (private, public) = test_keys();
    TokenKeys::from_pem(private, public, 1).expect("Failed to load test keys")
}

pub fn auth_service(pool: &AnyPool) -> AuthService {
    AuthService::new(AuthRepository::new(pool.clone()), token_keys(), TEST_BCRYPT_COST)
}

pub fn account_service(pool: &AnyPool) -> AccountService {
    AccountService::new(
        AccountRepository::new(pool.clone()),
        EventRepository::new(pool.clone()),
    )
}

pub fn event_service(pool: &AnyPool) -> EventService {
    EventService::new(EventRepository::new(pool.clone()))
}

pub fn controllers(pool: &AnyPool) -> Controllers {
    Controllers {
        auth: AuthController::new(auth_service(pool)),
        accounts: AccountController::new(account_service(pool)),
        events: EventController::new(event_service(pool)),
    }
}

pub fn bearer(token: &str) -> HashMap<String, String> {
    HashMap::from([("authorization".to_string(), format!("Bearer {token}"))])
}

/// Registers `username` and logs in, returning the bearer token.
pub async fn login_token(auth: &AuthController, username: &str) -> String {
    let body = format!(r#"{{"username":"{username}","password":"secret"}}"#);
    let (status, _) = auth.register(&body).await;
    assert!(status.contains("201"), "register failed: {status}");

    let (status, content) = auth.login(&body).await;
    assert!(status.contains("200"), "login failed: {status}");
    let json: serde_json::Value = serde_json::from_str(&content).expect("login body");
    json["token"].as_str().expect("token").to_string()
}

pub async fn session(controllers: &Controllers, username: &str) -> Session {
    let token = login_token(&controllers.auth, username).await;
    controllers
        .auth
        .session(&bearer(&token))
        .expect("session for fresh token")
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response body is JSON")
}
