use common::{TEST_BCRYPT_COST, auth_service, bearer, json, login_token, setup_test_db};
use moonstone::{
    auth::{controller::AuthController, model::User},
    constants::{BAD_REQUEST, CONFLICT, CREATED, OK_RESPONSE, UNAUTHORIZED},
    utils::encrypt,
};
use tokio_test::{assert_err, assert_ok};
mod common;

#[cfg(test)]
pub async fn get_controller() -> (sqlx::AnyPool, AuthController) {
    let pool = setup_test_db().await;
    let controller = AuthController::new(auth_service(&pool));
    (pool, controller)
}

#[tokio::test]
async fn register_creates_user_and_balance_record() {
    let (pool, controller) = get_controller().await;

    let response = controller
        .register(r#"{"username":"test_1","password":"hashed_password"}"#)
        .await;
    assert_eq!(response.0, CREATED.to_string());
    let body = json(&response.1);
    assert_eq!(body["username"], "test_1");
    let user_id = body["userId"].as_str().unwrap().to_string();

    let (records,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM balances WHERE user_id = $1")
        .bind(&user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 1);
}

#[tokio::test]
async fn register_duplicate_username_conflicts() {
    let (_pool, controller) = get_controller().await;
    let body = r#"{"username":"test_2","password":"secret"}"#;

    assert_eq!(controller.register(body).await.0, CREATED.to_string());
    let response = controller.register(body).await;
    assert_eq!(response.0, CONFLICT.to_string());
}

#[tokio::test]
async fn register_requires_both_fields() {
    let (_pool, controller) = get_controller().await;
    let response = controller.register(r#"{"username":"only_name"}"#).await;
    assert_eq!(response.0, BAD_REQUEST.to_string());
}

#[tokio::test]
async fn login_user_success_and_validate() {
    let (_pool, controller) = get_controller().await;
    let token = login_token(&controller, "test_3").await;

    let response = controller.validate(&bearer(&token));
    assert_eq!(response.0, OK_RESPONSE.to_string());
    let session = json(&response.1);
    assert_eq!(session["username"], "test_3");
    assert!(session["userId"].as_str().is_some());
}

#[tokio::test]
async fn login_user_unauthorized_not_registered() {
    let (_pool, controller) = get_controller().await;
    let response = controller
        .login(r#"{"username":"nobody","password":"hashed_password"}"#)
        .await;

    assert_eq!(response.0, UNAUTHORIZED.to_string());
}

#[tokio::test]
async fn login_user_unauthorized_wrong_password() {
    let (pool, controller) = get_controller().await;
    let user = User {
        id: "u-4".to_string(),
        username: "test_4".to_string(),
        password: encrypt("different password", TEST_BCRYPT_COST).unwrap(),
    };
    sqlx::query("INSERT INTO users (id, username, password) VALUES ($1, $2, $3)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .execute(&pool)
        .await
        .expect("Failed to insert test user");

    let response = controller
        .login(r#"{"username":"test_4","password":"hashed_password"}"#)
        .await;

    assert_eq!(response.0, UNAUTHORIZED.to_string());
    assert_eq!(json(&response.1)["error"], "Username or password is incorrect");
}

#[tokio::test]
async fn session_rejects_missing_and_forged_tokens() {
    let (_pool, controller) = get_controller().await;

    let (status, _) = controller.validate(&Default::default());
    assert_eq!(status, UNAUTHORIZED.to_string());

    assert_err!(controller.session(&bearer("not.a.jwt")));
}

#[tokio::test]
async fn seed_admin_is_idempotent() {
    let (_pool, controller) = get_controller().await;
    assert_ok!(controller.seed_admin("admin", "admin-pass").await);
    assert_ok!(controller.seed_admin("admin", "admin-pass").await);

    let response = controller
        .login(r#"{"username":"admin","password":"admin-pass"}"#)
        .await;
    assert_eq!(response.0, OK_RESPONSE.to_string());
}
