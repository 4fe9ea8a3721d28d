#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = student_bay::config::jwt::JwtConfig::from_env().unwrap();
        let _ = student_bay::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub upload_dir: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.addr, path)
    }
}

/// Spawn the app on an ephemeral port against a fresh SQLite file.
pub async fn spawn_app() -> TestApp {
    init_env();

    let counter = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let tag = format!("{}_{}", std::process::id(), counter);

    let db_path = std::env::temp_dir().join(format!("student_bay_test_{}.db", tag));
    let _ = std::fs::remove_file(&db_path);
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    student_bay::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let pending = student_bay::services::pending::PendingStore::new(chrono::Duration::hours(24));
    let upload_dir = std::env::temp_dir()
        .join(format!("student_bay_uploads_{}", tag))
        .display()
        .to_string();
    let upload_config = student_bay::services::upload::UploadConfig {
        upload_dir: upload_dir.clone(),
    };
    let email_service = student_bay::services::email::EmailService::from_env();

    let app = axum::Router::new()
        .merge(student_bay::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(pending))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(email_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        upload_dir,
    }
}

/// Register a student, complete verification, and log in.
/// Returns (user_id, token, email).
pub async fn create_verified_user(app: &TestApp, prefix: &str) -> (String, String, String) {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let email = format!("{}_{}@uni.edu", prefix, counter);

    let resp = app
        .client
        .post(app.url("/users/register"))
        .json(&serde_json::json!({
            "email": email,
            "password": "abcd1234",
            "memberType": "STUDENT",
        }))
        .send()
        .await
        .expect("Failed to register user");
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("register response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "register failed for '{}': status={}, body={}",
        email,
        status,
        body
    );
    let temp_id = body["tempId"].as_str().expect("missing tempId").to_string();

    let resp = app
        .client
        .post(app.url("/users/verification/verify"))
        .json(&serde_json::json!({ "tempId": temp_id }))
        .send()
        .await
        .expect("Failed to verify user");
    let body: serde_json::Value = resp.json().await.expect("verify response not JSON");
    let user_id = body["userId"].as_str().expect("missing userId").to_string();

    let token = login(app, &email, "abcd1234").await;
    (user_id, token, email)
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let resp = app
        .client
        .post(app.url("/users/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("login response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "login failed for '{}': status={}, body={}",
        email,
        status,
        body
    );
    body["token"].as_str().expect("missing token").to_string()
}

/// Flip a user to the legacy GENERAL member type directly in the store.
pub async fn make_general_member(db: &DatabaseConnection, user_id: &str) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        "UPDATE users SET member_type = 'GENERAL' WHERE id = ?",
        [user_id.into()],
    ))
    .await
    .expect("Failed to update member type");
}

/// Create an item and return its id.
pub async fn create_test_item(
    app: &TestApp,
    token: &str,
    title: &str,
    category: &str,
    price: f64,
) -> String {
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "category": category,
            "price": price,
            "condition": "GOOD",
        }))
        .send()
        .await
        .expect("Failed to create item");
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("create item response not JSON");
    assert!(
        body["success"].as_bool().unwrap_or(false),
        "item create failed: status={}, body={}",
        status,
        body
    );
    body["itemId"].as_str().expect("missing itemId").to_string()
}
