use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;

use nestly_core::models::{IdentityProfile, User};
use nestly_core::webhook::WebhookVerifier;
use nestly_core::UserRole;
use nestly_db::Database;
use nestly_server::auth::SessionVerifier;
use nestly_server::routes;
use nestly_server::state::AppState;

pub const TEST_SESSION_SECRET: &str = "nestly-test-session-secret";
// base64("nestly-test-webhook-secret")
pub const TEST_WEBHOOK_SECRET: &str = "whsec_bmVzdGx5LXRlc3Qtd2ViaG9vay1zZWNyZXQ=";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _container: ContainerAsync<GenericImage>,
}

/// Spin up a PostgreSQL container and build the router around it, with
/// HS256 sessions, a webhook secret, and no directory or storage.
pub async fn setup_test_app() -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "nestly_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/nestly_test");
    let db = Database::from_pool(retry_connect(&url).await);
    db.migrate().await.expect("Failed to run migrations");

    let state = Arc::new(AppState {
        db: db.clone(),
        sessions: SessionVerifier::hs256(TEST_SESSION_SECRET, None),
        directory: None,
        storage: None,
        webhook: Some(WebhookVerifier::new(TEST_WEBHOOK_SECRET).unwrap()),
    });

    TestApp {
        router: routes::router(state),
        db,
        _container: container,
    }
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(5).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}

/// Mint a session token for `clerk_id`, optionally carrying profile claims.
pub fn token(clerk_id: &str, email: Option<&str>) -> String {
    let mut claims = serde_json::json!({
        "sub": clerk_id,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let Some(email) = email {
        claims["email"] = email.into();
        claims["first_name"] = "Jane".into();
        claims["last_name"] = "Tenant".into();
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SESSION_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn create_user(db: &Database, clerk_id: &str, role: UserRole) -> User {
    db.users()
        .upsert_identity(&IdentityProfile {
            clerk_id: clerk_id.into(),
            email: format!("{clerk_id}@example.com"),
            first_name: Some("Test".into()),
            last_name: Some(clerk_id.into()),
            role: Some(role),
        })
        .await
        .expect("Failed to create user")
}

impl TestApp {
    /// Send a JSON request and decode the JSON reply (`Null` for empty bodies).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    /// Create a listing through the API as `landlord_token`, returning its id.
    pub async fn create_listing(&self, landlord_token: &str, title: &str, price: f64) -> String {
        let (status, json) = self
            .call(
                Method::POST,
                "/api/properties",
                Some(landlord_token),
                Some(serde_json::json!({
                    "title": title,
                    "price": price,
                    "address": "123 Main Street",
                    "city": "San Francisco",
                    "bedrooms": 2,
                    "bathrooms": 1,
                    "amenities": ["WiFi", "Parking"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }
}
