//! Common test infrastructure for HTTP tests.
//!
//! Builds the full router over the in-memory store so requests exercise
//! middleware, extractors, services and repositories together.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use gymdesk_config::{BootstrapAdmin, GymConfig, SecurityConfig, ServerConfig};
use gymdesk_core::SystemClock;
use gymdesk_repository::memory::MemoryStore;
use gymdesk_repository::Repositories;
use gymdesk_rest::create_router;
use gymdesk_service::Services;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@gym.test";
pub const PASSWORD: &str = "Secret123";

/// A router wired to a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub services: Services,
}

/// Status, headers and decoded JSON body of one response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::memory(Arc::clone(&store));

        // Cheap hashing keeps the suite fast.
        let security = SecurityConfig {
            password_memory_cost_kib: 64,
            password_time_cost: 1,
            ..SecurityConfig::default()
        };
        let services = Services::new(
            &repos,
            Arc::new(security),
            GymConfig::default(),
            Arc::new(SystemClock),
        );

        services
            .auth
            .bootstrap_admin(&BootstrapAdmin {
                email: ADMIN_EMAIL.to_string(),
                password: PASSWORD.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
            })
            .await
            .expect("Failed to bootstrap admin");

        let router = create_router(services.clone(), &ServerConfig::default());

        Self {
            router,
            store,
            services,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Logs in and returns the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.data()["access_token"]
            .as_str()
            .expect("access token missing")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, PASSWORD).await
    }

    /// Registers a member with a monthly membership; returns (user id, token).
    pub async fn register_member(&self, first_name: &str, email: &str) -> (String, String) {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "first_name": first_name,
                    "last_name": "Tester",
                    "email": email,
                    "password": PASSWORD,
                    "membership_type": "monthly",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register failed: {}", response.body);

        let data = response.data();
        (
            data["user"]["id"].as_str().expect("user id missing").to_string(),
            data["access_token"].as_str().expect("token missing").to_string(),
        )
    }

    /// Creates a trainer as admin; returns (trainer id, token).
    pub async fn create_trainer(&self, admin: &str, email: &str) -> (String, String) {
        let response = self
            .post(
                "/api/v1/trainers",
                admin,
                json!({
                    "first_name": "Tom",
                    "last_name": "Coach",
                    "email": email,
                    "password": PASSWORD,
                    "specialization": "Strength",
                    "experience_years": 5,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "trainer create failed: {}", response.body);

        let id = response.data()["id"].as_str().expect("trainer id missing").to_string();
        (id, self.login(email, PASSWORD).await)
    }
}
