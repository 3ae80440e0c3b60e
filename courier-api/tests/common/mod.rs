//! Common test utilities for integration tests
//!
//! - In-memory database with migrations applied
//! - A dispatcher that records codes instead of sending them
//! - Seeding helpers and a request helper driving the real router

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use courier_api::app::{build_router, AppState};
use courier_api::config::Config;
use courier_shared::auth::{basic::BasicCredentials, password};
use courier_shared::db::{migrations::run_migrations, pool::create_pool};
use courier_shared::dispatch::{CodeDispatcher, DispatchError, DispatchResult};
use courier_shared::models::{Contact, CreateUser, Message, NewContact, User};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tower::Service as _;

/// Captures every dispatched `(phone, code)` pair
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Code most recently sent to `phone`
    pub fn code_for(&self, phone: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code)
    }
}

#[async_trait]
impl CodeDispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(&self, phone: &str, code: &str) -> DispatchResult<()> {
        if self.fail {
            return Err(DispatchError::DeliveryFailed("gateway down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}

/// Response status and body text
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("Body is not JSON ({}): {}", e, self.body))
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_dispatcher(RecordingDispatcher::default()).await
    }

    pub async fn with_dispatcher(dispatcher: RecordingDispatcher) -> anyhow::Result<Self> {
        let config = Config::for_tests();

        let db = create_pool(config.pool_config()).await?;
        run_migrations(&db).await?;

        let dispatcher = Arc::new(dispatcher);
        let state = AppState::new(db.clone(), dispatcher.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, dispatcher })
    }

    /// Inserts a user whose password is `plain_password`
    pub async fn seed_user(&self, username: &str, plain_password: &str) -> User {
        User::create(
            &self.db,
            CreateUser {
                username: username.to_string(),
                password_hash: password::hash_password(plain_password).unwrap(),
                phone: None,
            },
        )
        .await
        .unwrap()
    }

    /// Inserts one contact for `user`
    pub async fn seed_contact(&self, user: &User, local_id: i64, name: &str) -> Contact {
        Contact::upsert_many(
            &self.db,
            user.id,
            &[NewContact {
                local_id,
                name: name.to_string(),
            }],
        )
        .await
        .unwrap();

        Contact::find_by_local_id(&self.db, user.id, local_id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn seed_message(&self, contact: &Contact, body: &str) -> Message {
        Message::create(&self.db, contact.id, body).await.unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.db)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, auth: Option<(&str, &str)>) -> TestResponse {
        self.send("GET", uri, auth, None).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        auth: Option<(&str, &str)>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        self.send("POST", uri, auth, Some(form_encode(fields))).await
    }

    /// Sends a request with a raw `Authorization` header value
    pub async fn post_form_with_header(
        &self,
        uri: &str,
        authorization: &str,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_encode(fields)))
            .unwrap();
        self.call(request).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<(&str, &str)>,
        form: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some((username, password)) = auth {
            builder = builder.header(header::AUTHORIZATION, basic_auth(username, password));
        }

        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        self.call(builder.body(body).unwrap()).await
    }

    async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

/// `Authorization` header value for the pair
pub fn basic_auth(username: &str, password: &str) -> String {
    BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    }
    .to_header()
}

/// `application/x-www-form-urlencoded` encoding, as axum's `Form` expects it
pub fn form_encode(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}
