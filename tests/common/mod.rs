#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower::ServiceExt;

use freshfit::api::{create_routes, AppState};
use freshfit::auth::{AuthService, JwtService, StoreDirectory};
use freshfit::store::{into_document, Collection, DocumentStore, InMemoryStore};

pub const TEST_SECRET: &str = "test_secret_key_for_testing_only";

/// Router wired to an in-memory store, plus handles to seed it
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub jwt_service: JwtService,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let jwt_service = JwtService::new(TEST_SECRET);
        let directory = Arc::new(StoreDirectory::new(store.clone()));
        let auth_service = AuthService::new(jwt_service.clone(), directory);
        let router = create_routes(AppState::new(auth_service, store.clone()));

        Self {
            store,
            jwt_service,
            router,
        }
    }

    /// Insert a user record and return its id
    pub async fn seed_user(&self, email: &str, role: Option<&str>) -> String {
        let mut user = json!({ "email": email, "name": email.split('@').next() });
        if let Some(role) = role {
            user["role"] = json!(role);
        }
        self.seed(Collection::Users, user).await
    }

    pub async fn seed(&self, collection: Collection, document: Value) -> String {
        self.store
            .insert_one(collection, into_document(document).unwrap())
            .await
            .unwrap()
            .inserted_id
    }

    pub fn token_for(&self, email: &str) -> String {
        self.jwt_service.issue(email, Map::new()).unwrap()
    }

    pub fn token_issued_at(&self, email: &str, issued_at: DateTime<Utc>) -> String {
        self.jwt_service.issue_at(email, Map::new(), issued_at).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization = token.map(|token| format!("Bearer {}", token));
        self.send_raw(method, uri, authorization.as_deref(), body).await
    }

    /// Send with a verbatim `Authorization` header value
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }
}
