//! Throwaway auth backend for async tests.
//!
//! Accepts password `pw` on `/login`, token `good` on `/check-token`,
//! answers 503 for token `down`, and rejects everything else with 401.
//! `/register` refuses `taken@b.com` and accepts everything else, with
//! odd bodies for `silent@b.com` and `partial@b.com`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::api::AuthClient;

pub(crate) const GOOD_PASSWORD: &str = "pw";
pub(crate) const GOOD_TOKEN: &str = "good";
pub(crate) const OUTAGE_TOKEN: &str = "down";
pub(crate) const TAKEN_EMAIL: &str = "taken@b.com";
/// `/register` accepts this email with an empty 201
pub(crate) const SILENT_EMAIL: &str = "silent@b.com";
/// `/register` accepts this email and echoes a user without `email`
pub(crate) const PARTIAL_EMAIL: &str = "partial@b.com";

pub(crate) struct MockBackend {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));

        let login_hits = hits.clone();
        let register_hits = hits.clone();
        let check_hits = hits.clone();

        let app = Router::new()
            .route(
                "/login",
                post(move |Json(body): Json<Value>| {
                    let hits = login_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        if body["password"] == GOOD_PASSWORD {
                            let email = body["email"].as_str().unwrap_or_default();
                            (StatusCode::OK, Json(json!({ "user": user_json(email), "token": "t1" })))
                        } else {
                            (
                                StatusCode::UNAUTHORIZED,
                                Json(json!({ "message": "Invalid credentials", "statusCode": 401 })),
                            )
                        }
                    }
                }),
            )
            .route(
                "/register",
                post(move |Json(body): Json<Value>| {
                    let hits = register_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let email = body["email"].as_str().unwrap_or_default();
                        match email {
                            TAKEN_EMAIL => (
                                StatusCode::BAD_REQUEST,
                                Json(json!({ "message": [format!("{} already exists", TAKEN_EMAIL)] })),
                            )
                                .into_response(),
                            SILENT_EMAIL => StatusCode::CREATED.into_response(),
                            PARTIAL_EMAIL => (
                                StatusCode::CREATED,
                                Json(json!({ "user": { "_id": "1", "name": body["name"] } })),
                            )
                                .into_response(),
                            _ => {
                                let mut user = user_json(email);
                                user["name"] = body["name"].clone();
                                (StatusCode::CREATED, Json(json!({ "user": user, "token": "r1" })))
                                    .into_response()
                            }
                        }
                    }
                }),
            )
            .route(
                "/check-token",
                get(move |headers: HeaderMap| {
                    let hits = check_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let auth = headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        if auth == format!("Bearer {}", GOOD_TOKEN) {
                            (
                                StatusCode::OK,
                                Json(json!({ "user": user_json("a@b.com"), "token": "t2" })),
                            )
                        } else if auth == format!("Bearer {}", OUTAGE_TOKEN) {
                            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                        } else {
                            (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" })))
                        }
                    }
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn client(&self) -> AuthClient {
        AuthClient::new(self.base_url.clone()).unwrap()
    }

    /// Number of requests the backend has served
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub(crate) fn user_json(email: &str) -> Value {
    json!({
        "_id": "u1",
        "email": email,
        "name": "Ana",
        "isActive": true,
        "roles": ["user"]
    })
}

/// A client pointed at a port nothing listens on
pub(crate) async fn unreachable_client() -> AuthClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    AuthClient::new(format!("http://{}", addr)).unwrap()
}
