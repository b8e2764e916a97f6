//! HTTP client for the authentication backend.
//!
//! This module provides the `AuthClient` struct, a thin typed wrapper over
//! `reqwest` for the login, register and check-token endpoints.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{CheckTokenResponse, LoginResponse, RegisterResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "login";
const REGISTER_PATH: &str = "register";
const CHECK_TOKEN_PATH: &str = "check-token";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// API client for the auth endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `POST /login` with `{email, password}`
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(LOGIN_PATH);
        debug!(url = %url, "Sending login request");
        self.post(&url, &LoginRequest { email, password }).await
    }

    /// `POST /register` with `{name, email, password}`
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        let url = self.endpoint(REGISTER_PATH);
        debug!(url = %url, "Sending register request");

        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest { name, email, password })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        Ok(RegisterResponse::from_body(&body))
    }

    /// `GET /check-token` with the token as a bearer credential
    pub async fn check_token(&self, token: &str) -> Result<CheckTokenResponse, ApiError> {
        let url = self.endpoint(CHECK_TOKEN_PATH);
        debug!(url = %url, "Sending check-token request");

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T, ApiError> {
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Auth endpoint returned an error status");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }
}
