//! API client for the waypool backend.
//!
//! This module provides the `ApiClient` for session, trip, reservation
//! and message endpoints. The bearer token is read from storage on
//! every request, so the client and the session layer can never
//! disagree about which credential is in use.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{
    ChatMessage, CreateTripRequest, LoginCredentials, RegisterCredentials, Reservation,
    SendMessageRequest, Trip, TripFilters, User,
};
use crate::storage::{SessionStore, StoreKeys};

use super::response::{normalize_auth_response, normalize_item, normalize_list};
use super::{ApiError, AuthPayload};

/// Backend operations the session layer depends on.
/// `ApiClient` is the production implementation; tests substitute stubs.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, ApiError>;
    async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthPayload, ApiError>;
    /// Best-effort session teardown on the backend, errors swallowed
    async fn logout(&self);
}

/// API client for the waypool backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a new API client reading credentials from `store`
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Bearer token from storage, `None` when signed out or unreadable
    async fn bearer_token(&self) -> Option<String> {
        match self.store.get(StoreKeys::AUTH_TOKEN).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read stored credential");
                None
            }
        }
    }

    /// Build request headers, attaching Authorization only when a
    /// credential is currently stored
    async fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.bearer_token().await {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "Stored credential is not a valid header value"),
            }
        }
        headers
    }

    /// Check if response is successful, returning an error with body if not.
    /// A 401 is reported, never acted on - the session layer owns the
    /// stored credential.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                debug!("Request rejected with 401, leaving the session to the caller");
            }
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .headers(self.auth_headers().await)
    }

    async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.request(Method::GET, path).await.send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn get_value_with_query<Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value, ApiError> {
        let response = self
            .request(Method::GET, path)
            .await
            .query(query)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn post_value<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let response = self
            .request(Method::POST, path)
            .await
            .json(body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn patch_value(&self, path: &str) -> Result<Value, ApiError> {
        let response = self
            .request(Method::PATCH, path)
            .await
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    // ===== Session Endpoints =====

    /// Exchange credentials for a token and profile via `POST /auth/login`
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, ApiError> {
        let body = self.post_value("/auth/login", credentials).await?;
        normalize_auth_response(&body)
    }

    /// Create an account and sign in via `POST /auth/register`
    pub async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthPayload, ApiError> {
        let body = self.post_value("/auth/register", credentials).await?;
        normalize_auth_response(&body)
    }

    /// Tell the backend the session is over. Best effort - the local
    /// session is cleared regardless of the outcome.
    pub async fn logout(&self) {
        if let Err(e) = self.post_value("/auth/logout", &serde_json::json!({})).await {
            debug!(error = %e, "Logout notification failed");
        }
    }

    /// Fetch the caller's profile via `GET /auth/profile`
    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        let body = self.get_value("/auth/profile").await?;
        normalize_item(body)
    }

    /// Check whether the stored credential is still accepted by the
    /// backend via `GET /auth/validate`. Only the response status
    /// counts; the body is ignored whatever its shape.
    pub async fn validate_token(&self) -> bool {
        let result = match self.request(Method::GET, "/auth/validate").await.send().await {
            Ok(response) => Self::check_response(response).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Token validation failed");
                false
            }
        }
    }

    // ===== Trip Endpoints =====

    /// Publish a new trip via `POST /trips`
    pub async fn create_trip(&self, request: &CreateTripRequest) -> Result<Trip, ApiError> {
        let body = self.post_value("/trips", request).await?;
        normalize_item(body)
    }

    /// Search published trips via `GET /trips`
    pub async fn search_trips(&self, filters: &TripFilters) -> Result<Vec<Trip>, ApiError> {
        let body = self.get_value_with_query("/trips", filters).await?;
        normalize_list(body)
    }

    // ===== Reservation Endpoints =====

    /// Request a seat on a trip via `POST /trips/{id}/reservations`
    pub async fn reserve_seat(&self, trip_id: &str) -> Result<Reservation, ApiError> {
        let path = format!("/trips/{}/reservations", trip_id);
        let body = self.post_value(&path, &serde_json::json!({})).await?;
        normalize_item(body)
    }

    /// List reservations on one of the caller's trips
    pub async fn trip_reservations(&self, trip_id: &str) -> Result<Vec<Reservation>, ApiError> {
        let path = format!("/trips/{}/reservations", trip_id);
        let body = self.get_value(&path).await?;
        normalize_list(body)
    }

    /// Accept a pending reservation via `PATCH /reservations/{id}/accept`
    pub async fn accept_reservation(&self, reservation_id: &str) -> Result<Reservation, ApiError> {
        let path = format!("/reservations/{}/accept", reservation_id);
        let body = self.patch_value(&path).await?;
        normalize_item(body)
    }

    /// Reject a pending reservation via `PATCH /reservations/{id}/reject`
    pub async fn reject_reservation(&self, reservation_id: &str) -> Result<Reservation, ApiError> {
        let path = format!("/reservations/{}/reject", reservation_id);
        let body = self.patch_value(&path).await?;
        normalize_item(body)
    }

    /// Upcoming confirmed rides for the caller via
    /// `GET /reservations/my-upcoming`
    pub async fn upcoming_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        let body = self.get_value("/reservations/my-upcoming").await?;
        normalize_list(body)
    }

    // ===== Message Endpoints =====

    /// Conversation with another user about a trip
    pub async fn messages(
        &self,
        trip_id: i64,
        other_user_id: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let path = format!("/messages/{}/{}", trip_id, other_user_id);
        let body = self.get_value(&path).await?;
        normalize_list(body)
    }

    /// Send a message in a trip conversation via `POST /messages`
    pub async fn send_message(
        &self,
        trip_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<ChatMessage, ApiError> {
        let request = SendMessageRequest {
            trip_id,
            receiver_id,
            content: content.to_string(),
        };
        let body = self.post_value("/messages", &request).await?;
        normalize_item(body)
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthPayload, ApiError> {
        ApiClient::register(self, credentials).await
    }

    async fn logout(&self) {
        ApiClient::logout(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;

    fn test_client(api_url: &str, store: Arc<MemoryStore>) -> ApiClient {
        let config = Config {
            api_url: api_url.to_string(),
            request_timeout_secs: 10,
            data_dir: std::path::PathBuf::new(),
        };
        ApiClient::new(&config, store).expect("Failed to build client")
    }

    /// Serve exactly one request on an ephemeral local port with a
    /// canned response, returning the base URL to point a client at
    fn one_shot_server(status_line: &str, content_type: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read listener address");
        let response = format!(
            "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        );
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_auth_headers_read_token_from_storage() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(StoreKeys::AUTH_TOKEN, "tok_123")
            .await
            .expect("set failed");

        let client = test_client("http://localhost:3000/api", store);
        let headers = client.auth_headers().await;
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        assert_eq!(value, Some("Bearer tok_123"));
    }

    #[tokio::test]
    async fn test_auth_headers_absent_without_token() {
        let client = test_client("http://localhost:3000/api", Arc::new(MemoryStore::new()));
        let headers = client.auth_headers().await;
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_auth_headers_track_storage_changes() {
        let store = Arc::new(MemoryStore::new());
        let client = test_client("http://localhost:3000/api", store.clone());

        store
            .set(StoreKeys::AUTH_TOKEN, "tok_first")
            .await
            .expect("set failed");
        let headers = client.auth_headers().await;
        assert!(headers.get(header::AUTHORIZATION).is_some());

        // Deleting the credential drops the header on the next request
        store
            .delete(StoreKeys::AUTH_TOKEN)
            .await
            .expect("delete failed");
        let headers = client.auth_headers().await;
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_validate_token_accepts_success_without_json_body() {
        // A 2xx status alone makes the credential valid, even when the
        // backend answers with a plain-text body
        let base_url = one_shot_server("HTTP/1.1 200 OK", "text/plain", "OK");
        let client = test_client(&base_url, Arc::new(MemoryStore::new()));
        assert!(client.validate_token().await);
    }

    #[tokio::test]
    async fn test_validate_token_false_on_rejected_status() {
        let base_url = one_shot_server(
            "HTTP/1.1 401 Unauthorized",
            "application/json",
            r#"{"message": "Token expired"}"#,
        );
        let client = test_client(&base_url, Arc::new(MemoryStore::new()));
        assert!(!client.validate_token().await);
    }
}
