//! HTTP client for the warehouse/hobby REST API.
//!
//! `HttpClient` is the bare transport: base URL, cookie jar, timeout. It
//! passes status codes through untouched and never retries; all retry and
//! error policy lives in the `SessionGuard` decorator composed around it.
//! `ApiClient` exposes one method per service endpoint on top of the guard.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{Session, SessionStore};
use crate::models::{
    AllStocksPayload, HobbiesPayload, Hobby, HobbyDetail, HobbyPayload, JoinHobbyRequest,
    LoginRequest, NewPost, NewStock, NewWarehouse, ProfilePayload, RegisterRequest, UpdatePost,
    UpdateStock, User, UserPayload, UserProfile, Warehouse, WarehouseStocksPayload,
    WarehousesPayload,
};

use super::envelope::Envelope;
use super::refresh::SessionGuard;
use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Descriptor of one outbound call: enough to resubmit it verbatim.
///
/// The `retried` flag is one-shot and lives on the request itself, so two
/// different requests can each be replayed once, independently.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub retried: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(serde_json::to_value(body).map_err(ApiError::Encode)?),
            retried: false,
        })
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(serde_json::to_value(body).map_err(ApiError::Encode)?),
            retried: false,
        })
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
            retried: false,
        }
    }
}

/// A settled response: the raw status plus the decoded envelope, if the
/// body carried one (DELETE endpoints answer 204 with no body).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub envelope: Option<Envelope>,
}

impl HttpResponse {
    /// Map a non-2xx response onto the error taxonomy, without any
    /// session-expiry interpretation (that is the guard's job).
    pub fn into_status_error(self) -> ApiError {
        if let Some(ref envelope) = self.envelope {
            if let Some(details) = envelope.validation_details() {
                return ApiError::Validation { details };
            }
            if let Some(message) = envelope.error_message() {
                return ApiError::Status {
                    status: self.status.as_u16(),
                    message: message.to_string(),
                };
            }
        }
        ApiError::Status {
            status: self.status.as_u16(),
            message: self
                .status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
    }

    /// The envelope, or an error when the body was empty.
    pub fn require_envelope(self) -> Result<Envelope, ApiError> {
        self.envelope
            .ok_or_else(|| ApiError::InvalidResponse("empty response body".to_string()))
    }
}

/// Seam between the refresh layer and the wire. The production
/// implementation is `HttpClient`; tests script their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request).await
    }
}

/// The bare transport: attaches the base URL and the session cookie,
/// decodes the envelope, and nothing else.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, method = %request.method, path = %request.path, "response received");

        let envelope = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Envelope>(&text) {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    warn!(error = %e, path = %request.path, "response body is not an envelope");
                    if status.is_success() {
                        return Err(ApiError::InvalidResponse(ApiError::truncate_body(&text)));
                    }
                    None
                }
            }
        };

        Ok(HttpResponse { status, envelope })
    }
}

/// API client for the warehouse/hobby service.
///
/// Every data method goes through the session guard, so a stale session is
/// renewed and the call replayed without the caller noticing. Login,
/// registration and refresh itself talk to the transport directly.
pub struct ApiClient {
    guard: SessionGuard<HttpClient>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let transport = HttpClient::new(base_url)?;
        Ok(Self {
            guard: SessionGuard::new(transport, session),
        })
    }

    // ===== Authentication (bypasses the guard) =====

    /// `POST /login`. On success the server sets the session cookie and
    /// the returned identity is stored in the session.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        self.authenticate("/login", ApiRequest::post("/login", request)?)
            .await
    }

    /// `POST /register`. Same contract as login for the success path; the
    /// failure envelope may carry `errors` as an array.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.authenticate("/register", ApiRequest::post("/register", request)?)
            .await
    }

    async fn authenticate(&self, what: &str, request: ApiRequest) -> Result<User, ApiError> {
        let response = self.guard.transport().send(&request).await?;
        if !response.status.is_success() {
            debug!(status = %response.status, endpoint = what, "authentication refused");
            return Err(response.into_status_error());
        }

        let payload: UserPayload = response.require_envelope()?.decode_data()?;
        self.guard.session().set(Session::from(payload.user.clone()));
        Ok(payload.user)
    }

    // ===== Warehouses and stocks =====

    pub async fn warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get("/warehouses"))
            .await?
            .require_envelope()?;
        let payload: WarehousesPayload = envelope.decode_data()?;
        Ok(payload.warehouse)
    }

    /// `POST /warehouses`; the server answers with the updated list.
    pub async fn create_warehouse(&self, request: &NewWarehouse) -> Result<Vec<Warehouse>, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::post("/warehouses", request)?)
            .await?
            .require_envelope()?;
        let payload: WarehousesPayload = envelope.decode_data()?;
        Ok(payload.warehouse)
    }

    pub async fn warehouse_stocks(
        &self,
        warehouse_id: i64,
    ) -> Result<WarehouseStocksPayload, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get(format!("/warehouses/{}/stocks", warehouse_id)))
            .await?
            .require_envelope()?;
        envelope.decode_data()
    }

    /// All stocks grouped by warehouse, for the cross-warehouse report.
    pub async fn all_stocks(&self) -> Result<AllStocksPayload, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get("/warehouses/stocks"))
            .await?
            .require_envelope()?;
        envelope.decode_data()
    }

    /// `POST /stocks`; answers with the warehouse's refreshed stock list.
    pub async fn create_stock(&self, request: &NewStock) -> Result<WarehouseStocksPayload, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::post("/stocks", request)?)
            .await?
            .require_envelope()?;
        envelope.decode_data()
    }

    pub async fn update_stock(&self, stock_id: i64, request: &UpdateStock) -> Result<(), ApiError> {
        self.guard
            .execute(ApiRequest::put(format!("/stocks/{}", stock_id), request)?)
            .await?;
        Ok(())
    }

    /// `DELETE /stocks/:id`; 204 on success.
    pub async fn delete_stock(&self, stock_id: i64) -> Result<(), ApiError> {
        self.guard
            .execute(ApiRequest::delete(format!("/stocks/{}", stock_id)))
            .await?;
        Ok(())
    }

    // ===== Hobbies and posts =====

    pub async fn hobbies(&self) -> Result<Vec<Hobby>, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get("/hobbies"))
            .await?
            .require_envelope()?;
        let payload: HobbiesPayload = envelope.decode_data()?;
        Ok(payload.hobbies)
    }

    pub async fn hobby(&self, hobby_id: i64) -> Result<HobbyDetail, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get(format!("/hobbies/{}", hobby_id)))
            .await?
            .require_envelope()?;
        let payload: HobbyPayload = envelope.decode_data()?;
        Ok(payload.hobby)
    }

    /// `POST /user/hobby`; 201 on success.
    pub async fn join_hobby(&self, hobby_id: i64) -> Result<(), ApiError> {
        let request = JoinHobbyRequest {
            hobby_id: vec![hobby_id],
        };
        self.guard
            .execute(ApiRequest::post("/user/hobby", &request)?)
            .await?;
        Ok(())
    }

    pub async fn create_post(&self, request: &NewPost) -> Result<(), ApiError> {
        self.guard
            .execute(ApiRequest::post("/posts", request)?)
            .await?;
        Ok(())
    }

    pub async fn update_post(&self, post_id: i64, request: &UpdatePost) -> Result<(), ApiError> {
        self.guard
            .execute(ApiRequest::put(format!("/posts/{}", post_id), request)?)
            .await?;
        Ok(())
    }

    /// `DELETE /posts/:id`; 204 on success.
    pub async fn delete_post(&self, post_id: i64) -> Result<(), ApiError> {
        self.guard
            .execute(ApiRequest::delete(format!("/posts/{}", post_id)))
            .await?;
        Ok(())
    }

    // ===== Profile =====

    pub async fn profile(&self, user_profile_id: i64) -> Result<UserProfile, ApiError> {
        let envelope = self
            .guard
            .execute(ApiRequest::get(format!("/user/{}", user_profile_id)))
            .await?
            .require_envelope()?;
        let payload: ProfilePayload = envelope.decode_data()?;
        Ok(payload.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_constructors() {
        let get = ApiRequest::get("/hobbies");
        assert_eq!(get.method, Method::GET);
        assert!(get.body.is_none());
        assert!(!get.retried);

        let post = ApiRequest::post("/posts", &serde_json::json!({"content": "hi"}))
            .expect("encode body");
        assert_eq!(post.method, Method::POST);
        assert_eq!(post.body.as_ref().and_then(|b| b.get("content")).and_then(|v| v.as_str()), Some("hi"));

        let delete = ApiRequest::delete("/stocks/3");
        assert_eq!(delete.path, "/stocks/3");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpClient::new("http://localhost:8080/api/v1/").expect("build client");
        assert_eq!(client.url("/login"), "http://localhost:8080/api/v1/login");
    }

    #[test]
    fn test_status_error_prefers_envelope_message() {
        let response = HttpResponse {
            status: StatusCode::NOT_FOUND,
            envelope: Some(
                serde_json::from_str(
                    r#"{"status":"fail","errors":{"code":404,"message":"warehouse not found"}}"#,
                )
                .expect("parse envelope"),
            ),
        };
        match response.into_status_error() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "warehouse not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_error_validation() {
        let response = HttpResponse {
            status: StatusCode::BAD_REQUEST,
            envelope: Some(
                serde_json::from_str(
                    r#"{"status":"fail","errors":{"code":400,"message":"validation errors","details":{"name":"name is required"}}}"#,
                )
                .expect("parse envelope"),
            ),
        };
        match response.into_status_error() {
            ApiError::Validation { details } => {
                assert_eq!(details.get("name").map(String::as_str), Some("name is required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_error_without_envelope() {
        let response = HttpResponse {
            status: StatusCode::BAD_GATEWAY,
            envelope: None,
        };
        match response.into_status_error() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
