//! Request Gateway
//!
//! Runs a single API call with a deadline, the session's bearer token and a
//! uniform error contract.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::auth::AuthStore;
use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};

/// One API call, built per request and consumed by [`Gateway::send`]
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Extra header; wins over the defaults on conflict
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Build the shared HTTP client
pub fn build_http_client() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .user_agent(concat!("wheeltracker-client/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ApiError::Network)
}

/// Issue the request and read the whole body, racing both against `timeout`.
///
/// When the deadline wins, the request future is dropped, which aborts the
/// connection.
pub(crate) async fn execute(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let call = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, body.to_vec()))
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) if e.is_timeout() => Err(ApiError::Timeout(timeout)),
        Ok(Err(e)) => Err(ApiError::Network(e)),
        Err(_) => Err(ApiError::Timeout(timeout)),
    }
}

/// Authenticated access to the WheelTracker API
pub struct Gateway {
    config: ClientConfig,
    client: reqwest::Client,
    auth: Arc<AuthStore>,
}

impl Gateway {
    pub fn new(config: ClientConfig, client: reqwest::Client, auth: Arc<AuthStore>) -> Self {
        Self { config, client, auth }
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform the call and return the decoded JSON body.
    ///
    /// A 401 ends the session before the error is returned. `204 No Content`
    /// yields `{"success": true}`.
    pub async fn send(&self, request: Request) -> Result<Value, ApiError> {
        let url = self.config.url(&request.path);
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let result = self.dispatch(&request, &url, timeout).await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                warn!("{} {} unauthorized: {}", request.method, request.path, e);
            } else {
                error!("{} {} failed: {}", request.method, request.path, e);
            }
        }
        result
    }

    /// [`Gateway::send`], then deserialize into `T`
    pub async fn send_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let path = request.path.clone();
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|e| {
            let err = ApiError::Decode(e.to_string());
            error!("{} returned an unexpected shape: {}", path, err);
            err
        })
    }

    async fn dispatch(&self, request: &Request, url: &str, timeout: Duration) -> Result<Value, ApiError> {
        let token = self.auth.access_token();
        let headers = self.headers(token.as_deref(), &request.headers)?;

        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let (status, bytes) = execute(builder, timeout).await?;
        debug!("{} {} -> {}", request.method, url, status);

        if status == StatusCode::UNAUTHORIZED {
            self.auth.expire(token.as_deref());
            return Err(ApiError::Http {
                status,
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        if !status.is_success() {
            return Err(ApiError::Http {
                status,
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(json!({ "success": true }));
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn headers(&self, token: Option<&str>, overrides: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("access token is not a valid header: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}
