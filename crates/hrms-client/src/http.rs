//! Authenticated HTTP client wrapper.
//!
//! Request phase: non-public endpoints get a bearer token, renewed first
//! if it has expired. Response phase: a 401 on a request that has not been
//! retried yet triggers one renewal and one resend. Renewals started this
//! way are bounded by a counter shared by all requests of this client;
//! requests rejected in the same burst join one renewal and spend one slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use hrms_auth::{RenewalAttempt, SessionManager};
use hrms_cache::QueryParams;
use hrms_core::config::ApiConfig;
use hrms_core::error::{AppError, ErrorKind};
use hrms_core::events::{LogoutReason, Notice};
use hrms_core::result::AppResult;

/// Build the shared transport from the `[api]` section.
pub fn build_transport(config: &ApiConfig) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
        })
}

/// Body of a response, bare or wrapped in `{"data": ...}`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

/// Decode a response body, unwrapping a `{"data": ...}` envelope.
pub fn decode_body<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    match serde_json::from_value::<Envelope<T>>(body) {
        Ok(Envelope::Wrapped { data }) | Ok(Envelope::Bare(data)) => Ok(data),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Serialization,
            "Unexpected response shape",
            e,
        )),
    }
}

/// Message carried by a backend body, if any.
pub fn message_of(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Turn a failed response into an error carrying the backend's message.
pub(crate) async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = read_body(response).await.unwrap_or(Value::Null);
    let message = message_of(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    AppError::from_status(status.as_u16(), message)
}

/// Read a body as JSON; non-JSON text becomes a string, empty becomes null.
pub(crate) async fn read_body(response: Response) -> AppResult<Value> {
    let text = response.text().await.map_err(transport_error)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Map a transport failure (no usable response) to a network error.
pub(crate) fn transport_error(e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Network, format!("Request failed: {e}"), e)
}

/// One logical request, kept so it can be resent.
#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    path: String,
    query: QueryParams,
    body: Option<Value>,
}

/// HTTP client that keeps requests authenticated.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    config: Arc<ApiConfig>,
    session: SessionManager,
    /// Renewals started for consecutive 401s; reset by any other outcome.
    auth_retries: Arc<AtomicU32>,
}

impl ApiClient {
    /// Creates a client over `http` using `session` for tokens.
    pub fn new(config: &ApiConfig, http: reqwest::Client, session: SessionManager) -> Self {
        Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            config: Arc::new(config.clone()),
            session,
            auth_retries: Arc::new(AtomicU32::new(0)),
        }
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The `[api]` settings in use.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Current value of the consecutive-401 counter.
    pub fn auth_retry_count(&self) -> u32 {
        self.auth_retries.load(Ordering::SeqCst)
    }

    /// `GET path?query`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &QueryParams) -> AppResult<T> {
        let request = ApiRequest {
            method: Method::GET,
            path: path.to_string(),
            query: query.clone(),
            body: None,
        };
        decode_body(self.execute(&request).await?)
    }

    /// `POST path` with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = ApiRequest {
            method: Method::DELETE,
            path: path.to_string(),
            query: QueryParams::new(),
            body: None,
        };
        decode_body(self.execute(&request).await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query: QueryParams::new(),
            body: Some(serde_json::to_value(body)?),
        };
        decode_body(self.execute(&request).await?)
    }

    async fn execute(&self, request: &ApiRequest) -> AppResult<Value> {
        let public = self.config.is_public_endpoint(&request.path);
        let token = if public {
            None
        } else {
            self.session.valid_token().await?
        };

        let response = self.dispatch(request, token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED && !public {
            return self
                .retry_unauthorized(request, token.as_deref(), response)
                .await;
        }
        self.finish(response).await
    }

    async fn retry_unauthorized(
        &self,
        request: &ApiRequest,
        sent: Option<&str>,
        first: Response,
    ) -> AppResult<Value> {
        if let Some(sent) = sent {
            match self.session.access_token() {
                None => {
                    debug!(path = %request.path, "Session ended while request was in flight");
                    return Err(error_from_response(first).await);
                }
                Some(current) if current != sent => {
                    debug!(path = %request.path, "Token already renewed, resending");
                    return self.resend(request, &current, 1).await;
                }
                Some(_) => {}
            }
        }

        let max = self.config.max_auth_retries;
        let outcome = self
            .session
            .renew_admitted(|| {
                self.auth_retries
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                        (n < max).then_some(n + 1)
                    })
                    .is_ok()
            })
            .await;

        let token = match outcome {
            RenewalAttempt::Completed(Some(token)) => token,
            RenewalAttempt::Completed(None) => {
                return Err(AppError::authentication("Session expired"));
            }
            RenewalAttempt::Declined => {
                warn!(path = %request.path, max, "Auth retry budget exhausted, logging out");
                self.auth_retries.store(0, Ordering::SeqCst);
                self.session.logout(LogoutReason::RetryBudgetExhausted);
                return Err(error_from_response(first).await);
            }
        };

        let attempt = self.auth_retries.load(Ordering::SeqCst).max(1);
        info!(path = %request.path, attempt, "Received 401, token renewed, retrying");
        self.resend(request, &token, attempt).await
    }

    async fn resend(&self, request: &ApiRequest, token: &str, attempt: u32) -> AppResult<Value> {
        let backoff = Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt));
        debug!(backoff_ms = backoff.as_millis() as u64, "Backing off before retry");
        tokio::time::sleep(backoff).await;

        let response = self.dispatch(request, Some(token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, attempt, "Retried request rejected again");
            return Err(error_from_response(response).await);
        }
        self.finish(response).await
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> AppResult<Response> {
        let url = self.url(&request.path, &request.query)?;
        debug!(method = %request.method, %url, authenticated = token.is_some(), "Sending request");

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            warn!(path = %request.path, error = %e, "No response from backend");
            self.auth_retries.store(0, Ordering::SeqCst);
            self.session.events().notice(Notice::Connectivity);
            transport_error(e)
        })
    }

    async fn finish(&self, response: Response) -> AppResult<Value> {
        let status = response.status();
        if status != StatusCode::UNAUTHORIZED {
            self.auth_retries.store(0, Ordering::SeqCst);
        }
        if status.is_success() {
            return read_body(response).await;
        }

        let err = error_from_response(response).await;
        debug!(status = status.as_u16(), error = %err, "Backend rejected request");
        Err(err)
    }

    fn url(&self, path: &str, query: &QueryParams) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, format!("Invalid URL for {path}"), e)
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }
}
