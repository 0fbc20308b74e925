//! HTTP client for the task API.
//!
//! Every call is single-shot: no retries, no caching. Failures are folded into
//! [`ApiError`] at this boundary so callers handle exactly one result shape.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    Envelope, ErrorBody, LoginData, LoginRequest, RegisterRequest,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use taskbook_core::{Task, TaskDraft, TaskId};
use tracing::{debug, instrument, warn};

const JSON: &str = "application/json";

/// Join a base URL and a path with exactly one slash between them.
fn join_url_segments(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Builder for [`TaskApiClient`].
pub struct TaskApiClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl TaskApiClientBuilder {
    /// `base_url` includes the API prefix, e.g. `https://host/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// # Errors
    ///
    /// Fails if the base URL is not an absolute http(s) URL or the underlying
    /// HTTP client cannot be built.
    pub fn build(self) -> ApiResult<TaskApiClient> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Network(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(TaskApiClient {
            http,
            base_url: self.base_url,
        })
    }
}

#[derive(Clone)]
pub struct TaskApiClient {
    http: Client,
    base_url: String,
}

impl TaskApiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = join_url_segments(&self.base_url, path);
        debug!(%method, %url, authenticated = token.is_some(), "Sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed before a response arrived: {}", e);
            ApiError::Network(e.to_string())
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify(response).await)
        }
    }

    async fn send_for_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        let envelope: Envelope<T> = response.json().await?;
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("response has no data field".to_string()))
    }

    /// Exchange credentials for a token and profile.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginData> {
        let response = self
            .request(Method::POST, "login", None)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(classify(response).await);
        }

        let envelope: Envelope<LoginData> = read_envelope(response).await?;
        match (status.is_success(), envelope.success, envelope.data) {
            (true, Some(true), Some(data)) => Ok(data),
            (true, None, Some(data)) => Ok(data),
            (_, _, _) => Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Incorrect email or password".to_string()),
            )),
        }
    }

    /// Create an account. The user still has to log in afterwards.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<()> {
        let response = self
            .request(Method::POST, "register", None)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(classify(response).await);
        }

        let envelope: Envelope<serde_json::Value> = read_envelope(response).await?;
        if status.is_success() && envelope.success != Some(false) {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Could not create the account".to_string()),
            ))
        }
    }

    #[instrument(skip(self, token))]
    pub async fn list_tasks(&self, token: Option<&str>) -> ApiResult<Vec<Task>> {
        self.send_for_data(self.request(Method::GET, "tasks", token))
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn get_task(&self, token: Option<&str>, id: TaskId) -> ApiResult<Task> {
        self.send_for_data(self.request(Method::GET, &format!("tasks/{id}"), token))
            .await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn create_task(&self, token: Option<&str>, draft: &TaskDraft) -> ApiResult<()> {
        self.send(self.request(Method::POST, "tasks", token).json(draft))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_task(
        &self,
        token: Option<&str>,
        id: TaskId,
        draft: &TaskDraft,
    ) -> ApiResult<()> {
        self.send(
            self.request(Method::PUT, &format!("tasks/{id}"), token)
                .json(draft),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    pub async fn delete_task(&self, token: Option<&str>, id: TaskId) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("tasks/{id}"), token))
            .await?;
        Ok(())
    }
}

/// Read a login/register envelope, tolerating an empty or non-JSON body.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> ApiResult<Envelope<T>> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Envelope {
            success: None,
            message: None,
            data: None,
        });
    }
    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Map a non-success response onto the error taxonomy.
async fn classify(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| reason(status));

    let error = match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        s if s.is_server_error() => ApiError::Server {
            status: s.as_u16(),
            message,
        },
        s => ApiError::Validation {
            status: s.as_u16(),
            message,
            errors: parsed
                .errors
                .into_iter()
                .map(|(field, messages)| (field, messages.into_vec()))
                .collect(),
        },
    };

    warn!(status = status.as_u16(), "Request failed: {}", error);
    error
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
