// API client for the decision-tracking service.
//
// A thin, typed wrapper over reqwest: every method is one endpoint, returns
// a deserialized payload or an ApiError classified from the HTTP status.
// The TUI and the CLI subcommands share this client; neither ever touches
// raw HTTP.

pub mod chat;
pub mod types;

use crate::config::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use types::*;

/// Per-call timeout for plain REST calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Streaming responses take as long as the model takes; give them far more
/// room than plain REST calls.
const STREAM_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Errors
// ============================================================================

/// Error taxonomy for API calls.
///
/// `Auth` routes the user back to login, `NotFound` usually means a stale
/// local reference (fixed by refetching the list), everything else is shown
/// and the previous screen data is kept.
#[derive(Debug)]
pub enum ApiError {
    /// 401/403 - token missing, invalid, or expired
    Auth(String),
    /// 404 - the referenced resource no longer exists server-side
    NotFound(String),
    /// Any other non-success status
    Api { status: u16, body: String },
    /// Transport failure or timeout
    Network(reqwest::Error),
    /// Response body did not match the expected schema
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(msg) => write!(f, "not authenticated: {}", msg),
            ApiError::NotFound(msg) => write!(f, "not found: {}", msg),
            ApiError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            ApiError::Network(e) => write!(f, "network error: {}", e),
            ApiError::Decode(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
    /// Separate client for streaming chat: same connection pool rules,
    /// much longer timeout.
    stream_http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: if config.token.is_empty() {
                None
            } else {
                Some(config.token.clone())
            },
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client with static settings"),
            stream_http: reqwest::Client::builder()
                .timeout(STREAM_TIMEOUT)
                .build()
                .expect("reqwest client with static settings"),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn stream_http(&self) -> &reqwest::Client {
        &self.stream_http
    }

    pub(crate) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.http.get(format!("{}{}", self.base_url, path));
        self.send(req).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        self.send(req).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.http.post(format!("{}{}", self.base_url, path));
        self.send(req).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let req = self
            .http
            .patch(format!("{}{}", self.base_url, path))
            .json(body);
        self.send(req).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.http.delete(format!("{}{}", self.base_url, path));
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(classify(status.as_u16(), resp.text().await.unwrap_or_default()))
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify(status.as_u16(), body));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ------------------------------------------------------------------------
    // Auth & identity
    // ------------------------------------------------------------------------

    pub async fn device_auth_init(&self, device_name: &str) -> Result<DeviceAuthInit, ApiError> {
        self.post(
            "/api/v1/auth/device/init",
            &serde_json::json!({ "device_name": device_name }),
        )
        .await
    }

    pub async fn device_auth_poll(&self, code: &str) -> Result<DeviceAuthPoll, ApiError> {
        self.post(
            "/api/v1/auth/device/poll",
            &serde_json::json!({ "code": code }),
        )
        .await
    }

    /// Current user plus their organizations and projects.
    pub async fn get_me(&self) -> Result<Identity, ApiError> {
        self.get("/api/v1/me").await
    }

    // ------------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------------

    pub async fn list_decisions(&self, project_id: &str) -> Result<Vec<Decision>, ApiError> {
        self.get(&format!("/api/v1/projects/{}/decisions", project_id))
            .await
    }

    pub async fn get_decision(&self, project_id: &str, decision_id: &str) -> Result<Decision, ApiError> {
        self.get(&format!(
            "/api/v1/projects/{}/decisions/{}",
            project_id, decision_id
        ))
        .await
    }

    pub async fn create_decision(
        &self,
        project_id: &str,
        req: &CreateDecisionRequest,
    ) -> Result<Decision, ApiError> {
        self.post(&format!("/api/v1/projects/{}/decisions", project_id), req)
            .await
    }

    /// DRAFT/PENDING -> ACCEPTED. The server enforces the transition too;
    /// the TUI pre-validates so illegal attempts never leave the process.
    pub async fn accept_decision(
        &self,
        project_id: &str,
        decision_id: &str,
    ) -> Result<Decision, ApiError> {
        self.post_empty(&format!(
            "/api/v1/projects/{}/decisions/{}/accept",
            project_id, decision_id
        ))
        .await
    }

    /// ACCEPTED -> DEPRECATED.
    pub async fn deprecate_decision(
        &self,
        project_id: &str,
        decision_id: &str,
    ) -> Result<Decision, ApiError> {
        self.post_empty(&format!(
            "/api/v1/projects/{}/decisions/{}/deprecate",
            project_id, decision_id
        ))
        .await
    }

    pub async fn project_status(&self, project_id: &str) -> Result<ProjectStatus, ApiError> {
        self.get(&format!("/api/v1/projects/{}/status", project_id))
            .await
    }

    // ------------------------------------------------------------------------
    // Memories
    // ------------------------------------------------------------------------

    pub async fn list_memories(&self, project_id: &str) -> Result<Vec<Memory>, ApiError> {
        self.get(&format!("/api/v1/projects/{}/memories", project_id))
            .await
    }

    pub async fn create_memory(
        &self,
        project_id: &str,
        req: &CreateMemoryRequest,
    ) -> Result<Memory, ApiError> {
        self.post(&format!("/api/v1/projects/{}/memories", project_id), req)
            .await
    }

    pub async fn update_memory(
        &self,
        project_id: &str,
        memory_id: &str,
        req: &UpdateMemoryRequest,
    ) -> Result<Memory, ApiError> {
        self.patch(
            &format!("/api/v1/projects/{}/memories/{}", project_id, memory_id),
            req,
        )
        .await
    }

    pub async fn delete_memory(&self, project_id: &str, memory_id: &str) -> Result<(), ApiError> {
        self.delete(&format!(
            "/api/v1/projects/{}/memories/{}",
            project_id, memory_id
        ))
        .await
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    pub async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, ApiError> {
        self.get(&format!("/api/v1/projects/{}/tasks", project_id))
            .await
    }

    pub async fn create_task(&self, project_id: &str, req: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.post(&format!("/api/v1/projects/{}/tasks", project_id), req)
            .await
    }

    pub async fn update_task(
        &self,
        project_id: &str,
        task_id: &str,
        req: &UpdateTaskRequest,
    ) -> Result<Task, ApiError> {
        self.patch(
            &format!("/api/v1/projects/{}/tasks/{}", project_id, task_id),
            req,
        )
        .await
    }

    pub async fn delete_task(&self, project_id: &str, task_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/v1/projects/{}/tasks/{}", project_id, task_id))
            .await
    }

    // ------------------------------------------------------------------------
    // Capsules & graph
    // ------------------------------------------------------------------------

    pub async fn list_capsules(&self, project_id: &str) -> Result<Vec<Capsule>, ApiError> {
        self.get(&format!("/api/v1/projects/{}/capsules", project_id))
            .await
    }

    pub async fn graph_stats(&self, project_id: &str) -> Result<GraphStats, ApiError> {
        self.get(&format!("/api/v1/projects/{}/graph/stats", project_id))
            .await
    }
}

fn classify(status: u16, body: String) -> ApiError {
    match status {
        401 | 403 => ApiError::Auth(body),
        404 => ApiError::NotFound(body),
        _ => ApiError::Api { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_status_families() {
        assert!(matches!(classify(401, String::new()), ApiError::Auth(_)));
        assert!(matches!(classify(403, String::new()), ApiError::Auth(_)));
        assert!(matches!(classify(404, String::new()), ApiError::NotFound(_)));
        assert!(matches!(
            classify(500, String::new()),
            ApiError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = classify(422, "statement is required".into());
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("statement is required"));
    }
}
