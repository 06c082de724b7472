//! REST client for the analysis backend.
//!
//! Every call reads the bearer token from its [`CredentialSource`] at call
//! time, so a token refreshed between two calls is picked up by the second.
//! Client-side (hydrate) requests go through [`BrowserTransport`]; on the
//! server the same client fails every call with a normalized error.
//!
//! ERROR HANDLING
//! ==============
//! Network failures, non-2xx statuses and undecodable bodies all surface as
//! the single [`ApiError::RequestFailed`] kind, differing only in message.
//! No retries and no timeouts: a failed call fails once, immediately.
//!
//! [`BrowserTransport`]: super::http::BrowserTransport

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use super::http::{HttpRequest, HttpResponse, Method, Transport, UploadFile};
use super::session::SessionStore;
use super::types::{AnalysisRecord, InsightAnswer, TaxDeadline, UploadResponse};

/// Message used when a failed response carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "API request failed";
/// Message used when no response was obtained.
pub const NETWORK_ERROR_MESSAGE: &str = "Erro ao conectar com o servidor.";
/// Message used when a successful response cannot be decoded.
pub const INVALID_RESPONSE_MESSAGE: &str = "Resposta inválida do servidor.";

pub const HISTORY_PATH: &str = "/api/analysis/history";
pub const UPLOAD_PATH: &str = "/api/analysis/upload";
pub const INSIGHTS_PATH: &str = "/api/insights/ask";
pub const TAX_DEADLINES_PATH: &str = "/api/reminders/tax-deadlines";
pub const AUTH_SESSION_PATH: &str = "/api/auth/session";

/// The one failure kind surfaced to views.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    RequestFailed { status: Option<u16>, message: String },
}

impl ApiError {
    fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RequestFailed { status, message: message.into() }
    }

    /// User-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::RequestFailed { message, .. } => message,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
        }
    }
}

/// Supplies the current bearer token.
pub trait CredentialSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

impl CredentialSource for SessionStore {
    fn access_token(&self) -> Option<String> {
        SessionStore::access_token(self)
    }
}

/// Handle to the analysis backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_owned(), transport, credentials }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Build a request for `path`, attaching the current bearer token.
    pub fn build_request(&self, method: Method, path: &str) -> HttpRequest {
        let request = HttpRequest::new(method, self.url(path));
        match self.credentials.access_token() {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn execute(&self, request: HttpRequest) -> Result<serde_json::Value, ApiError> {
        let url = request.url.clone();
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                leptos::logging::warn!("request to {url} failed: {e}");
                return Err(ApiError::new(None, NETWORK_ERROR_MESSAGE));
            }
        };
        let result = normalize_response(&response);
        if let Err(e) = &result {
            leptos::logging::warn!("request to {url} failed with status {}: {e}", response.status);
        }
        result
    }

    /// `GET path` returning the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] on network failure, non-2xx status
    /// or an undecodable body.
    pub async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.execute(self.build_request(Method::Get, path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        self.execute(self.build_request(Method::Post, path).json(body)).await
    }

    /// `POST path` as multipart form data with the file under `file`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn upload_file(&self, path: &str, file: UploadFile) -> Result<serde_json::Value, ApiError> {
        self.execute(self.build_request(Method::Post, path).multipart("file", file)).await
    }

    // =========================================================================
    // Typed endpoints
    // =========================================================================

    /// Stored analyses, in backend order.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the body is not a list.
    pub async fn analysis_history(&self) -> Result<Vec<AnalysisRecord>, ApiError> {
        match self.get(HISTORY_PATH).await? {
            serde_json::Value::Array(items) => Ok(items.into_iter().map(AnalysisRecord::from_value).collect()),
            _ => Err(ApiError::new(None, INVALID_RESPONSE_MESSAGE)),
        }
    }

    /// Submit free text for analysis.
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn analyze_text(&self, text: &str) -> Result<UploadResponse, ApiError> {
        let value = self.post(UPLOAD_PATH, &serde_json::json!({ "text": text })).await?;
        decode(value)
    }

    /// Submit a file for analysis.
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn upload_analysis_file(&self, file: UploadFile) -> Result<UploadResponse, ApiError> {
        let value = self.upload_file(UPLOAD_PATH, file).await?;
        decode(value)
    }

    /// Ask a question about the user's history.
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn ask_question(&self, question: &str) -> Result<InsightAnswer, ApiError> {
        let value = self.post(INSIGHTS_PATH, &serde_json::json!({ "question": question })).await?;
        decode(value)
    }

    /// Upcoming tax deadlines. Entries that cannot be decoded are skipped.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the body is not a list.
    pub async fn tax_deadlines(&self) -> Result<Vec<TaxDeadline>, ApiError> {
        let serde_json::Value::Array(items) = self.get(TAX_DEADLINES_PATH).await? else {
            return Err(ApiError::new(None, INVALID_RESPONSE_MESSAGE));
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<TaxDeadline>(item) {
                Ok(deadline) => Some(deadline),
                Err(e) => {
                    leptos::logging::warn!("skipping tax deadline: {e}");
                    None
                }
            })
            .collect())
    }

    /// Backend view of the current session.
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn auth_session(&self) -> Result<serde_json::Value, ApiError> {
        self.get(AUTH_SESSION_PATH).await
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|_| ApiError::new(None, INVALID_RESPONSE_MESSAGE))
}

/// Map a raw response to its JSON body or the normalized failure.
///
/// # Errors
///
/// Non-2xx responses carry the body's `error` or `message` string, else
/// [`FALLBACK_ERROR_MESSAGE`].
pub fn normalize_response(response: &HttpResponse) -> Result<serde_json::Value, ApiError> {
    if !response.is_success() {
        return Err(ApiError::new(Some(response.status), failure_message(&response.body)));
    }
    if response.body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|_| ApiError::new(Some(response.status), INVALID_RESPONSE_MESSAGE))
}

fn failure_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_owned();
    };
    ["error", "message"]
        .iter()
        .find_map(|key| {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .filter(|message| !message.trim().is_empty())
        })
        .map_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned(), str::to_owned)
}
