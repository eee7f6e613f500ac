//! Error types shared by the workflow, the provider client and the HTTP API.
//!
//! Each workflow step has its own enum so callers can match on exactly what
//! that step can produce. `AppError` is the umbrella used by the HTTP layer
//! and maps every variant to a status code.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Input the composer refuses to work with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("a non-empty prompt is required")]
    EmptyPrompt,
    #[error("a style must be selected")]
    MissingStyle,
}

/// Failure talking to the image provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider credential is not configured ({0})")]
    Config(String),
    #[error("could not reach the image provider: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider rejected request with status {status}: {body}")]
    ProviderRejected { status: u16, body: String },
    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("image generation failed: {provider_message}")]
    GenerationFailed { provider_message: String },
    #[error("no terminal status after {attempts} status checks")]
    Timeout { attempts: u32 },
    #[error("malformed terminal response: {0}")]
    Parse(String),
    #[error("provider credential is not configured ({0})")]
    Config(String),
    #[error("superseded by a newer generation")]
    Superseded,
}

/// Anything that can end a generation run early.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    InvalidInput(#[from] ComposeError),
    #[error(transparent)]
    Submit(#[from] ProviderError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

impl WorkflowError {
    /// Short message suitable for an end user. Provider payloads never leak
    /// through here except the provider's own failure reason.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::InvalidInput(_) => "Please enter a prompt and select a style".to_string(),
            WorkflowError::Submit(ProviderError::Config(_)) | WorkflowError::Poll(PollError::Config(_)) => {
                "Image generation is not available right now".to_string()
            }
            WorkflowError::Submit(_) => "Generation failed: the image service could not be reached".to_string(),
            WorkflowError::Poll(PollError::GenerationFailed { provider_message }) => {
                format!("Generation failed: {}", provider_message)
            }
            WorkflowError::Poll(PollError::Timeout { .. }) => {
                "Generation is taking too long. Please try again.".to_string()
            }
            WorkflowError::Poll(PollError::Parse(_)) => "Generation failed: no image was returned".to_string(),
            WorkflowError::Poll(PollError::Superseded) => "Generation was replaced by a newer request".to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkflowError::Poll(PollError::Timeout { .. }))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidInput(e) => AppError::Compose(e),
            WorkflowError::Submit(e) => AppError::Provider(e),
            WorkflowError::Poll(e) => AppError::Poll(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Compose(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Provider(ProviderError::Config(_))
            | AppError::Poll(PollError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Provider(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Poll(PollError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Poll(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Summary shown to clients; the full `Display` text is only attached
    /// as `details` when error details are exposed.
    pub fn summary(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::Compose(_) => "Prompt is required",
            AppError::Config(_)
            | AppError::Provider(ProviderError::Config(_))
            | AppError::Poll(PollError::Config(_)) => "Server configuration error",
            AppError::Provider(_) => "Failed to connect to image generation service",
            AppError::Poll(PollError::Timeout { .. }) => "Timed out waiting for image generation",
            AppError::Poll(_) => "Image generation failed",
            AppError::Internal(_) => "Internal server error",
        }
    }

    /// Render with the raw error text attached under `details`.
    pub fn into_detailed_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "error": self.summary(), "details": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {}", self);
        } else {
            tracing::debug!(%status, "request rejected: {}", self);
        }
        // BadRequest carries a message written for the caller already.
        let message = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            other => other.summary().to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
