//! Wire types for the Replicate-style predictions API.
//!
//! Responses are parsed into these at the boundary; anything that does not
//! fit is a parse error rather than a guess.
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Position in the forward-only lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Processing => 1,
            Self::Succeeded | Self::Failed | Self::Canceled => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

/// Models return either one URL or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Url(String),
    Urls(Vec<String>),
}

impl PredictionOutput {
    pub fn first_url(&self) -> Option<&str> {
        let url = match self {
            PredictionOutput::Url(url) => Some(url.as_str()),
            PredictionOutput::Urls(urls) => urls.first().map(String::as_str),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Prediction {
    pub fn image_url(&self) -> Option<&str> {
        self.output.as_ref().and_then(PredictionOutput::first_url)
    }

    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePrediction<'a> {
    pub version: &'a str,
    pub input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictionInput<'a> {
    pub prompt: &'a str,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub prompt_upsampling: bool,
}

/// Job ids are interpolated into URL paths, so only URL-safe ids are used.
pub fn is_valid_job_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 128 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
