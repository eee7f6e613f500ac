use std::sync::Arc;

use serde::Serialize;

use crate::error::ProviderError;
use crate::provider::types::{is_valid_job_id, JobStatus};
use crate::provider::ImageProvider;

/// Errors a single submission attempt can produce.
pub type SubmitError = ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobHandle {
    pub id: String,
    #[serde(rename = "status")]
    pub initial_status: JobStatus,
    pub created_at: Option<String>,
    /// Set when the create response already reported a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends a composed prompt to the provider. One attempt per call; retrying
/// is left to the user.
#[derive(Clone)]
pub struct JobSubmitter {
    provider: Arc<dyn ImageProvider>,
}

impl JobSubmitter {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        JobSubmitter { provider }
    }

    pub async fn submit(&self, composed_prompt: &str) -> Result<JobHandle, SubmitError> {
        tracing::info!(prompt = %composed_prompt, "submitting generation job");
        let prediction = self.provider.create_prediction(composed_prompt).await?;
        if !is_valid_job_id(&prediction.id) {
            return Err(ProviderError::Parse(format!("provider returned unusable job id '{}'", prediction.id)));
        }
        Ok(JobHandle {
            output: prediction.image_url().map(str::to_string),
            error: prediction.error_message(),
            id: prediction.id,
            initial_status: prediction.status,
            created_at: prediction.created_at,
        })
    }
}
