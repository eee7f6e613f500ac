//! Thin HTTP client for the Replicate predictions API.
//!
//! - `create_prediction` posts a prompt plus the fixed generation parameters
//!   to `/predictions`.
//! - `get_prediction` fetches `/predictions/{id}`.
use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::types::{is_valid_job_id, CreatePrediction, Prediction, PredictionInput};
use crate::provider::ImageProvider;

#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    config: ProviderConfig,
}

impl ReplicateClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(ReplicateClient { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve the credential before any request is built.
    fn token(&self) -> Result<String, ProviderError> {
        self.config.api_token.resolve().ok_or_else(|| {
            tracing::error!("missing provider credential: {}", self.config.api_token.describe());
            ProviderError::Config(self.config.api_token.describe())
        })
    }

    async fn read_prediction(response: Response, action: &str) -> Result<Prediction, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Failed to {}. Status: {}, Body: {}", action, status, body);
            return Err(ProviderError::ProviderRejected { status: status.as_u16(), body });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Unexpected response while trying to {}: {}", action, body);
            ProviderError::Parse(e.to_string())
        })
    }
}

#[async_trait]
impl ImageProvider for ReplicateClient {
    async fn create_prediction(&self, prompt: &str) -> Result<Prediction, ProviderError> {
        let token = self.token()?;
        let url = format!("{}/predictions", self.config.api_base);
        let params = &self.config.params;
        let body = CreatePrediction {
            version: &self.config.model,
            input: PredictionInput {
                prompt,
                width: params.width,
                height: params.height,
                num_inference_steps: params.num_inference_steps,
                prompt_upsampling: params.prompt_upsampling,
            },
        };
        tracing::info!("Creating prediction at URL: {}", url);
        tracing::debug!("Prediction payload: {:?}", body);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", token))
            .json(&body)
            .send()
            .await?;
        let prediction = Self::read_prediction(response, "create prediction").await?;
        tracing::info!(id = %prediction.id, status = prediction.status.as_str(), "prediction created");
        Ok(prediction)
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction, ProviderError> {
        let token = self.token()?;
        if !is_valid_job_id(id) {
            return Err(ProviderError::Parse(format!("invalid job id '{}'", id)));
        }
        let url = format!("{}/predictions/{}", self.config.api_base, id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", token))
            .send()
            .await?;
        let prediction = Self::read_prediction(response, "get prediction").await?;
        tracing::debug!(id = %prediction.id, status = prediction.status.as_str(), "prediction status");
        Ok(prediction)
    }
}
