//! Client side of the external image-generation provider.
pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::types::Prediction;

/// The two provider calls the workflow depends on.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Start a job for `prompt`. Exactly one request per call.
    async fn create_prediction(&self, prompt: &str) -> Result<Prediction, ProviderError>;

    async fn get_prediction(&self, id: &str) -> Result<Prediction, ProviderError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::provider::types::{JobStatus, PredictionOutput};

    pub fn prediction(id: &str, status: JobStatus) -> Prediction {
        Prediction {
            id: id.to_string(),
            status,
            output: None,
            error: None,
            created_at: Some("2024-03-01T12:00:00Z".to_string()),
            completed_at: None,
        }
    }

    pub fn succeeded(id: &str, url: &str) -> Prediction {
        Prediction {
            output: Some(PredictionOutput::Urls(vec![url.to_string()])),
            completed_at: Some("2024-03-01T12:00:06Z".to_string()),
            ..prediction(id, JobStatus::Succeeded)
        }
    }

    pub fn failed(id: &str, message: &str) -> Prediction {
        Prediction {
            error: Some(serde_json::Value::String(message.to_string())),
            ..prediction(id, JobStatus::Failed)
        }
    }

    /// Provider that replays queued status responses and answers
    /// `processing` once the queue runs dry.
    pub struct ScriptedProvider {
        job_id: String,
        create: Mutex<Option<Result<Prediction, ProviderError>>>,
        polls: Mutex<VecDeque<Result<Prediction, ProviderError>>>,
        create_calls: AtomicUsize,
        status_calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(job_id: &str) -> Self {
            ScriptedProvider {
                job_id: job_id.to_string(),
                create: Mutex::new(None),
                polls: Mutex::new(VecDeque::new()),
                create_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn on_create(self, result: Result<Prediction, ProviderError>) -> Self {
            *self.create.lock().unwrap() = Some(result);
            self
        }

        pub fn then(self, result: Result<Prediction, ProviderError>) -> Self {
            self.polls.lock().unwrap().push_back(result);
            self
        }

        pub fn then_status(self, status: JobStatus) -> Self {
            let p = prediction(&self.job_id, status);
            self.then(Ok(p))
        }

        pub fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        pub fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageProvider for ScriptedProvider {
        async fn create_prediction(&self, prompt: &str) -> Result<Prediction, ProviderError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.create.lock().unwrap().take() {
                Some(result) => result,
                None => Ok(prediction(&self.job_id, JobStatus::Starting)),
            }
        }

        async fn get_prediction(&self, id: &str) -> Result<Prediction, ProviderError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            match self.polls.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(prediction(id, JobStatus::Processing)),
            }
        }
    }
}
