//! Fixed-interval status polling with a bounded number of attempts.
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PollError, ProviderError};
use crate::provider::types::JobStatus;
use crate::provider::ImageProvider;
use crate::workflow::job::GenerationJob;
use crate::workflow::submitter::JobHandle;
use crate::workflow::ticket::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig { interval: Duration::from_millis(2000), max_attempts: 10 }
    }
}

impl PollConfig {
    /// Upper bound on time spent waiting between status checks.
    pub fn budget(&self) -> Duration {
        self.interval.checked_mul(self.max_attempts).unwrap_or(Duration::MAX)
    }
}

#[derive(Clone)]
pub struct JobPoller {
    provider: Arc<dyn ImageProvider>,
}

impl JobPoller {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        JobPoller { provider }
    }

    /// Wait-then-check up to `config.max_attempts` times.
    ///
    /// A handle that is already terminal resolves without any status check.
    /// A status check that errors or cannot be parsed is skipped and still
    /// uses up its attempt; a missing credential ends the poll at once. The
    /// loop returns as soon as the job is terminal, and stops before the next
    /// check once `ticket` is superseded.
    pub async fn poll_until_terminal(
        &self,
        handle: &JobHandle,
        config: &PollConfig,
        ticket: &Ticket,
    ) -> Result<String, PollError> {
        let mut job = GenerationJob::from_handle(handle);
        if let Some(outcome) = settle(&job, 0) {
            return outcome;
        }

        for attempt in 1..=config.max_attempts {
            tokio::time::sleep(config.interval).await;
            if !ticket.is_current() {
                tracing::info!(job = %job.id, attempt, "generation superseded, polling stopped");
                return Err(PollError::Superseded);
            }

            let prediction = match self.provider.get_prediction(&job.id).await {
                Ok(p) => p,
                Err(ProviderError::Config(what)) => {
                    tracing::error!(job = %job.id, attempt, "credential missing during status check: {}", what);
                    return Err(PollError::Config(what));
                }
                Err(e) => {
                    tracing::warn!(job = %job.id, attempt, "status check failed: {}", e);
                    continue;
                }
            };
            if !job.observe(&prediction) {
                tracing::debug!(job = %job.id, attempt, reported = prediction.status.as_str(), "status read ignored");
            }

            match settle(&job, attempt) {
                Some(outcome) => return outcome,
                None => tracing::debug!(job = %job.id, attempt, status = job.status.as_str(), "still running"),
            }
        }

        tracing::warn!(job = %job.id, attempts = config.max_attempts, "gave up waiting for job");
        Err(PollError::Timeout { attempts: config.max_attempts })
    }
}

/// Outcome of a terminal job, `None` while it is still running. Attempt 0 is
/// the create response.
fn settle(job: &GenerationJob, attempt: u32) -> Option<Result<String, PollError>> {
    match job.status {
        JobStatus::Starting | JobStatus::Processing => None,
        JobStatus::Succeeded => Some(match &job.output {
            Some(url) => {
                tracing::info!(job = %job.id, attempt, %url, "image generated");
                Ok(url.clone())
            }
            None => Err(PollError::Parse(format!("job {} succeeded without an output image", job.id))),
        }),
        JobStatus::Failed | JobStatus::Canceled => {
            let provider_message = job.error.clone().unwrap_or_else(|| format!("job {}", job.status.as_str()));
            tracing::error!(job = %job.id, attempt, "generation failed: {}", provider_message);
            Some(Err(PollError::GenerationFailed { provider_message }))
        }
    }
}
