//! The generation workflow: compose, submit, poll, present.
pub mod job;
pub mod poller;
pub mod presenter;
pub mod submitter;
pub mod ticket;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{PollError, WorkflowError};
use crate::prompt::composer::PromptComposer;
use crate::provider::ImageProvider;
use crate::workflow::poller::{JobPoller, PollConfig};
use crate::workflow::presenter::{GenerationRequest, Presenter};
use crate::workflow::submitter::JobSubmitter;
use crate::workflow::ticket::Ticket;

pub struct GenerationWorkflow {
    composer: PromptComposer,
    submitter: JobSubmitter,
    poller: JobPoller,
    poll_config: PollConfig,
}

impl GenerationWorkflow {
    pub fn new(provider: Arc<dyn ImageProvider>, poll_config: PollConfig) -> Self {
        GenerationWorkflow {
            composer: PromptComposer::new(),
            submitter: JobSubmitter::new(Arc::clone(&provider)),
            poller: JobPoller::new(provider),
            poll_config,
        }
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Run one generation from the presenter's current inputs.
    ///
    /// The presenter lock is only held for state transitions, never across a
    /// provider call, so `reset` or a newer run can interleave freely.
    pub async fn run(&self, presenter: &Mutex<Presenter>) -> Result<String, WorkflowError> {
        let (ticket, request) = presenter.lock().await.begin()?;
        let result = self.execute(presenter, &ticket, &request).await;

        let mut p = presenter.lock().await;
        let applied = match &result {
            Ok(url) => p.succeed(&ticket, url.clone()),
            Err(e) => p.fail(&ticket, e),
        };
        if !applied {
            tracing::info!(ticket = ticket.id(), "result of superseded generation discarded");
        }
        result
    }

    async fn execute(
        &self,
        presenter: &Mutex<Presenter>,
        ticket: &Ticket,
        request: &GenerationRequest,
    ) -> Result<String, WorkflowError> {
        let prompt = self.composer.compose(&request.user_prompt, Some(request.style))?;
        tracing::debug!(style = request.style.id, %prompt, "prompt composed");

        if !presenter.lock().await.submitting(ticket) {
            return Err(PollError::Superseded.into());
        }
        let handle = self.submitter.submit(&prompt).await?;

        if !presenter.lock().await.polling(ticket, self.poll_config.budget()) {
            return Err(PollError::Superseded.into());
        }
        let url = self.poller.poll_until_terminal(&handle, &self.poll_config, ticket).await?;
        Ok(url)
    }
}
