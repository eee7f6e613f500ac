//! UI-independent state machine for the generation demo.
//!
//! `Idle -> Composing -> Submitting -> Polling -> {Succeeded | Failed | TimedOut}`
//! with `reset` returning to `Idle` from anywhere. Every transition after
//! `begin` carries the ticket issued by `begin`; transitions with a stale
//! ticket are dropped, so only the most recently started generation can
//! change what the user sees.
use std::time::Duration;

use crate::error::{ComposeError, WorkflowError};
use crate::prompt::styles::Style;
use crate::workflow::ticket::{Ticket, TicketIssuer};

pub const MSG_COMPOSING: &str = "Enhancing your prompt...";
pub const MSG_SUBMITTING: &str = "Starting generation...";
pub const MSG_SUCCEEDED: &str = "Image generated successfully!";
pub const MSG_FAILED: &str = "Generation failed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Composing,
    Submitting,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl Phase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Phase::Composing | Phase::Submitting | Phase::Polling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed | Phase::TimedOut)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub prompt: String,
    pub selected_style: Option<&'static Style>,
    pub is_generating: bool,
    pub generated_image_url: Option<String>,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

/// Snapshot of the inputs a generation was started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub user_prompt: String,
    pub style: &'static Style,
}

#[derive(Debug, Default)]
pub struct Presenter {
    state: UiState,
    phase: Phase,
    tickets: TicketIssuer,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    pub fn select_style(&mut self, style: &'static Style) {
        self.state.selected_style = Some(style);
    }

    /// Generation needs a non-blank prompt and a style; nothing else gates it.
    pub fn can_generate(&self) -> bool {
        !self.state.prompt.trim().is_empty() && self.state.selected_style.is_some()
    }

    /// Start a generation. Supersedes whatever was running before.
    pub fn begin(&mut self) -> Result<(Ticket, GenerationRequest), ComposeError> {
        let style = match self.state.selected_style {
            Some(style) if self.can_generate() => style,
            selected => {
                let err = if selected.is_none() { ComposeError::MissingStyle } else { ComposeError::EmptyPrompt };
                self.state.error_message = Some(WorkflowError::InvalidInput(err.clone()).user_message());
                return Err(err);
            }
        };

        let ticket = self.tickets.issue();
        self.phase = Phase::Composing;
        self.state.is_generating = true;
        self.state.generated_image_url = None;
        self.state.error_message = None;
        self.state.status_message = Some(MSG_COMPOSING.to_string());

        let request = GenerationRequest { user_prompt: self.state.prompt.clone(), style };
        Ok((ticket, request))
    }

    pub fn submitting(&mut self, ticket: &Ticket) -> bool {
        self.advance(ticket, Phase::Submitting, MSG_SUBMITTING.to_string())
    }

    pub fn polling(&mut self, ticket: &Ticket, budget: Duration) -> bool {
        let message = format!("Generating image (this may take up to {} seconds)...", budget.as_secs());
        self.advance(ticket, Phase::Polling, message)
    }

    pub fn succeed(&mut self, ticket: &Ticket, image_url: String) -> bool {
        if !self.advance(ticket, Phase::Succeeded, MSG_SUCCEEDED.to_string()) {
            return false;
        }
        self.state.is_generating = false;
        self.state.generated_image_url = Some(image_url);
        true
    }

    pub fn fail(&mut self, ticket: &Ticket, err: &WorkflowError) -> bool {
        let phase = if err.is_timeout() { Phase::TimedOut } else { Phase::Failed };
        if !self.advance(ticket, phase, MSG_FAILED.to_string()) {
            return false;
        }
        self.state.is_generating = false;
        self.state.error_message = Some(err.user_message());
        true
    }

    /// Back to `Idle` defaults. Any generation still running is superseded.
    pub fn reset(&mut self) {
        self.tickets.revoke_all();
        self.state = UiState::default();
        self.phase = Phase::Idle;
    }

    fn advance(&mut self, ticket: &Ticket, next: Phase, status: String) -> bool {
        if !ticket.is_current() || !self.phase.is_in_flight() {
            tracing::debug!(ticket = ticket.id(), from = ?self.phase, to = ?next, "stale transition dropped");
            return false;
        }
        self.phase = next;
        self.state.status_message = Some(status);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PollError, ProviderError};
    use crate::prompt::styles;

    fn ready() -> Presenter {
        let mut p = Presenter::new();
        p.set_prompt("a mountain lake");
        p.select_style(styles::find("minimalist").unwrap());
        p
    }

    #[test]
    fn generation_gated_on_prompt_and_style() {
        let mut p = Presenter::new();
        assert!(!p.can_generate());
        p.set_prompt("   ");
        p.select_style(&styles::STYLES[0]);
        assert!(!p.can_generate());
        p.set_prompt("a lake");
        assert!(p.can_generate());

        let mut no_style = Presenter::new();
        no_style.set_prompt("a lake");
        assert!(!no_style.can_generate());
        assert_eq!(no_style.begin().unwrap_err(), ComposeError::MissingStyle);
        assert_eq!(no_style.phase(), Phase::Idle);
        assert!(no_style.state().error_message.is_some());
    }

    #[test]
    fn walks_through_to_success() {
        let mut p = ready();
        let (ticket, request) = p.begin().unwrap();
        assert_eq!(request.user_prompt, "a mountain lake");
        assert_eq!(p.phase(), Phase::Composing);
        assert!(p.state().is_generating);

        assert!(p.submitting(&ticket));
        assert!(p.polling(&ticket, Duration::from_secs(20)));
        assert_eq!(
            p.state().status_message.as_deref(),
            Some("Generating image (this may take up to 20 seconds)...")
        );
        assert!(p.succeed(&ticket, "https://cdn/img.png".into()));
        assert_eq!(p.phase(), Phase::Succeeded);
        assert_eq!(p.state().generated_image_url.as_deref(), Some("https://cdn/img.png"));
        assert!(!p.state().is_generating);
        assert!(p.can_generate());
    }

    #[test]
    fn timeout_and_failure_are_distinct() {
        let mut p = ready();
        let (ticket, _) = p.begin().unwrap();
        assert!(p.fail(&ticket, &WorkflowError::Poll(PollError::Timeout { attempts: 10 })));
        assert_eq!(p.phase(), Phase::TimedOut);
        assert!(p.state().generated_image_url.is_none());

        let (ticket, _) = p.begin().unwrap();
        assert!(p.state().error_message.is_none());
        let err = WorkflowError::Submit(ProviderError::ProviderRejected { status: 500, body: "boom".into() });
        assert!(p.fail(&ticket, &err));
        assert_eq!(p.phase(), Phase::Failed);
        assert!(!p.state().is_generating);
    }

    #[test]
    fn newer_generation_wins() {
        let mut p = ready();
        let (old, _) = p.begin().unwrap();
        let (new, _) = p.begin().unwrap();
        assert!(!p.succeed(&old, "https://cdn/stale.png".into()));
        assert!(p.state().generated_image_url.is_none());
        assert!(p.succeed(&new, "https://cdn/fresh.png".into()));
        assert_eq!(p.state().generated_image_url.as_deref(), Some("https://cdn/fresh.png"));
    }

    #[test]
    fn reset_is_idempotent_from_any_state() {
        let idle = UiState::default();

        let mut p = ready();
        p.reset();
        p.reset();
        assert_eq!(p.state(), &idle);

        let mut p = ready();
        let (ticket, _) = p.begin().unwrap();
        p.submitting(&ticket);
        p.reset();
        assert_eq!(p.state(), &idle);
        assert_eq!(p.phase(), Phase::Idle);
        // A result arriving after the reset must not repopulate the state.
        assert!(!p.succeed(&ticket, "https://cdn/late.png".into()));
        p.reset();
        assert_eq!(p.state(), &idle);

        let mut p = ready();
        let (ticket, _) = p.begin().unwrap();
        p.succeed(&ticket, "https://cdn/img.png".into());
        p.reset();
        p.reset();
        assert_eq!(p.state(), &idle);
        assert_eq!(p.phase(), Phase::Idle);
    }
}
