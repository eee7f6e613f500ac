//! Canvas art proxy library
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the server binary.
//! - `provider`: Client for the Replicate-style predictions API.
//! - `prompt`: Style catalog and prompt composition.
//! - `workflow`: Job submission, status polling and the presenter state machine.
//! - `config`: Env-driven configuration loader.
//! - `error`: Error types and the HTTP status mapping.
//!
//! Re-exports are provided for common types: `Config`, `ReplicateClient`,
//! `PromptComposer`, `GenerationWorkflow` and `Presenter`.
pub mod api;
pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod workflow;

pub use config::Config;
pub use prompt::composer::PromptComposer;
pub use provider::client::ReplicateClient;
pub use workflow::presenter::Presenter;
pub use workflow::GenerationWorkflow;
