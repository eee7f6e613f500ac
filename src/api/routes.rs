//! Shared state and the router served by the binary.
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::config::ServiceOptions;
use crate::prompt::composer::PromptComposer;
use crate::provider::ImageProvider;
use crate::workflow::poller::{JobPoller, PollConfig};
use crate::workflow::submitter::JobSubmitter;

pub struct AppState {
    pub composer: PromptComposer,
    pub provider: Arc<dyn ImageProvider>,
    pub submitter: JobSubmitter,
    pub poller: JobPoller,
    pub poll_config: PollConfig,
    pub options: ServiceOptions,
}

impl AppState {
    pub fn new(provider: Arc<dyn ImageProvider>, poll_config: PollConfig, options: ServiceOptions) -> Self {
        AppState {
            composer: PromptComposer::new(),
            submitter: JobSubmitter::new(Arc::clone(&provider)),
            poller: JobPoller::new(Arc::clone(&provider)),
            provider,
            poll_config,
            options,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/styles", get(handlers::list_styles))
        .route("/prompt-enhance", post(handlers::prompt_enhance))
        .route("/art-generate", post(handlers::art_generate))
        .route("/art-status", get(handlers::art_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
