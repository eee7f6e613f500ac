//! Axum request handlers for the HTTP API.
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::routes::AppState;
use crate::error::{AppError, AppResult, PollError, ProviderError};
use crate::prompt::styles::{self, Style};
use crate::provider::types::{is_valid_job_id, JobStatus, Prediction};
use crate::provider::ImageProvider;
use crate::workflow::ticket::Ticket;

const PLACEHOLDER_ID_PREFIX: &str = "placeholder-";

pub async fn root() -> &'static str {
    "Canvas Art Proxy"
}

pub async fn list_styles() -> Json<&'static [Style]> {
    Json(styles::all())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
}

/// `POST /prompt-enhance`. The style may name a catalog id, carry a
/// free-form `prompt` suffix, or be left out.
pub async fn prompt_enhance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<EnhanceResponse>> {
    let Json(payload) = payload.map_err(unreadable_body)?;
    let prompt = payload
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Prompt is required".to_string()))?;

    let style = payload.get("style");
    let catalog = style.and_then(|s| s.get("id")).and_then(Value::as_str).and_then(styles::find);
    let enhanced_prompt = match catalog {
        Some(style) => state.composer.compose(prompt, Some(style))?,
        None => {
            let suffix = style.and_then(|s| s.get("prompt")).and_then(Value::as_str);
            state.composer.compose_with_suffix(prompt, suffix)?
        }
    };
    tracing::info!(%enhanced_prompt, "prompt enhanced");
    Ok(Json(EnhanceResponse { enhanced_prompt }))
}

fn unreadable_body(rejection: JsonRejection) -> AppError {
    AppError::Internal(format!("unreadable request body: {}", rejection.body_text()))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub id: String,
    pub status: JobStatus,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<Prediction> for StatusResponse {
    fn from(p: Prediction) -> Self {
        StatusResponse {
            output: p.image_url().map(str::to_string),
            error: p.error_message(),
            id: p.id,
            status: p.status,
            created_at: p.created_at,
            completed_at: p.completed_at,
        }
    }
}

/// `POST /art-generate`: submit and, unless `?async=true`, wait for the image.
pub async fn art_generate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject(&state, unreadable_body(rejection)),
    };
    let async_flag = params.get("async").map(|v| v == "true" || v == "1").unwrap_or(false);
    let prompt = match payload.get("prompt").and_then(Value::as_str).filter(|p| !p.trim().is_empty()) {
        Some(p) => p.to_string(),
        None => return AppError::BadRequest("Prompt is required and must be a string".to_string()).into_response(),
    };

    if async_flag {
        match state.submitter.submit(&prompt).await {
            Ok(handle) => Json(handle).into_response(),
            Err(e) => reject_or_placeholder(&state, e.into(), true),
        }
    } else {
        match generate_and_wait(&state, &prompt).await {
            Ok(url) => Json(json!({ "imageUrl": url })).into_response(),
            Err(e) => reject_or_placeholder(&state, e, false),
        }
    }
}

async fn generate_and_wait(state: &AppState, prompt: &str) -> AppResult<String> {
    let handle = state.submitter.submit(prompt).await?;
    let url = state
        .poller
        .poll_until_terminal(&handle, &state.poll_config, &Ticket::detached())
        .await?;
    Ok(url)
}

/// `GET /art-status?id=<job id>`
pub async fn art_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let id = match params.get("id").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(id) if is_valid_job_id(id) => id.to_string(),
        Some(_) => return AppError::BadRequest("Invalid generation ID".to_string()).into_response(),
        None => return AppError::BadRequest("Missing generation ID".to_string()).into_response(),
    };

    if state.options.placeholder_on_failure && id.starts_with(PLACEHOLDER_ID_PREFIX) {
        return Json(placeholder_status(&state, id)).into_response();
    }

    match state.provider.get_prediction(&id).await {
        Ok(prediction) => {
            tracing::info!(%id, status = prediction.status.as_str(), "status checked");
            Json(StatusResponse::from(prediction)).into_response()
        }
        Err(e) => reject(&state, e.into()),
    }
}

fn placeholder_status(state: &AppState, id: String) -> StatusResponse {
    StatusResponse {
        id,
        status: JobStatus::Succeeded,
        output: Some(state.options.placeholder_image_url.clone()),
        error: None,
        created_at: None,
        completed_at: None,
    }
}

/// Failures on the provider's side of the fence. Input and configuration
/// problems are never papered over with a placeholder.
fn is_provider_side(err: &AppError) -> bool {
    match err {
        AppError::Provider(ProviderError::Config(_)) => false,
        AppError::Provider(_) => true,
        AppError::Poll(PollError::Superseded | PollError::Config(_)) => false,
        AppError::Poll(_) => true,
        _ => false,
    }
}

fn reject_or_placeholder(state: &AppState, err: AppError, async_shape: bool) -> Response {
    if !(state.options.placeholder_on_failure && is_provider_side(&err)) {
        return reject(state, err);
    }
    tracing::warn!("returning placeholder image after provider failure: {}", err);
    let url = state.options.placeholder_image_url.clone();
    if async_shape {
        let id = format!("{}{}", PLACEHOLDER_ID_PREFIX, uuid::Uuid::new_v4().simple());
        Json(placeholder_status(state, id)).into_response()
    } else {
        Json(json!({ "imageUrl": url, "placeholder": true })).into_response()
    }
}

fn reject(state: &AppState, err: AppError) -> Response {
    if state.options.expose_error_details {
        tracing::error!("request failed: {}", err);
        err.into_detailed_response()
    } else {
        err.into_response()
    }
}
