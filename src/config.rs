//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
//! Nothing here touches process-wide state: each component receives the part
//! of `Config` it needs at construction.
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::workflow::poller::PollConfig;

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "black-forest-labs/flux-1.1-pro";
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "/images/placeholder-art.jpg";
pub const TOKEN_VAR: &str = "REPLICATE_API_TOKEN";

/// Where the provider credential comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiToken {
    /// Looked up in the environment every time it is needed.
    Env(String),
    Fixed(String),
}

impl ApiToken {
    /// Current token value; blank values count as missing.
    pub fn resolve(&self) -> Option<String> {
        let raw = match self {
            ApiToken::Env(var) => env::var(var).ok()?,
            ApiToken::Fixed(value) => value.clone(),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Name used in log lines and config errors. Never the secret itself.
    pub fn describe(&self) -> String {
        match self {
            ApiToken::Env(var) => var.clone(),
            ApiToken::Fixed(_) => "fixed token".to_string(),
        }
    }
}

/// Fixed generation parameters sent with every job. 16:9 frame at 84px per
/// ratio unit.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub prompt_upsampling: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            width: 1344,
            height: 756,
            num_inference_steps: 30,
            prompt_upsampling: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_base: String,
    pub api_token: ApiToken,
    pub model: String,
    pub params: GenerationParams,
    /// Scoped to the provider HTTP client only.
    pub accept_invalid_certs: bool,
}

impl ProviderConfig {
    pub fn new(api_base: impl Into<String>, api_token: ApiToken) -> Self {
        ProviderConfig {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_token,
            model: DEFAULT_MODEL.to_string(),
            params: GenerationParams::default(),
            accept_invalid_certs: false,
        }
    }
}

/// Debug-only behavior switches for the HTTP API.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub placeholder_on_failure: bool,
    pub placeholder_image_url: String,
    pub expose_error_details: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            placeholder_on_failure: false,
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            expose_error_details: false,
        }
    }
}

pub struct Config {
    pub api_host: String,
    pub api_port: String,
    pub provider: ProviderConfig,
    pub poll: PollConfig,
    pub service: ServiceOptions,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        let mut provider = ProviderConfig::new(
            env::var("REPLICATE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            ApiToken::Env(TOKEN_VAR.to_string()),
        );
        provider.model = env::var("REPLICATE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        provider.accept_invalid_certs = env_flag("ACCEPT_INVALID_CERTS")?;

        let defaults = PollConfig::default();
        let poll = PollConfig {
            interval: Duration::from_millis(env_number("POLL_INTERVAL_MS", defaults.interval.as_millis() as u64)?),
            max_attempts: attempts_from(env_number("POLL_MAX_ATTEMPTS", u64::from(defaults.max_attempts))?)?,
        };

        let service = ServiceOptions {
            placeholder_on_failure: env_flag("PLACEHOLDER_ON_FAILURE")?,
            placeholder_image_url: env::var("PLACEHOLDER_IMAGE_URL")
                .unwrap_or_else(|_| DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()),
            expose_error_details: env_flag("EXPOSE_ERROR_DETAILS")?,
        };

        Ok(Config {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "3000".to_string()),
            provider,
            poll,
            service,
        })
    }

    pub fn log_summary(&self) {
        tracing::info!(
            api_base = %self.provider.api_base,
            model = %self.provider.model,
            token = if self.provider.api_token.resolve().is_some() { "<set>" } else { "<unset>" },
            poll_interval_ms = self.poll.interval.as_millis() as u64,
            poll_max_attempts = self.poll.max_attempts,
            "provider configuration"
        );
        if self.provider.accept_invalid_certs {
            tracing::warn!("TLS certificate validation disabled for provider requests");
        }
        if self.service.placeholder_on_failure {
            tracing::warn!("placeholder image will be returned on provider failures");
        }
    }
}

fn env_flag(name: &str) -> AppResult<bool> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(v) => parse_flag(&v).ok_or_else(|| AppError::Config(format!("{} must be a boolean, got '{}'", name, v))),
    }
}

fn env_number(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", name, v))),
    }
}

pub(crate) fn attempts_from(raw: u64) -> AppResult<u32> {
    match u32::try_from(raw) {
        Ok(0) => Err(AppError::Config("POLL_MAX_ATTEMPTS must be at least 1".to_string())),
        Ok(n) => Ok(n),
        Err(_) => Err(AppError::Config(format!("POLL_MAX_ATTEMPTS is out of range, got {}", raw))),
    }
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
