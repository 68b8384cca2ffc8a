use std::env;

use anyhow::{anyhow, Result};

/// Connection details for the hosted model and its IAM token exchange.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_id: String,
    pub api_url: String,
    pub iam_token_url: String,
    pub api_key: String,
    pub project_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub port: u16,
    /// Timeout applied to every outbound call (token exchange and generation).
    pub upstream_timeout_ms: u64,
    pub max_request_bytes: Option<usize>,
    pub log_requests: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let model = ModelConfig {
            model_id: required("MODEL_ID")?,
            api_url: required("API_URL")?,
            iam_token_url: required("IAM_TOKEN_URL")?,
            api_key: required("API_KEY")?,
            project_id: required("PROJECT_ID")?,
        };

        let port = match parse_optional_u64("PORT")? {
            Some(p) => u16::try_from(p).map_err(|_| anyhow!("PORT must fit in 16 bits"))?,
            None => 8080,
        };
        let upstream_timeout_ms = parse_optional_u64("UPSTREAM_TIMEOUT_MS")?.unwrap_or(30_000);
        let max_request_bytes = parse_optional_u64("MAX_REQUEST_BYTES")?.map(|v| v as usize);
        let log_requests = parse_bool_env("IRAB_LOG_REQUESTS")?.unwrap_or(false);

        Ok(Self {
            model,
            port,
            upstream_timeout_ms,
            max_request_bytes,
            log_requests,
        })
    }
}

fn required(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) | Err(env::VarError::NotPresent) => Err(anyhow!("{} must be set", var)),
        Err(err) => Err(err.into()),
    }
}

fn parse_optional_u64(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a positive integer", var)),
        Ok(_) => Ok(None),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_bool_env(var: &str) -> Result<Option<bool>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => parse_bool(&value)
            .map(Some)
            .ok_or_else(|| anyhow!("{} must be a boolean (true/false/1/0)", var)),
        Ok(_) => Ok(None),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
