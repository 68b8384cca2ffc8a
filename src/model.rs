//! Client for the hosted text-generation endpoint.

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::AnalysisError;
use crate::prompts::GenerationParams;
use crate::token::Token;

/// One prompt-in, text-out call against the hosted model.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw generated text (untrimmed, empty when absent).
    async fn generate(
        &self,
        token: &Token,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, AnalysisError>;
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub input: &'a str,
    pub parameters: &'a GenerationParams,
    pub model_id: &'a str,
    pub project_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationResult {
    #[serde(default)]
    generated_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    results: Vec<GenerationResult>,
}

impl GenerationResponse {
    fn first_text(self) -> String {
        self.results
            .into_iter()
            .next()
            .and_then(|r| r.generated_text)
            .unwrap_or_default()
    }
}

pub struct WatsonxClient {
    api_url: String,
    model_id: String,
    project_id: String,
    client: reqwest::Client,
}

impl WatsonxClient {
    pub fn new(cfg: &ModelConfig, client: reqwest::Client) -> Self {
        Self {
            api_url: cfg.api_url.clone(),
            model_id: cfg.model_id.clone(),
            project_id: cfg.project_id.clone(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for WatsonxClient {
    async fn generate(
        &self,
        token: &Token,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, AnalysisError> {
        let body = GenerationRequest {
            input: prompt,
            parameters: params,
            model_id: &self.model_id,
            project_id: &self.project_id,
        };
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(token.as_str())
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = ?err, "generation request failed");
                AnalysisError::Upstream {
                    status: None,
                    body: err.to_string(),
                }
            })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|err| {
            tracing::warn!(status = status.as_u16(), error = ?err, "generation read error");
            AnalysisError::Upstream {
                status: Some(status.as_u16()),
                body: err.to_string(),
            }
        })?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "generation endpoint returned error status");
            return Err(AnalysisError::Upstream {
                status: Some(status.as_u16()),
                body: text,
            });
        }
        let parsed: GenerationResponse = serde_json::from_str(&text).map_err(|err| {
            tracing::warn!(status = status.as_u16(), error = %err, "generation parse error");
            AnalysisError::Upstream {
                status: Some(status.as_u16()),
                body: text.clone(),
            }
        })?;
        Ok(parsed.first_text())
    }
}
