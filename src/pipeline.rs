//! Two-stage analysis: a cheap validation call, then the full i'rab call.
//!
//! Each stage fetches its own bearer token. The validation stage's output
//! is classified by [`crate::classify`]; the full analysis is only issued
//! for sentences the model considers analyzable.

use std::sync::Arc;
use std::time::Instant;

use crate::classify::{classify_validation, ValidationVerdict};
use crate::error::AnalysisError;
use crate::gate::check_sentence;
use crate::model::TextGenerator;
use crate::prompts::Stage;
use crate::token::TokenProvider;

/// Shown instead of an empty analysis.
pub const EMPTY_RESULT_FALLBACK: &str = "الجملة غير صحيحة أو لا يمكن تحليلها. جرب جملة ثانية! 😊";

/// Successful analysis. `fallback` is set when the model produced no text
/// and the friendly placeholder was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub text: String,
    pub fallback: bool,
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    tokens: Arc<dyn TokenProvider>,
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisPipeline {
    pub fn new(tokens: Arc<dyn TokenProvider>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { tokens, generator }
    }

    /// Local checks, then validation, then full analysis.
    pub async fn analyze(&self, sentence: &str) -> Result<Analysis, AnalysisError> {
        check_sentence(sentence)?;

        let verdict_text = self.run_stage(Stage::Validation, sentence).await?;
        if let ValidationVerdict::Rejected(marker) = classify_validation(&verdict_text) {
            tracing::info!(marker, "validation stage rejected sentence");
            return Err(AnalysisError::ValidationRejected);
        }

        let generated = self.run_stage(Stage::Analysis, sentence).await?;
        let trimmed = generated.trim();
        if trimmed.is_empty() {
            tracing::debug!("analysis stage returned empty text, using fallback");
            return Ok(Analysis {
                text: EMPTY_RESULT_FALLBACK.to_string(),
                fallback: true,
            });
        }
        Ok(Analysis {
            text: trimmed.to_string(),
            fallback: false,
        })
    }

    async fn run_stage(&self, stage: Stage, sentence: &str) -> Result<String, AnalysisError> {
        let token = self.tokens.access_token().await?;
        let prompt = stage.prompt(sentence);
        let params = stage.params();
        let start = Instant::now();
        let result = self.generator.generate(&token, &prompt, &params).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(text) => tracing::debug!(
                stage = stage.name(),
                elapsed_ms,
                chars = text.chars().count(),
                "stage completed"
            ),
            Err(err) => tracing::warn!(stage = stage.name(), elapsed_ms, error = %err, "stage failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;
    use crate::prompts::{GenerationParams, ANALYSIS_CUE};
    use crate::token::Token;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubTokens {
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubTokens {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl TokenProvider for StubTokens {
        async fn access_token(&self) -> Result<Token, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TokenError::MissingToken)
            } else {
                Ok(Token::new("stub"))
            }
        }
    }

    /// Replies per stage, telling stages apart by the analysis cue.
    struct StubModel {
        validation: Result<String, u16>,
        analysis: Result<String, u16>,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl StubModel {
        fn new(validation: Result<&str, u16>, analysis: Result<&str, u16>) -> Arc<Self> {
            Arc::new(Self {
                validation: validation.map(str::to_string),
                analysis: analysis.map(str::to_string),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for StubModel {
        async fn generate(
            &self,
            _token: &Token,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<String, AnalysisError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), params.max_new_tokens));
            let reply = if prompt.ends_with(ANALYSIS_CUE) {
                &self.analysis
            } else {
                &self.validation
            };
            reply.clone().map_err(|status| AnalysisError::Upstream {
                status: Some(status),
                body: format!("status {}", status),
            })
        }
    }

    fn pipeline(tokens: &Arc<StubTokens>, model: &Arc<StubModel>) -> AnalysisPipeline {
        AnalysisPipeline::new(tokens.clone(), model.clone())
    }

    #[tokio::test]
    async fn full_run_fetches_a_token_per_stage() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Ok("تحليل"), Ok("  نص إعراب \n"));
        let out = pipeline(&tokens, &model).analyze("الطفل يلعب").await.unwrap();
        assert_eq!(out.text, "نص إعراب");
        assert!(!out.fallback);
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 2);
        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, 50);
        assert_eq!(calls[1].1, 300);
    }

    #[tokio::test]
    async fn gate_rejection_makes_no_calls() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Ok(""), Ok(""));
        let p = pipeline(&tokens, &model);
        assert!(matches!(p.analyze("x").await, Err(AnalysisError::TooShort)));
        assert!(matches!(
            p.analyze("hello world").await,
            Err(AnalysisError::NotArabic)
        ));
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn token_failure_skips_model() {
        let tokens = StubTokens::new(true);
        let model = StubModel::new(Ok("تحليل"), Ok("نص"));
        let err = pipeline(&tokens, &model)
            .analyze("الطفل يلعب")
            .await
            .expect_err("token failure");
        assert!(matches!(err, AnalysisError::Auth(_)));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn validation_rejection_stops_before_analysis() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Ok("الجملة غير مفهومة"), Ok("نص"));
        let err = pipeline(&tokens, &model)
            .analyze("الطفل يلعب")
            .await
            .expect_err("rejected");
        assert!(matches!(err, AnalysisError::ValidationRejected));
        assert_eq!(model.calls().len(), 1);
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validation_http_failure_propagates() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Err(503), Ok("نص"));
        let err = pipeline(&tokens, &model)
            .analyze("الطفل يلعب")
            .await
            .expect_err("upstream");
        assert_eq!(err.user_message(), "في مشكلة: status 503");
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn analysis_http_failure_propagates() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Ok("تحليل"), Err(500));
        let err = pipeline(&tokens, &model)
            .analyze("الطفل يلعب")
            .await
            .expect_err("upstream");
        assert!(matches!(
            err,
            AnalysisError::Upstream {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blank_analysis_uses_fallback() {
        let tokens = StubTokens::new(false);
        let model = StubModel::new(Ok("تحليل"), Ok("   \n "));
        let out = pipeline(&tokens, &model).analyze("الطفل يلعب").await.unwrap();
        assert_eq!(out.text, EMPTY_RESULT_FALLBACK);
        assert!(out.fallback);
    }
}
