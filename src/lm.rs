//! # Language Model Client Module
//!
//! Client for a hosted text-generation endpoint (Hugging Face Inference API
//! shape). The endpoint is an opaque collaborator: a prompt goes in, generated
//! text comes out, possibly wrapped in a list or object that must be unwrapped.
//! Calls are guarded by a circuit breaker.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::LmConfig;
use crate::errors::FetchError;

pub const SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const PARAPHRASE_MODEL: &str = "Vamsi/T5_Paraphrase_Paws";

/// A single generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model override; `None` uses the client's default model
    pub model: Option<String>,
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            max_new_tokens: 200,
            temperature: 0.7,
        }
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Hosted text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, FetchError>;
}

/// Text transformations offered as explicit verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NlpTask {
    Summarize,
    Shorten,
    Expand,
    Paraphrase,
}

impl NlpTask {
    pub fn model(self) -> Option<&'static str> {
        match self {
            NlpTask::Summarize | NlpTask::Shorten => Some(SUMMARIZATION_MODEL),
            NlpTask::Paraphrase => Some(PARAPHRASE_MODEL),
            NlpTask::Expand => None,
        }
    }

    pub fn prompt(self, text: &str) -> String {
        match self {
            NlpTask::Expand => format!("{text} -> explain in detail"),
            _ => text.to_string(),
        }
    }

    /// Localization key suffix ("nlp-summary", "nlp-failed-summary", ...)
    pub fn key(self) -> &'static str {
        match self {
            NlpTask::Summarize => "summary",
            NlpTask::Shorten => "shortened",
            NlpTask::Expand => "expanded",
            NlpTask::Paraphrase => "paraphrased",
        }
    }

    pub fn request(self, text: &str, max_new_tokens: u32) -> GenerationRequest {
        let request = GenerationRequest::new(self.prompt(text)).max_new_tokens(max_new_tokens);
        match self.model() {
            Some(model) => request.model(model),
            None => request,
        }
    }
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

/// Pull generated text out of the endpoint's list/dict wrappers
pub fn extract_generated_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(extract_generated_text),
        Value::Object(map) => ["generated_text", "summary_text", "translation_text", "text"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }?;
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Hugging Face Inference API client
pub struct HfInferenceClient {
    client: reqwest::Client,
    config: LmConfig,
    breaker: CircuitBreaker,
}

impl HfInferenceClient {
    pub fn new(config: LmConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let breaker = CircuitBreaker::new(config.breaker.clone());
        Ok(Self {
            client,
            config,
            breaker,
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn call(&self, request: &GenerationRequest) -> Result<String, FetchError> {
        if self.config.api_key.is_empty() {
            return Err(FetchError::MissingCredential);
        }

        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let url = format!("{}/models/{}", self.config.base_url, model);
        let body = InferenceRequest {
            inputs: &request.prompt,
            parameters: InferenceParameters {
                max_new_tokens: request.max_new_tokens,
                temperature: request.temperature,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let value: Value = response.json().await?;
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(FetchError::Decode(error.to_string()));
        }

        let text = extract_generated_text(&value)
            .ok_or_else(|| FetchError::Decode("no generated text in response".to_string()))?;

        // Some models echo the prompt even with return_full_text=false
        let text = text
            .strip_prefix(request.prompt.as_str())
            .map(|rest| rest.trim().to_string())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(text);
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for HfInferenceClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, FetchError> {
        if self.breaker.is_open() {
            return Err(FetchError::CircuitOpen("inference endpoint".to_string()));
        }

        match self.call(&request).await {
            Ok(text) => {
                self.breaker.record_success();
                debug!(chars = text.len(), "Generation succeeded");
                Ok(text)
            }
            Err(e) => {
                self.breaker.record_failure();
                warn!(error = %e, failures = self.breaker.failure_count(), "Generation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakerConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> HfInferenceClient {
        let mut config = LmConfig::new("hf_test");
        config.base_url = base_url.to_string();
        config.timeout_secs = 2;
        config.breaker = BreakerConfig {
            threshold: 2,
            reset_secs: 60,
        };
        HfInferenceClient::new(config).unwrap()
    }

    #[test]
    fn test_extract_generated_text_shapes() {
        assert_eq!(
            extract_generated_text(&json!([{"generated_text": " hi "}])).as_deref(),
            Some("hi")
        );
        assert_eq!(
            extract_generated_text(&json!({"generated_text": "dict"})).as_deref(),
            Some("dict")
        );
        assert_eq!(
            extract_generated_text(&json!([{"summary_text": "short"}])).as_deref(),
            Some("short")
        );
        assert_eq!(extract_generated_text(&json!([{"generated_text": "   "}])), None);
        assert_eq!(extract_generated_text(&json!({"unexpected": 1})), None);
    }

    #[test]
    fn test_nlp_task_requests() {
        let summarize = NlpTask::Summarize.request("long text", 120);
        assert_eq!(summarize.model.as_deref(), Some(SUMMARIZATION_MODEL));
        assert_eq!(summarize.prompt, "long text");

        let expand = NlpTask::Expand.request("gravity", 120);
        assert_eq!(expand.model, None);
        assert_eq!(expand.prompt, "gravity -> explain in detail");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/google/flan-t5-small"))
            .and(header("authorization", "Bearer hf_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "Hello there"}])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.generate(GenerationRequest::new("Hi")).await.unwrap();
        assert_eq!(text, "Hello there");
    }

    #[tokio::test]
    async fn test_model_override_and_prompt_echo_stripped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gpt2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "Question: x Answer: y"}])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client
            .generate(GenerationRequest::new("Question: x").model("gpt2"))
            .await
            .unwrap();
        assert_eq!(text, "Answer: y");
    }

    #[tokio::test]
    async fn test_error_body_and_breaker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Model is loading"})))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.generate(GenerationRequest::new("a")).await.is_err());
        assert!(client.generate(GenerationRequest::new("b")).await.is_err());
        assert_eq!(client.breaker().failure_count(), 2);

        // Threshold reached: fails fast without touching the server
        let err = client.generate(GenerationRequest::new("c")).await.unwrap_err();
        assert!(matches!(err, FetchError::CircuitOpen(_)));
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(GenerationRequest::new("a")).await.unwrap_err();
        assert_eq!(err, FetchError::Status(503));
    }
}
