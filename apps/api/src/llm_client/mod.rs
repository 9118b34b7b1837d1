/// LLM Client — the single point of entry for all completion API calls.
///
/// No other module may call the completion API directly; generation code
/// depends on the `TextCompleter` trait and receives this client through `AppState`.
///
/// Model: gpt-3.5-turbo-instruct (hardcoded, the prompts are tuned for it)
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const COMPLETIONS_PATH: &str = "/v1/completions";
/// The model used for every completion call.
pub const MODEL: &str = "gpt-3.5-turbo-instruct";

/// A completion failure, split by what the user can do about it.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication rejected (status {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("quota or rate limit exceeded (status {status}): {message}")]
    Quota { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Per-call parameters. The model is fixed; everything else varies by task.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Text of the first choice, trimmed. `None` when there is nothing usable.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<serde_json::Value>,
}

/// Something that turns a prompt into generated text.
///
/// Carried in `AppState` as `Arc<dyn TextCompleter>` so the pipeline can be
/// exercised without a network.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<String, CompletionError>;
}

/// Completion client for the OpenAI legacy completions API.
/// One request per call: no retry, no streaming.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
}

impl LlmClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETIONS_PATH)
    }

    /// Makes a raw call to the completions endpoint, returning the parsed response.
    pub async fn call(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, CompletionError> {
        let body = OpenAiRequest {
            model: MODEL,
            prompt: request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Completion API returned {status}");
            return Err(classify_failure(status, &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl TextCompleter for LlmClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<String, CompletionError> {
        let response = self.call(api_key, request).await?;
        response.text().map(str::to_string).ok_or_else(|| {
            CompletionError::MalformedResponse("completion contained no text".to_string())
        })
    }
}

/// Maps a non-success status and its body onto a `CompletionError`.
fn classify_failure(status: StatusCode, body: &str) -> CompletionError {
    let parsed = serde_json::from_str::<OpenAiError>(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|e| e.error.code.as_ref())
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();
    let error_type = parsed
        .as_ref()
        .and_then(|e| e.error.error_type.clone())
        .unwrap_or_default();
    let message = match parsed {
        Some(e) => e.error.message,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    };
    let status = status.as_u16();

    if status == 401 || status == 403 || code == "invalid_api_key" {
        CompletionError::Authentication { status, message }
    } else if status == 429
        || matches!(code.as_str(), "insufficient_quota" | "rate_limit_exceeded")
        || error_type == "insufficient_quota"
    {
        CompletionError::Quota { status, message }
    } else {
        CompletionError::Api { status, message }
    }
}
