/// LLM Client: the single point of entry for all model calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the model endpoint directly.
/// All LLM interactions go through the `TextGenerator` trait; `LlmClient`
/// is the production implementation.
///
/// Endpoint: OpenAI-compatible chat completions (Azure AI), streamed as SSE.
/// The reasoning model may take minutes, hence the long default timeout.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Opaque text-generation capability. Slow and fallible; replies are
/// semi-structured and may wrap JSON in markdown fences.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, LlmError>;
}

/// Calls the generator and deserializes the reply as JSON after stripping
/// markdown code fences. The prompt must ask for JSON.
pub async fn complete_json<T: DeserializeOwned>(
    llm: &dyn TextGenerator,
    system_prompt: &str,
    user_content: &str,
) -> Result<T, LlmError> {
    let text = llm.complete(system_prompt, user_content).await?;
    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(extract_json_block(&text)).map_err(LlmError::Parse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Non-streamed completion body.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<ChoiceContent>,
}

/// One `data:` chunk of a streamed completion.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<ChoiceContent>,
}

#[derive(Debug, Deserialize)]
struct ChoiceContent {
    content: Option<String>,
}

/// Production `TextGenerator`. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Initialized LLM client for {endpoint} (streaming enabled)");
        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a streamed chat-completion call and returns the accumulated text.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential
    /// backoff.
    pub async fn call(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            stream: true,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .header("api-key", &self.api_key)
                .header("content-type", "application/json")
                .header("accept", "text/event-stream")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let content = parse_completion_body(&body);

            debug!("LLM call succeeded: {} chars of content", content.len());

            if content.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, LlmError> {
        self.call(system_prompt, user_content).await
    }
}

/// Accepts either an SSE stream body or a plain JSON completion (some
/// deployments ignore `stream: true`).
fn parse_completion_body(body: &str) -> String {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        if let Ok(completion) = serde_json::from_str::<ChatCompletion>(trimmed) {
            return completion
                .choices
                .into_iter()
                .filter_map(|c| c.message.and_then(|m| m.content))
                .collect();
        }
    }
    parse_sse_stream(body)
}

/// Concatenates `choices[].delta.content` across `data:` lines until
/// `[DONE]`. Malformed chunks are skipped.
fn parse_sse_stream(body: &str) -> String {
    let mut content = String::new();

    for line in body.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data == "[DONE]" {
            break;
        }
        let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
            continue;
        };
        for choice in chunk.choices {
            if let Some(text) = choice.delta.and_then(|d| d.content) {
                content.push_str(&text);
            }
        }
    }

    content
}

/// Returns the JSON payload inside ```json ... ``` or ``` ... ``` fences,
/// wherever they appear, or the trimmed text when there are none.
fn extract_json_block(text: &str) -> &str {
    let text = text.trim();
    let inner = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else if let Some((_, rest)) = text.split_once("```") {
        rest
    } else {
        return text;
    };
    inner.split("```").next().unwrap_or(inner).trim()
}
