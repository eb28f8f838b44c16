use async_trait::async_trait;
use chatrs_core::{
    ChatError, Completion, CompletionProvider, CompletionRequest, Credential, Usage,
};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible text-completion endpoint.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
}

impl OpenAiProvider {
    /// Build a provider whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating OpenAiProvider (timeout {}s)", timeout.as_secs());
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Pull `error.message` out of an error body, falling back to the raw text.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string())
    }

    fn transport_error(err: &reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::upstream("request to completion endpoint timed out")
        } else {
            ChatError::upstream(format!("request to completion endpoint failed: {err}"))
        }
    }

    fn parse_completion(body: &serde_json::Value) -> Result<Completion, ChatError> {
        let text = body["choices"][0]["text"]
            .as_str()
            .ok_or_else(|| ChatError::upstream("Invalid response format: missing text"))?
            .to_string();

        let usage = body["usage"].as_object().map(|u| Usage {
            prompt_tokens: u32::try_from(u["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
            completion_tokens: u32::try_from(u["completion_tokens"].as_u64().unwrap_or(0))
                .unwrap_or(0),
            total_tokens: u32::try_from(u["total_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
        });

        Ok(Completion { text, usage })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<Completion, ChatError> {
        let body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(
            "Sending completion request: model={}, prompt_chars={}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = Self::error_message(&text);
            warn!("Completion endpoint returned {status}");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ChatError::authentication(message)
                }
                _ => ChatError::upstream(format!("HTTP {status}: {message}")),
            });
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ChatError::upstream(format!("Invalid response body: {e}")))?;

        let completion = Self::parse_completion(&json)?;
        if let Some(usage) = &completion.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        Ok(completion)
    }
}
