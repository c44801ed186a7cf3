//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use socialens_core::{AppConfig, CompletionError, Completer};

const TEMPERATURE: f64 = 0.3;

/// [`Completer`] that sends each prompt as a single user message to
/// `{base_url}/chat/completions` and returns the first choice's content.
pub struct OpenAiCompleter {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiCompleter {
    /// # Errors
    ///
    /// Returns [`CompletionError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_owned(),
        })
    }

    /// Build from configuration. Returns `Ok(None)` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, CompletionError> {
        config
            .openai_api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    key,
                    &config.llm_base_url,
                    &config.llm_model,
                    config.llm_timeout_secs,
                )
            })
            .transpose()
    }
}

impl std::fmt::Debug for OpenAiCompleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompleter")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let req_body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(500).collect();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        body.get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                CompletionError::MalformedResponse("missing choices[0].message.content".to_owned())
            })
    }
}
