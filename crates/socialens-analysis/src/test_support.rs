use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use socialens_core::{CompletionError, Completer};

pub(crate) const QUALITY_KEY: &str = "quality metrics (0-1)";
pub(crate) const SATISFACTION_KEY: &str = "satisfaction level";
pub(crate) const SENTIMENT_KEY: &str = "Analyze the sentiment";
pub(crate) const RECOMMEND_KEY: &str = "recommendations for improvement";

/// Answers prompts by the first rule whose key the prompt contains.
/// Unmatched prompts fail with a transport error.
pub(crate) struct ScriptedCompleter {
    rules: Vec<(&'static str, Result<String, String>)>,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    pub(crate) fn new() -> Self {
        Self {
            rules: Vec::new(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(mut self, key: &'static str, text: &str) -> Self {
        self.rules.push((key, Ok(text.to_owned())));
        self
    }

    pub(crate) fn fail(mut self, key: &'static str) -> Self {
        self.rules.push((key, Err("scripted failure".to_owned())));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A completer whose every analyzer answers well-formed output.
    pub(crate) fn healthy() -> Self {
        Self::new()
            .reply(
                QUALITY_KEY,
                r#"{"relevance": 0.9, "clarity": 0.8, "flow": 0.85, "engagement": 0.75}"#,
            )
            .reply(SATISFACTION_KEY, "0.9")
            .reply(
                SENTIMENT_KEY,
                r#"{"score": 0.8, "emotions": ["happy"], "engagement_level": 0.7,
                    "topics": ["hiking"], "mood_narrative": "Upbeat.", "main_topics": ["hiking"]}"#,
            )
            .reply(RECOMMEND_KEY, "- Ask a follow-up question\n- Keep answers short")
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, key: &str) -> usize {
        self.prompts().iter().filter(|p| p.contains(key)).count()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.rules.iter().find(|(key, _)| prompt.contains(key)) {
            Some((_, Ok(text))) => Ok(text.clone()),
            Some((_, Err(reason))) => Err(CompletionError::Transport(reason.clone())),
            None => Err(CompletionError::Transport("no scripted reply".to_owned())),
        }
    }
}
