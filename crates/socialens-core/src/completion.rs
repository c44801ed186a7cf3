//! Contract for the generative text service.
//!
//! The core treats the service as an opaque `prompt -> text` function. Every
//! caller parses and validates the returned text itself; nothing here assumes
//! a response schema.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("generative service request failed: {0}")]
    Transport(String),

    #[error("generative service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generative service response could not be read: {0}")]
    MalformedResponse(String),

    #[error("generative service is not configured")]
    NotConfigured,
}

/// A generative text service: one prompt in, plain text out.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError`] when the service is unreachable, answers
    /// with a non-success status, or returns a body without usable text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Completer used when no generative service is configured.
///
/// Every call fails with [`CompletionError::NotConfigured`], which drives the
/// callers onto their templated or default outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompleter;

#[async_trait]
impl Completer for DisabledCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::NotConfigured)
    }
}
