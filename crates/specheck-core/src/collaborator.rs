//! Bounded, deterministic round-trips to the language-model collaborator.

use std::time::Duration;

use specheck_llm::{ChatOptions, LlmError, LlmProvider, Message};

/// Decoding parameters plus the caller-visible deadline for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestSettings {
    pub options: ChatOptions,
    pub timeout: Duration,
}

impl RequestSettings {
    #[must_use]
    pub fn new(max_tokens: u32, timeout: Duration) -> Self {
        Self {
            options: ChatOptions::deterministic(max_tokens),
            timeout,
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            options: ChatOptions::default(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Send one request and wait at most `settings.timeout` for the completion.
///
/// # Errors
///
/// Returns the provider's error, or [`LlmError::Timeout`] when the deadline passes.
pub async fn round_trip<P: LlmProvider>(
    provider: &P,
    messages: &[Message],
    settings: &RequestSettings,
) -> Result<String, LlmError> {
    match tokio::time::timeout(settings.timeout, provider.chat(messages, settings.options)).await
    {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                provider = provider.name(),
                timeout_secs = settings.timeout.as_secs(),
                "collaborator request timed out"
            );
            Err(LlmError::Timeout {
                seconds: settings.timeout.as_secs(),
            })
        }
    }
}
