use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Upper bound on completion length used by both validation round-trips.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Decoding parameters attached to a single completion request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatOptions {
    /// Greedy decoding: temperature zero, bounded output.
    #[must_use]
    pub fn deterministic(max_tokens: u32) -> Self {
        Self {
            temperature: 0.0,
            max_tokens,
        }
    }

    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.temperature.abs() < f32::EPSILON
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::deterministic(DEFAULT_MAX_TOKENS)
    }
}

/// A text-completion service reached through one request/response exchange.
pub trait LlmProvider: Send + Sync {
    /// Send role-tagged messages and return the single completion text.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails, the service rejects the request,
    /// or the response carries no completion.
    fn chat(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;
}

impl<P: LlmProvider> LlmProvider for Arc<P> {
    fn chat(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        (**self).chat(messages, options)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
