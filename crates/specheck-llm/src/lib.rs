//! Language-model collaborator abstraction and the OpenAI chat-completions backend.

pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;

pub use error::LlmError;
pub use provider::{ChatOptions, LlmProvider, Message, Role};
