use serde::{Deserialize, Serialize};

use crate::template::SUMMARY_HEADER;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub vault: VaultConfig,
}

fn default_base_url() -> String {
    specheck_llm::openai::DEFAULT_BASE_URL.into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_max_tokens() -> u32 {
    specheck_llm::provider::DEFAULT_MAX_TOKENS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_llm_timeout")]
    pub llm_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_seconds: default_llm_timeout(),
            connect_seconds: default_connect_timeout(),
        }
    }
}

fn default_max_file_size() -> u64 {
    specheck_document::DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

/// Built-in evaluation template selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Clause-referenced template with per-component breakdown.
    #[default]
    Detailed,
    Concise,
    Custom,
}

impl TemplateKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Concise => "concise",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub template: TemplateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomTemplateConfig>,
}

fn default_summary_header() -> String {
    SUMMARY_HEADER.into()
}

/// User-supplied evaluation prompt.
///
/// `body` must contain the `{document}` and `{requirements}` placeholders and
/// the `summary_header` literal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomTemplateConfig {
    pub system_prompt: String,
    pub body: String,
    #[serde(default = "default_summary_header")]
    pub summary_header: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    Env,
    #[default]
    Dotenv,
}

fn default_dotenv_path() -> String {
    ".env.txt".into()
}

fn default_api_key_name() -> String {
    "OPENAI_API_KEY".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub backend: VaultBackend,
    #[serde(default = "default_dotenv_path")]
    pub dotenv_path: String,
    #[serde(default = "default_api_key_name")]
    pub api_key_name: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            backend: VaultBackend::default(),
            dotenv_path: default_dotenv_path(),
            api_key_name: default_api_key_name(),
        }
    }
}
