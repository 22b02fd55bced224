use super::{Config, TemplateKind, VaultBackend};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SPECHECK_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("SPECHECK_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("SPECHECK_LLM_MAX_TOKENS") {
            match v.parse::<u32>() {
                Ok(n) => self.llm.max_tokens = n,
                Err(_) => tracing::warn!("ignoring invalid SPECHECK_LLM_MAX_TOKENS value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("SPECHECK_TIMEOUT_LLM") {
            match v.parse::<u64>() {
                Ok(secs) => self.timeouts.llm_seconds = secs,
                Err(_) => tracing::warn!("ignoring invalid SPECHECK_TIMEOUT_LLM value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("SPECHECK_EVALUATION_TEMPLATE") {
            if let Ok(kind) = serde_json::from_value::<TemplateKind>(serde_json::Value::String(
                v.to_ascii_lowercase(),
            )) {
                self.evaluation.template = kind;
            } else {
                tracing::warn!("ignoring invalid SPECHECK_EVALUATION_TEMPLATE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SPECHECK_VAULT_BACKEND") {
            if let Ok(backend) = serde_json::from_value::<VaultBackend>(serde_json::Value::String(
                v.to_ascii_lowercase(),
            )) {
                self.vault.backend = backend;
            } else {
                tracing::warn!("ignoring invalid SPECHECK_VAULT_BACKEND value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SPECHECK_VAULT_DOTENV_PATH") {
            self.vault.dotenv_path = v;
        }
    }
}
