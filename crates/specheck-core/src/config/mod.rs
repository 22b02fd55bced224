mod env;
mod types;


pub use types::*;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::collaborator::RequestSettings;
use crate::error::ValidationError;
use crate::template::EvaluationTemplate;
use crate::vault::{DotenvVaultProvider, EnvVaultProvider, VaultProvider};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings that would make every run fail later.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.llm.model.trim().is_empty() {
            return Err(ValidationError::configuration("llm.model must not be empty"));
        }
        if self.llm.max_tokens == 0 {
            return Err(ValidationError::configuration(
                "llm.max_tokens must be greater than 0",
            ));
        }
        if self.timeouts.llm_seconds == 0 {
            return Err(ValidationError::configuration(
                "timeouts.llm_seconds must be greater than 0",
            ));
        }
        if self.vault.api_key_name.trim().is_empty() {
            return Err(ValidationError::configuration(
                "vault.api_key_name must not be empty",
            ));
        }
        self.evaluation_template().map(|_| ())
    }

    /// Build the evaluation template selected by `[evaluation]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] if `custom` is selected but
    /// missing or malformed.
    pub fn evaluation_template(&self) -> Result<EvaluationTemplate, ValidationError> {
        match self.evaluation.template {
            TemplateKind::Detailed => Ok(EvaluationTemplate::detailed()),
            TemplateKind::Concise => Ok(EvaluationTemplate::concise()),
            TemplateKind::Custom => {
                let custom = self.evaluation.custom.as_ref().ok_or_else(|| {
                    ValidationError::configuration(
                        "evaluation.custom section required for custom template",
                    )
                })?;
                EvaluationTemplate::custom(
                    custom.system_prompt.clone(),
                    custom.body.clone(),
                    custom.summary_header.clone(),
                )
            }
        }
    }

    #[must_use]
    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings::new(
            self.llm.max_tokens,
            Duration::from_secs(self.timeouts.llm_seconds),
        )
    }

    #[must_use]
    pub fn vault_provider(&self) -> Box<dyn VaultProvider> {
        match self.vault.backend {
            VaultBackend::Env => Box::new(EnvVaultProvider),
            VaultBackend::Dotenv => Box::new(DotenvVaultProvider::new(&self.vault.dotenv_path)),
        }
    }
}
