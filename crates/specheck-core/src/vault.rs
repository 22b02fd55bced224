use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::error::ValidationError;

/// Wrapper for sensitive strings with redacted Debug/Display.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + 'a>>;

/// Pluggable secret retrieval backend.
pub trait VaultProvider: Send + Sync {
    fn get_secret(&self, key: &str) -> SecretFuture<'_>;
}

/// Reads secrets from process environment variables.
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let key = key.to_owned();
        Box::pin(async move { Ok(std::env::var(&key).ok()) })
    }
}

/// Reads secrets from a `KEY=value` file, with process environment taking precedence.
///
/// A missing file is not an error: lookups fall through to the environment only.
/// The file is parsed on each lookup and never merged into the process environment.
#[derive(Debug, Clone)]
pub struct DotenvVaultProvider {
    path: PathBuf,
}

impl DotenvVaultProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file_entry(&self, key: &str) -> anyhow::Result<Option<String>> {
        let iter = match dotenvy::from_path_iter(&self.path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %self.path.display(), "secrets file not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read secrets file {}: {e}",
                    self.path.display()
                ));
            }
        };
        for item in iter {
            let (name, value) = item.map_err(|e| {
                anyhow::anyhow!("failed to parse secrets file {}: {e}", self.path.display())
            })?;
            if name == key {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl VaultProvider for DotenvVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let key = key.to_owned();
        Box::pin(async move {
            if let Ok(val) = std::env::var(&key) {
                return Ok(Some(val));
            }
            self.read_file_entry(&key)
        })
    }
}

/// Look up the collaborator credential once for a run.
///
/// # Errors
///
/// Returns [`ValidationError::Configuration`] if the backend fails or the key is
/// absent or blank.
pub async fn resolve_credential(
    vault: &dyn VaultProvider,
    key: &str,
) -> Result<Secret, ValidationError> {
    let value = vault
        .get_secret(key)
        .await
        .map_err(|e| ValidationError::configuration(format!("{e:#}")))?;
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Secret::new(v.trim())),
        _ => Err(ValidationError::configuration(format!(
            "API key is missing; set {key} in the environment or the secrets file"
        ))),
    }
}

/// HashMap-based secret storage for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
pub struct MockVaultProvider {
    secrets: std::collections::HashMap<String, String>,
}

#[cfg(any(test, feature = "mock"))]
impl MockVaultProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_owned(), value.to_owned());
        self
    }
}

#[cfg(any(test, feature = "mock"))]
impl VaultProvider for MockVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let result = self.secrets.get(key).cloned();
        Box::pin(async move { Ok(result) })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn secret_debug_and_display_are_redacted() {
        let secret = Secret::new("sk-live");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live");
    }

    #[tokio::test]
    async fn env_vault_returns_none_for_unset() {
        let result = EnvVaultProvider
            .get_secret("SPECHECK_TEST_VAULT_NONEXISTENT_KEY_12345")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn dotenv_vault_reads_file_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "OTHER=1").unwrap();
        writeln!(f, "SPECHECK_TEST_DOTENV_KEY_A=sk-from-file").unwrap();

        let vault = DotenvVaultProvider::new(&path);
        let result = vault.get_secret("SPECHECK_TEST_DOTENV_KEY_A").await.unwrap();
        assert_eq!(result.as_deref(), Some("sk-from-file"));
    }

    #[tokio::test]
    async fn dotenv_vault_missing_file_is_none() {
        let vault = DotenvVaultProvider::new("/nonexistent/.env.txt");
        let result = vault.get_secret("SPECHECK_TEST_DOTENV_KEY_B").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn dotenv_vault_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.txt");
        std::fs::write(&path, "UNRELATED=value\n").unwrap();

        let vault = DotenvVaultProvider::new(&path);
        let result = vault.get_secret("SPECHECK_TEST_DOTENV_KEY_C").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn resolve_credential_returns_trimmed_secret() {
        let vault = MockVaultProvider::new().with_secret("API_KEY", "  sk-123 \n");
        let secret = resolve_credential(&vault, "API_KEY").await.unwrap();
        assert_eq!(secret.expose(), "sk-123");
    }

    #[tokio::test]
    async fn resolve_credential_missing_is_configuration_error() {
        let vault = MockVaultProvider::new();
        let err = resolve_credential(&vault, "API_KEY").await.unwrap_err();
        assert!(matches!(err, ValidationError::Configuration(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[tokio::test]
    async fn resolve_credential_blank_is_configuration_error() {
        let vault = MockVaultProvider::new().with_secret("API_KEY", "   ");
        let err = resolve_credential(&vault, "API_KEY").await.unwrap_err();
        assert!(matches!(err, ValidationError::Configuration(_)));
    }
}
