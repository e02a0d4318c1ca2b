//! Source-control credential chain: environment, file, terminal prompt.

use anyhow::{Context, Result};

use crate::application::ports::CredentialProvider;
use crate::domain::artifact::CredentialSource;

/// Production `CredentialProvider`. The prompt is skipped when `non_interactive`.
pub struct ChainCredentialProvider {
    non_interactive: bool,
}

impl ChainCredentialProvider {
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }

    fn from_source(&self, source: &CredentialSource) -> Result<Option<String>> {
        match source {
            CredentialSource::Env { var } => Ok(std::env::var(var).ok()),
            CredentialSource::File { path } => {
                if !path.exists() {
                    return Ok(None);
                }
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading credential file {}", path.display()))?;
                Ok(Some(raw.trim_end_matches(['\r', '\n']).to_string()))
            }
            CredentialSource::Prompt => {
                if self.non_interactive {
                    tracing::debug!("credential prompt skipped (non-interactive)");
                    return Ok(None);
                }
                let token = dialoguer::Password::new()
                    .with_prompt("Git access token")
                    .allow_empty_password(true)
                    .interact()
                    .context("reading credential from terminal")?;
                Ok(Some(token))
            }
        }
    }
}

impl CredentialProvider for ChainCredentialProvider {
    fn credential(&self, sources: &[CredentialSource]) -> Result<Option<String>> {
        for source in sources {
            if let Some(value) = self.from_source(source)? {
                tracing::debug!(source = ?source, "credential obtained");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
