//! Artifact acquisition strategies and the installed-artifact layout.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Backend executable name inside the install directory.
pub const BACKEND_BINARY: &str = "backend";

/// Frontend application directory inside the install directory.
pub const FRONTEND_DIR: &str = "frontend";

/// Environment variable consulted first for the source-control credential.
pub const DEFAULT_CREDENTIAL_ENV: &str = "MIMIPANEL_GIT_TOKEN";

/// Where the application payload comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtifactSource {
    /// Download a pre-built `.tar.gz` and unpack it into the install directory.
    Prebuilt {
        url: String,
        /// Expected SHA-256 of the archive, hex encoded.
        #[serde(default)]
        sha256: Option<String>,
    },
    /// Clone a repository with an injected credential and build it in place.
    Source {
        repository: String,
        #[serde(default)]
        branch: Option<String>,
        /// Build commands as argv lists, run inside the install directory.
        #[serde(default = "default_build")]
        build: Vec<Vec<String>>,
        #[serde(default = "default_credential_chain")]
        credential: Vec<CredentialSource>,
    },
}

impl Default for ArtifactSource {
    fn default() -> Self {
        Self::Prebuilt {
            url: "https://github.com/mimipanel/mimipanel/releases/latest/download/mimipanel-linux-amd64.tar.gz"
                .to_string(),
            sha256: None,
        }
    }
}

impl ArtifactSource {
    /// Short label used in plans and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prebuilt { .. } => "prebuilt",
            Self::Source { .. } => "source",
        }
    }
}

fn default_build() -> Vec<Vec<String>> {
    vec![
        ["go", "build", "-o", BACKEND_BINARY, "."]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    ]
}

fn default_credential_chain() -> Vec<CredentialSource> {
    vec![
        CredentialSource::Env {
            var: DEFAULT_CREDENTIAL_ENV.to_string(),
        },
        CredentialSource::Prompt,
    ]
}

/// One place a source-control credential may come from. Tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "lowercase")]
pub enum CredentialSource {
    Env { var: String },
    File { path: PathBuf },
    Prompt,
}

/// Layout of an acquired artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub install_dir: PathBuf,
    pub backend: PathBuf,
    pub frontend_dir: PathBuf,
}

impl InstalledArtifact {
    #[must_use]
    pub fn at(install_dir: &Path) -> Self {
        Self {
            install_dir: install_dir.to_path_buf(),
            backend: install_dir.join(BACKEND_BINARY),
            frontend_dir: install_dir.join(FRONTEND_DIR),
        }
    }
}

/// Environment variable the clone's credential helper reads the token from.
pub const CLONE_TOKEN_ENV: &str = "MIMIPANEL_CLONE_TOKEN";

/// Strip any userinfo from `repository` so no credential travels in the URL.
///
/// # Errors
///
/// Returns an error if `repository` is not an `https://` URL.
pub fn clone_url(repository: &str) -> anyhow::Result<String> {
    let rest = repository
        .strip_prefix("https://")
        .ok_or_else(|| anyhow::anyhow!("repository must be an https:// URL: {repository}"))?;
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let host_start = rest[..authority_end].rfind('@').map_or(0, |at| at + 1);
    Ok(format!("https://{}", &rest[host_start..]))
}

/// Git configuration, passed through the environment, that answers the
/// clone's credential request from [`CLONE_TOKEN_ENV`].
///
/// The token itself is the last pair and never appears in argv or in the
/// helper script.
#[must_use]
pub fn clone_credential_env(token: &str) -> Vec<(String, String)> {
    let helper = format!(
        "!f() {{ echo username=x-access-token; echo \"password=${CLONE_TOKEN_ENV}\"; }}; f"
    );
    [
        ("GIT_CONFIG_COUNT", "2".to_string()),
        ("GIT_CONFIG_KEY_0", "credential.helper".to_string()),
        ("GIT_CONFIG_VALUE_0", String::new()),
        ("GIT_CONFIG_KEY_1", "credential.helper".to_string()),
        ("GIT_CONFIG_VALUE_1", helper),
        (CLONE_TOKEN_ENV, token.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Replace every occurrence of `secret` in `text`.
#[must_use]
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}

/// `true` when `value` looks like a hex-encoded SHA-256 digest.
#[must_use]
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
