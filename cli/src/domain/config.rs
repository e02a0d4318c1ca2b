//! Domain types and validators for Mimipanel configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::artifact::{ArtifactSource, is_sha256_hex};
use crate::domain::error::ConfigError;
use crate::domain::manifest::{PackageSet, RuntimeSpec, default_packages, default_runtimes};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mimipanel/config.yaml";

/// Names interpolated into unit files, site files and pm2 process names.
pub static UNIT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.@-]*$").expect("valid regex")
});

/// Keys of `service.environment`.
pub static ENV_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex")
});

/// One or more space-separated nginx server names (`_` and wildcards included).
pub static SERVER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_.*-]+( [A-Za-z0-9_.*-]+)*$").expect("valid regex")
});

/// Characters that would end or escape a quoted `Environment=` assignment.
fn unsafe_env_value(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_control() || matches!(c, '"' | '\\' | '%'))
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration, read from `/etc/mimipanel/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Product name shown in the unit description.
    pub product: String,
    /// Where the artifact is installed. Cleared on every acquisition.
    pub install_dir: PathBuf,
    pub platform: PlatformConfig,
    /// Package sets, installed in order.
    pub packages: Vec<PackageSet>,
    pub runtimes: Vec<RuntimeSpec>,
    pub artifact: ArtifactSource,
    pub service: ServiceConfig,
    pub frontend: FrontendConfig,
    pub backend: BackendConfig,
    pub proxy: ProxyConfig,
    pub network: NetworkConfig,
    /// Lock file guarding against concurrent runs.
    pub lock_path: PathBuf,
    /// Per-command timeout. Unset means commands may run indefinitely.
    pub command_timeout_secs: Option<u64>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            product: "Mimipanel".to_string(),
            install_dir: PathBuf::from("/opt/mimipanel"),
            platform: PlatformConfig::default(),
            packages: default_packages(),
            runtimes: default_runtimes(),
            artifact: ArtifactSource::default(),
            service: ServiceConfig::default(),
            frontend: FrontendConfig::default(),
            backend: BackendConfig::default(),
            proxy: ProxyConfig::default(),
            network: NetworkConfig::default(),
            lock_path: PathBuf::from("/run/mimipanel.lock"),
            command_timeout_secs: None,
        }
    }
}

/// Platform allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub os_release_path: PathBuf,
    pub allowed_ids: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            os_release_path: PathBuf::from("/etc/os-release"),
            allowed_ids: vec!["ubuntu".to_string()],
        }
    }
}

/// Backend service unit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// Account the backend runs as. `root` works but triggers a warning.
    pub user: String,
    pub unit_dir: PathBuf,
    pub environment: BTreeMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "mimipanel".to_string(),
            user: "root".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            environment: BTreeMap::new(),
        }
    }
}

/// Frontend process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub port: u16,
    /// pm2 process name; any previous process with this name is replaced.
    pub process_name: String,
    /// Variable in the frontend `.env` that carries the public API URL.
    pub api_url_var: String,
    /// `npm run <script>` executed after `npm install`, if set.
    pub build_script: Option<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            process_name: "mimipanel-frontend".to_string(),
            api_url_var: "NEXT_PUBLIC_API_URL".to_string(),
            build_script: Some("build".to_string()),
        }
    }
}

/// Backend listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub port: u16,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// nginx site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub server_name: String,
    pub listen_port: u16,
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
    /// Remove the distribution's `default` site so ours answers on port 80.
    pub disable_default_site: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            server_name: "_".to_string(),
            listen_port: 80,
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            disable_default_site: true,
        }
    }
}

/// External lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Returns the caller's public address as plain text.
    pub public_ip_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            public_ip_url: "https://api.ipify.org".to_string(),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

impl PanelConfig {
    /// Check every field that later steps interpolate into commands or files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing all violations.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if !self.install_dir.is_absolute() {
            errors.push(format!(
                "install_dir '{}' must be an absolute path",
                self.install_dir.display()
            ));
        }
        if self.install_dir.parent().is_none() {
            errors.push("install_dir must not be the filesystem root".to_string());
        }
        if !UNIT_NAME_RE.is_match(&self.service.name) {
            errors.push(format!("service.name '{}' is not a valid unit name", self.service.name));
        }
        if !UNIT_NAME_RE.is_match(&self.frontend.process_name) {
            errors.push(format!(
                "frontend.process_name '{}' is not a valid process name",
                self.frontend.process_name
            ));
        }
        for (key, value) in &self.service.environment {
            if !ENV_KEY_RE.is_match(key) {
                errors.push(format!("service.environment key '{key}' is not a variable name"));
            }
            if unsafe_env_value(value) {
                errors.push(format!(
                    "service.environment.{key} must not contain control characters, quotes, backslashes or '%'"
                ));
            }
        }
        if !SERVER_NAME_RE.is_match(&self.proxy.server_name) {
            errors.push(format!(
                "proxy.server_name '{}' must be host names separated by single spaces",
                self.proxy.server_name.escape_debug()
            ));
        }
        if self.service.user.trim().is_empty() {
            errors.push("service.user must not be empty".to_string());
        }
        if self.frontend.port == 0 || self.backend.port == 0 {
            errors.push("frontend.port and backend.port must be non-zero".to_string());
        }
        if self.frontend.port == self.backend.port {
            errors.push(format!(
                "frontend.port and backend.port must differ (both {})",
                self.frontend.port
            ));
        }
        if self.platform.allowed_ids.is_empty() {
            errors.push("platform.allowed_ids must list at least one distribution".to_string());
        }
        for set in &self.packages {
            if set.packages.is_empty() {
                errors.push(format!("package set '{}' is empty", set.name));
            }
        }
        self.validate_artifact(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { errors }.into())
        }
    }

    fn validate_artifact(&self, errors: &mut Vec<String>) {
        match &self.artifact {
            ArtifactSource::Prebuilt { url, sha256 } => {
                if !url.starts_with("https://") {
                    errors.push(format!("artifact.url '{url}' must use https://"));
                }
                if let Some(sum) = sha256
                    && !is_sha256_hex(sum)
                {
                    errors.push("artifact.sha256 must be 64 hex characters".to_string());
                }
            }
            ArtifactSource::Source {
                repository, build, ..
            } => {
                if !repository.starts_with("https://") {
                    errors.push(format!("artifact.repository '{repository}' must use https://"));
                }
                if build.is_empty() || build.iter().any(Vec::is_empty) {
                    errors.push("artifact.build must list non-empty commands".to_string());
                }
            }
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
