//! Service descriptor and systemd unit rendering.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::artifact::InstalledArtifact;
use crate::domain::config::PanelConfig;

/// Restart policy written into every generated unit.
pub const RESTART_POLICY: &str = "always";

/// How the service manager should run the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub description: String,
    pub exec_path: PathBuf,
    pub working_dir: PathBuf,
    pub user: String,
    pub environment: BTreeMap<String, String>,
}

impl ServiceDescriptor {
    /// Describe the backend of `artifact` using the service section of `config`.
    ///
    /// `PORT` is set to the backend port unless the config already sets it.
    #[must_use]
    pub fn for_artifact(config: &PanelConfig, artifact: &InstalledArtifact) -> Self {
        let mut environment = config.service.environment.clone();
        environment
            .entry("PORT".to_string())
            .or_insert_with(|| config.backend.port.to_string());
        Self {
            name: config.service.name.clone(),
            description: format!("{} backend", config.product),
            exec_path: artifact.backend.clone(),
            working_dir: artifact.install_dir.clone(),
            user: config.service.user.clone(),
            environment,
        }
    }

    /// `true` when the unit runs as the most-privileged account.
    #[must_use]
    pub fn runs_as_root(&self) -> bool {
        self.user == "root"
    }

    /// Path of the unit file under `unit_dir`.
    #[must_use]
    pub fn unit_path(&self, unit_dir: &Path) -> PathBuf {
        unit_dir.join(format!("{}.service", self.name))
    }
}

/// Render the systemd unit for `svc`. Output is deterministic.
#[must_use]
pub fn render_unit(svc: &ServiceDescriptor) -> String {
    let mut out = String::new();
    out.push_str("# Generated by mimipanel - DO NOT EDIT\n");
    out.push_str("[Unit]\n");
    out.push_str(&format!("Description={}\n", svc.description));
    out.push_str("After=network-online.target mariadb.service redis-server.service\n");
    out.push_str("Wants=network-online.target\n");
    out.push('\n');
    out.push_str("[Service]\n");
    out.push_str("Type=simple\n");
    out.push_str(&format!("User={}\n", svc.user));
    out.push_str(&format!("WorkingDirectory={}\n", svc.working_dir.display()));
    for (k, v) in &svc.environment {
        out.push_str(&format!("Environment=\"{k}={v}\"\n"));
    }
    out.push_str(&format!("ExecStart={}\n", svc.exec_path.display()));
    out.push_str(&format!("Restart={RESTART_POLICY}\n"));
    out.push_str("RestartSec=5\n");
    out.push('\n');
    out.push_str("[Install]\n");
    out.push_str("WantedBy=multi-user.target\n");
    out
}
