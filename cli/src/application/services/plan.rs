//! Application service: dry-run plan.
//!
//! Renders everything a provisioning run would write, without touching the host.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::artifact::{ArtifactSource, FRONTEND_DIR, InstalledArtifact};
use crate::domain::frontend::render_env_file;
use crate::domain::manifest::{PackageSet, RuntimeSpec};
use crate::domain::proxy::{RouteTable, render_nginx_site};
use crate::domain::service::{ServiceDescriptor, render_unit};
use crate::domain::{PanelConfig, Step};

/// Stands in for the public IP, which is only resolved during a real run.
pub const PUBLIC_IP_PLACEHOLDER: &str = "<public-ip>";

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub number: usize,
    pub step: Step,
    pub title: &'static str,
}

/// A file the run would write, with its exact content.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionPlan {
    pub product: String,
    pub install_dir: PathBuf,
    pub steps: Vec<PlannedStep>,
    pub packages: Vec<PackageSet>,
    pub runtimes: Vec<RuntimeSpec>,
    pub artifact: ArtifactSource,
    pub service_unit: PlannedFile,
    pub frontend_env: PlannedFile,
    pub proxy_site: PlannedFile,
    pub warnings: Vec<String>,
}

/// Build the plan for `config`.
#[must_use]
pub fn build_plan(config: &PanelConfig) -> ProvisionPlan {
    let installed = InstalledArtifact::at(&config.install_dir);
    let svc = ServiceDescriptor::for_artifact(config, &installed);

    let mut warnings = Vec::new();
    if svc.runs_as_root() {
        warnings.push(format!("service '{}' runs as root", svc.name));
    }
    if let ArtifactSource::Prebuilt { sha256: None, .. } = &config.artifact {
        warnings.push("prebuilt artifact has no sha256; integrity is not verified".to_string());
    }

    let env_content = render_env_file(&config.frontend, IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .replace(&Ipv4Addr::UNSPECIFIED.to_string(), PUBLIC_IP_PLACEHOLDER);

    ProvisionPlan {
        product: config.product.clone(),
        install_dir: config.install_dir.clone(),
        steps: Step::ALL
            .iter()
            .map(|&step| PlannedStep {
                number: step.number(),
                step,
                title: step.title(),
            })
            .collect(),
        packages: config.packages.clone(),
        runtimes: config.runtimes.clone(),
        artifact: config.artifact.clone(),
        service_unit: PlannedFile {
            path: svc.unit_path(&config.service.unit_dir),
            content: render_unit(&svc),
        },
        frontend_env: PlannedFile {
            path: config.install_dir.join(FRONTEND_DIR).join(".env"),
            content: env_content,
        },
        proxy_site: PlannedFile {
            path: config.proxy.sites_available.join(&config.service.name),
            content: render_nginx_site(&RouteTable::from_config(config)),
        },
        warnings,
    }
}
