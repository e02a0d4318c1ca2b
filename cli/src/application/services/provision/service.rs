//! Step 6: systemd unit registration.

use anyhow::Result;

use super::run_checked;
use crate::application::ports::{CommandSpec, HostPorts, LocalFs, ProgressReporter};
use crate::domain::artifact::InstalledArtifact;
use crate::domain::service::{ServiceDescriptor, render_unit};
use crate::domain::{HostEnv, PanelConfig, ProvisionError};

/// Write the unit, then enable, restart and verify the service.
///
/// # Errors
///
/// Returns [`ProvisionError::ServiceStart`] on any failure.
pub async fn register_service(
    ports: &impl HostPorts,
    config: &PanelConfig,
    installed: &InstalledArtifact,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let svc = ServiceDescriptor::for_artifact(config, installed);
    let failed = |e: anyhow::Error| ProvisionError::ServiceStart {
        service: svc.name.clone(),
        detail: format!("{e:#}"),
    };

    if svc.runs_as_root() {
        tracing::warn!(service = %svc.name, "backend service runs as root");
        reporter.warn(&format!(
            "{} runs as root; set service.user to an unprivileged account",
            svc.name
        ));
    }

    let unit_path = svc.unit_path(&config.service.unit_dir);
    ports
        .fs()
        .write_atomic(&unit_path, &render_unit(&svc), 0o644)
        .map_err(failed)?;
    tracing::info!(path = %unit_path.display(), "unit written");

    let name = svc.name.as_str();
    let calls: [&[&str]; 3] = [&["daemon-reload"], &["enable", name], &["restart", name]];
    for args in calls {
        let cmd = CommandSpec::new("systemctl").args(args).host_env(env);
        run_checked(ports.runner(), &cmd).await.map_err(failed)?;
    }

    let check = CommandSpec::new("systemctl")
        .args(["is-active", "--quiet", name])
        .host_env(env);
    run_checked(ports.runner(), &check)
        .await
        .map_err(|_| failed(anyhow::anyhow!("not active after restart")))?;

    reporter.success(&format!("{name} is active"));
    Ok(())
}
