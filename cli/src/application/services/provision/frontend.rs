//! Step 7: frontend environment, build and pm2 process.

use std::net::IpAddr;

use anyhow::{Context, Result};

use super::run_checked;
use crate::application::ports::{
    CommandRunner, CommandSpec, Downloader, HostPorts, LocalFs, ProgressReporter,
};
use crate::domain::artifact::InstalledArtifact;
use crate::domain::frontend::render_env_file;
use crate::domain::{HostEnv, PanelConfig, ProvisionError};

/// Trimmed response body of the public-IP service, as an address.
///
/// # Errors
///
/// Returns an error if the body is not an IP address.
pub fn parse_public_ip(body: &str) -> Result<IpAddr> {
    let body = body.trim();
    body.parse()
        .with_context(|| format!("public IP service returned '{body}', not an address"))
}

/// Bring the frontend up under pm2.
///
/// # Errors
///
/// Returns [`ProvisionError::Frontend`] on any failure except deleting a
/// previous pm2 process, which may not exist.
pub async fn bring_up(
    ports: &impl HostPorts,
    config: &PanelConfig,
    installed: &InstalledArtifact,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let failed = |e: anyhow::Error| ProvisionError::Frontend {
        detail: format!("{e:#}"),
    };
    let frontend = &config.frontend;
    let dir = &installed.frontend_dir;
    if !ports.fs().exists(dir) {
        return Err(failed(anyhow::anyhow!("{} does not exist", dir.display())).into());
    }

    let url = &config.network.public_ip_url;
    let body = ports
        .net()
        .fetch_text(url)
        .await
        .with_context(|| format!("failed to resolve public IP from {url}"))
        .map_err(failed)?;
    let ip = parse_public_ip(&body).map_err(failed)?;
    tracing::info!(ip = %ip, "public IP resolved");

    let env_file = dir.join(".env");
    ports
        .fs()
        .write_atomic(&env_file, &render_env_file(frontend, ip), 0o644)
        .map_err(failed)?;

    let npm = |args: &[&str]| CommandSpec::new("npm").args(args).cwd(dir).host_env(env);
    run_checked(ports.runner(), &npm(&["install"]).streamed())
        .await
        .map_err(failed)?;
    if let Some(script) = &frontend.build_script {
        run_checked(ports.runner(), &npm(&["run", script.as_str()]).streamed())
            .await
            .map_err(failed)?;
    }

    let name = frontend.process_name.as_str();
    let pm2 = |args: &[&str]| CommandSpec::new("pm2").args(args).cwd(dir).host_env(env);
    match ports.runner().run(&pm2(&["delete", name])).await {
        Ok(out) if out.status.success() => tracing::debug!(process = name, "previous pm2 process removed"),
        Ok(_) => tracing::debug!(process = name, "no previous pm2 process"),
        Err(e) => tracing::debug!(process = name, error = %e, "pm2 delete failed"),
    }
    run_checked(ports.runner(), &pm2(&["start", "npm", "--name", name, "--", "start"]))
        .await
        .map_err(failed)?;
    run_checked(ports.runner(), &pm2(&["save"]))
        .await
        .map_err(failed)?;

    reporter.success(&format!("{name} started on port {}", frontend.port));
    Ok(())
}
