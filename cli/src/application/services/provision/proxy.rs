//! Step 8: nginx site installation and reload.

use anyhow::Result;

use super::run_checked;
use crate::application::ports::{CommandSpec, HostPorts, LocalFs, ProgressReporter};
use crate::domain::proxy::{API_PREFIX, RouteTable, render_nginx_site};
use crate::domain::{HostEnv, PanelConfig, ProvisionError};

/// Site name of the nginx default server.
const DEFAULT_SITE: &str = "default";

/// Install the site, validate the full nginx config and reload.
///
/// # Errors
///
/// Returns [`ProvisionError::Proxy`] on any failure.
pub async fn configure_proxy(
    ports: &impl HostPorts,
    config: &PanelConfig,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let failed = |e: anyhow::Error| ProvisionError::Proxy {
        detail: format!("{e:#}"),
    };
    let proxy = &config.proxy;
    let site = config.service.name.as_str();
    let table = RouteTable::from_config(config);

    let available = proxy.sites_available.join(site);
    let enabled = proxy.sites_enabled.join(site);
    ports
        .fs()
        .write_atomic(&available, &render_nginx_site(&table), 0o644)
        .map_err(failed)?;
    ports
        .fs()
        .symlink_replace(&available, &enabled)
        .map_err(failed)?;

    if proxy.disable_default_site {
        let default = proxy.sites_enabled.join(DEFAULT_SITE);
        if ports.fs().exists(&default) {
            ports.fs().remove_file(&default).map_err(failed)?;
            tracing::info!(path = %default.display(), "default site disabled");
        }
    }

    run_checked(ports.runner(), &CommandSpec::new("nginx").arg("-t").host_env(env))
        .await
        .map_err(failed)?;
    run_checked(
        ports.runner(),
        &CommandSpec::new("systemctl").args(["reload", "nginx"]).host_env(env),
    )
    .await
    .map_err(failed)?;

    let upstream = |path: &str| table.upstream_for(path).unwrap_or("-").to_string();
    reporter.success(&format!(
        "nginx serves {} on port {}: / -> {}, {API_PREFIX} -> {}",
        table.server_name,
        table.listen_port,
        upstream("/"),
        upstream(API_PREFIX)
    ));
    Ok(())
}
