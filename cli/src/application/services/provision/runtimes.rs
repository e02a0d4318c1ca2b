//! Step 4: language runtimes and their global npm packages.

use anyhow::{Context, Result};

use super::packages::apt_get;
use super::run_checked;
use crate::application::ports::{
    ArchiveExtractor, CommandSpec, Downloader, HostInspector, HostPorts, LocalFs, ProgressReporter,
};
use crate::domain::manifest::{RuntimeInstaller, RuntimeSpec};
use crate::domain::{HostEnv, ProvisionError};

/// Install every runtime whose executable is not already discoverable.
///
/// Returns `env` extended with each archive runtime's `bin_dir`.
///
/// # Errors
///
/// Returns [`ProvisionError::RuntimeInstall`] naming the failing runtime.
pub async fn install_runtimes(
    ports: &impl HostPorts,
    runtimes: &[RuntimeSpec],
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<HostEnv> {
    let mut env = env.clone();
    for runtime in runtimes {
        let failed = |e: anyhow::Error| ProvisionError::RuntimeInstall {
            runtime: runtime.name.clone(),
            detail: format!("{e:#}"),
        };

        // Look where the runtime installs itself too: a fresh shell's PATH
        // may not include its bin_dir yet.
        let search_env = runtime
            .bin_dir()
            .map_or_else(|| env.clone(), |dir| env.with_prepended(dir));
        if let Some(found) = ports
            .inspector()
            .find_executable(&runtime.executable, &search_env)
        {
            tracing::info!(runtime = %runtime.name, path = %found.display(), "runtime already present");
            reporter.success(&format!("{} already installed", runtime.name));
        } else {
            install_one(ports, runtime, &env).await.map_err(failed)?;
            reporter.success(&format!("{} installed", runtime.name));
        }

        if let Some(bin_dir) = runtime.bin_dir() {
            env = env.with_prepended(bin_dir);
        }
        install_globals(ports, runtime, &env, reporter)
            .await
            .map_err(failed)?;
    }
    Ok(env)
}

async fn install_one(ports: &impl HostPorts, runtime: &RuntimeSpec, env: &HostEnv) -> Result<()> {
    let staging = ports.fs().staging_dir()?;
    match &runtime.installer {
        RuntimeInstaller::Archive { url, dest, .. } => {
            let archive = staging.join(&format!("{}.tar.gz", runtime.name));
            ports.net().download(url, &archive).await?;
            ports.fs().create_dir_all(dest)?;
            ports
                .archive()
                .extract_tar_gz(&archive, dest)
                .await
                .with_context(|| format!("failed to unpack {url}"))?;
        }
        RuntimeInstaller::Script { url, packages } => {
            let script = staging.join(&format!("{}-setup.sh", runtime.name));
            ports.net().download(url, &script).await?;
            let setup = CommandSpec::new("bash")
                .arg(script.display().to_string())
                .host_env(env)
                .streamed();
            run_checked(ports.runner(), &setup).await?;
            if !packages.is_empty() {
                let install = apt_get(env)
                    .args(["install", "-y"])
                    .args(packages)
                    .streamed();
                run_checked(ports.runner(), &install).await?;
            }
        }
    }
    Ok(())
}

async fn install_globals(
    ports: &impl HostPorts,
    runtime: &RuntimeSpec,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    for package in &runtime.global_packages {
        if ports.inspector().find_executable(package, env).is_some() {
            tracing::debug!(package = %package, "global package already present");
            continue;
        }
        let cmd = CommandSpec::new("npm")
            .args(["install", "-g"])
            .arg(package.as_str())
            .host_env(env)
            .streamed();
        run_checked(ports.runner(), &cmd).await?;
        reporter.success(&format!("{package} installed"));
    }
    Ok(())
}
