//! Step 3: system package installation through apt-get.

use anyhow::Result;

use super::run_checked;
use crate::application::ports::{CommandRunner, CommandSpec, ProgressReporter};
use crate::domain::manifest::PackageSet;
use crate::domain::{HostEnv, ProvisionError};

/// `apt-get` with prompts disabled.
pub(crate) fn apt_get(env: &HostEnv) -> CommandSpec {
    CommandSpec::new("apt-get")
        .env("DEBIAN_FRONTEND", "noninteractive")
        .host_env(env)
}

/// Refresh the package index once, then install each set in order.
///
/// # Errors
///
/// Returns [`ProvisionError::PackageInstall`] naming the first set whose
/// install fails.
pub async fn install_packages(
    runner: &impl CommandRunner,
    sets: &[PackageSet],
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    run_checked(runner, &apt_get(env).arg("update"))
        .await
        .map_err(|e| ProvisionError::PackageInstall {
            set: "package index".to_string(),
            detail: format!("{e:#}"),
        })?;

    for set in sets {
        if set.packages.is_empty() {
            tracing::debug!(set = %set.name, "empty package set skipped");
            continue;
        }
        let cmd = apt_get(env)
            .args(["install", "-y"])
            .args(&set.packages)
            .streamed();
        run_checked(runner, &cmd)
            .await
            .map_err(|e| ProvisionError::PackageInstall {
                set: set.name.clone(),
                detail: format!("{e:#}"),
            })?;
        reporter.success(&format!("{} ({})", set.name, set.packages.join(" ")));
    }
    Ok(())
}
