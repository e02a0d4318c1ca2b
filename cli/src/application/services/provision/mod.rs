//! Application service: host provisioning use-case.
//!
//! Runs the eight steps in fixed order and stops at the first failure.
//! Nothing is rolled back: re-running from scratch is the recovery path.
//! All I/O is routed through the injected [`HostPorts`].

pub mod artifact;
pub mod frontend;
pub mod packages;
pub mod preflight;
pub mod proxy;
pub mod runtimes;
pub mod service;

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, CommandSpec, HostPorts, ProgressReporter};
use crate::domain::{HostEnv, PanelConfig, ProvisionReport, Step};

/// Provision the host described by `config`.
///
/// `env` is the search path the provisioner was started with; runtime
/// installation extends a copy of it for the later steps.
pub async fn provision(
    ports: &impl HostPorts,
    config: &PanelConfig,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> ProvisionReport {
    match run_steps(ports, config, env, reporter).await {
        Ok(()) => {
            tracing::info!("provisioning complete");
            ProvisionReport::completed()
        }
        Err((step, err)) => {
            tracing::error!(step = %step, error = %format!("{err:#}"), "provisioning aborted");
            ProvisionReport::failed(step, &err)
        }
    }
}

fn at(step: Step) -> impl FnOnce(anyhow::Error) -> (Step, anyhow::Error) {
    move |e| (step, e)
}

fn begin(reporter: &impl ProgressReporter, step: Step) {
    tracing::info!(step = %step, "starting step");
    reporter.step(&format!("[{}/{}] {}", step.number(), Step::ALL.len(), step.title()));
}

async fn run_steps(
    ports: &impl HostPorts,
    config: &PanelConfig,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<(), (Step, anyhow::Error)> {
    begin(reporter, Step::PrivilegeCheck);
    preflight::check_privilege(ports.inspector()).map_err(at(Step::PrivilegeCheck))?;
    let _guard = preflight::lock_host(ports, config).map_err(at(Step::PrivilegeCheck))?;

    begin(reporter, Step::OsDetection);
    let platform = preflight::detect_platform(ports.inspector(), &config.platform)
        .map_err(at(Step::OsDetection))?;
    reporter.success(&format!("detected {}", platform.display_name()));

    begin(reporter, Step::Dependencies);
    packages::install_packages(ports.runner(), &config.packages, env, reporter)
        .await
        .map_err(at(Step::Dependencies))?;

    begin(reporter, Step::Runtimes);
    let env = runtimes::install_runtimes(ports, &config.runtimes, env, reporter)
        .await
        .map_err(at(Step::Runtimes))?;

    begin(reporter, Step::Artifact);
    let installed = artifact::acquire(ports, config, &env, reporter)
        .await
        .map_err(at(Step::Artifact))?;

    begin(reporter, Step::Service);
    service::register_service(ports, config, &installed, &env, reporter)
        .await
        .map_err(at(Step::Service))?;

    begin(reporter, Step::Frontend);
    frontend::bring_up(ports, config, &installed, &env, reporter)
        .await
        .map_err(at(Step::Frontend))?;

    begin(reporter, Step::Proxy);
    proxy::configure_proxy(ports, config, &env, reporter)
        .await
        .map_err(at(Step::Proxy))?;

    Ok(())
}

/// Run `cmd` and fail unless it exits 0.
///
/// The error carries the command line and, when captured, the trimmed stderr.
pub(crate) async fn run_checked(runner: &impl CommandRunner, cmd: &CommandSpec) -> Result<Output> {
    let shown = cmd.display();
    tracing::debug!(command = %shown, "running");
    let output = runner
        .run(cmd)
        .await
        .with_context(|| format!("failed to run {shown}"))?;
    if !output.status.success() {
        anyhow::bail!("{shown} exited with {}{}", exit_label(&output), stderr_tail(&output, cmd));
    }
    Ok(output)
}

fn exit_label(output: &Output) -> String {
    output
        .status
        .code()
        .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"))
}

fn stderr_tail(output: &Output, cmd: &CommandSpec) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return String::new();
    }
    let masked = cmd
        .secrets
        .iter()
        .fold(stderr.to_string(), |acc, s| crate::domain::artifact::redact(&acc, s));
    format!(": {masked}")
}
