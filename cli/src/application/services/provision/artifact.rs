//! Step 5: artifact acquisition, from a prebuilt archive or a source checkout.

use std::path::Path;

use anyhow::Result;

use super::run_checked;
use crate::application::ports::{
    ArchiveExtractor, CommandSpec, CredentialProvider, Downloader, FileHasher, HostPorts, LocalFs,
    ProgressReporter,
};
use crate::domain::artifact::{
    ArtifactSource, CredentialSource, InstalledArtifact, clone_credential_env, clone_url,
    redact,
};
use crate::domain::{HostEnv, PanelConfig, ProvisionError};

/// Place the application under `install_dir` using the configured strategy.
///
/// Both strategies replace `install_dir` wholesale and then require the
/// backend executable to exist inside it.
///
/// # Errors
///
/// Returns a [`ProvisionError`] acquisition variant on any failure.
pub async fn acquire(
    ports: &impl HostPorts,
    config: &PanelConfig,
    env: &HostEnv,
    reporter: &impl ProgressReporter,
) -> Result<InstalledArtifact> {
    let installed = InstalledArtifact::at(&config.install_dir);
    tracing::info!(strategy = config.artifact.label(), dir = %installed.install_dir.display(), "acquiring artifact");

    match &config.artifact {
        ArtifactSource::Prebuilt { url, sha256 } => {
            fetch_prebuilt(ports, url, sha256.as_deref(), &installed.install_dir).await?;
        }
        ArtifactSource::Source {
            repository,
            branch,
            build,
            credential,
        } => {
            let source = Checkout {
                repository,
                branch: branch.as_deref(),
                build,
                credential,
            };
            build_from_source(ports, &source, &installed.install_dir, env).await?;
        }
    }

    if !ports.fs().exists(&installed.backend) {
        return Err(acquisition(format!(
            "backend executable {} not found after acquisition",
            installed.backend.display()
        ))
        .into());
    }
    reporter.success(&format!(
        "{} artifact installed in {}",
        config.artifact.label(),
        installed.install_dir.display()
    ));
    Ok(installed)
}

fn acquisition(detail: String) -> ProvisionError {
    ProvisionError::Acquisition { detail }
}

/// Remove `dir` if present and recreate it empty.
fn reset_dir(fs: &impl LocalFs, dir: &Path) -> Result<()> {
    if fs.exists(dir) {
        fs.remove_dir_all(dir)?;
    }
    fs.create_dir_all(dir)
}

async fn fetch_prebuilt(
    ports: &impl HostPorts,
    url: &str,
    sha256: Option<&str>,
    install_dir: &Path,
) -> Result<()> {
    // Removed on every return path when `staging` drops.
    let staging = ports
        .fs()
        .staging_dir()
        .map_err(|e| acquisition(format!("{e:#}")))?;
    let archive = staging.join("artifact.tar.gz");
    ports
        .net()
        .download(url, &archive)
        .await
        .map_err(|e| acquisition(format!("download of {url} failed: {e:#}")))?;

    if let Some(expected) = sha256 {
        let actual = ports
            .fs()
            .sha256_file(&archive)
            .map_err(|e| acquisition(format!("{e:#}")))?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ProvisionError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            }
            .into());
        }
    }

    reset_dir(ports.fs(), install_dir).map_err(|e| acquisition(format!("{e:#}")))?;
    ports
        .archive()
        .extract_tar_gz(&archive, install_dir)
        .await
        .map_err(|e| acquisition(format!("{e:#}")))?;
    Ok(())
}

struct Checkout<'a> {
    repository: &'a str,
    branch: Option<&'a str>,
    build: &'a [Vec<String>],
    credential: &'a [CredentialSource],
}

async fn build_from_source(
    ports: &impl HostPorts,
    source: &Checkout<'_>,
    install_dir: &Path,
    env: &HostEnv,
) -> Result<()> {
    // Credential first: nothing touches the host or the network without it.
    let token = ports
        .credentials()
        .credential(source.credential)
        .map_err(|e| acquisition(format!("{e:#}")))?
        .ok_or(ProvisionError::MissingCredential)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(ProvisionError::EmptyCredential.into());
    }
    let failed = |e: anyhow::Error| acquisition(redact(&format!("{e:#}"), token));

    let url = clone_url(source.repository).map_err(failed)?;
    if ports.fs().exists(install_dir) {
        ports.fs().remove_dir_all(install_dir).map_err(failed)?;
    }
    if let Some(parent) = install_dir.parent() {
        ports.fs().create_dir_all(parent).map_err(failed)?;
    }

    let mut clone = CommandSpec::new("git").args(["clone", "--depth", "1"]);
    if let Some(branch) = source.branch {
        clone = clone.args(["--branch", branch]);
    }
    let mut clone = clone
        .arg(url.as_str())
        .arg(install_dir.display().to_string())
        .env("GIT_TERMINAL_PROMPT", "0")
        .host_env(env)
        .redacting(token);
    for (key, value) in clone_credential_env(token) {
        clone = clone.env(key, value);
    }
    run_checked(ports.runner(), &clone).await.map_err(failed)?;

    let reset_remote = CommandSpec::new("git")
        .arg("-C")
        .arg(install_dir.display().to_string())
        .args(["remote", "set-url", "origin", url.as_str()])
        .host_env(env);
    run_checked(ports.runner(), &reset_remote)
        .await
        .map_err(failed)?;

    for argv in source.build {
        let Some((program, args)) = argv.split_first() else {
            continue;
        };
        let cmd = CommandSpec::new(program.as_str())
            .args(args)
            .cwd(install_dir)
            .host_env(env)
            .redacting(token)
            .streamed();
        run_checked(ports.runner(), &cmd).await.map_err(failed)?;
    }
    Ok(())
}
