//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::HostEnv;
use crate::domain::artifact::CredentialSource;

// ── Value Types ───────────────────────────────────────────────────────────────

/// A fully described external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits the provisioner's when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra variables layered over the inherited environment.
    pub env: Vec<(String, String)>,
    /// Stream the child's stdout/stderr to the terminal instead of capturing.
    pub inherit_stdio: bool,
    /// Strings masked in [`CommandSpec::display`].
    pub secrets: Vec<String>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run with the search path of `host`.
    #[must_use]
    pub fn host_env(self, host: &HostEnv) -> Self {
        self.env("PATH", host.path_var())
    }

    #[must_use]
    pub fn streamed(mut self) -> Self {
        self.inherit_stdio = true;
        self
    }

    #[must_use]
    pub fn redacting(mut self, secret: &str) -> Self {
        if !secret.is_empty() {
            self.secrets.push(secret.to_string());
        }
        self
    }

    /// Shell-like rendering for logs and error messages, secrets masked.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        self.secrets
            .iter()
            .fold(line, |acc, s| crate::domain::artifact::redact(&acc, s))
    }
}

/// Private scratch directory for downloads. Removed with its contents when
/// dropped.
pub struct StagingDir {
    path: PathBuf,
    _guard: Box<dyn std::any::Any>,
}

impl StagingDir {
    /// Wrap `path`; `guard` owns the cleanup and is dropped with the value.
    #[must_use]
    pub fn new(path: PathBuf, guard: Box<dyn std::any::Any>) -> Self {
        Self {
            path,
            _guard: guard,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

// ── Process Port ──────────────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a command to completion.
    ///
    /// A non-zero exit is NOT an error here; callers inspect `status`.
    /// With `inherit_stdio`, `stdout`/`stderr` are empty unless the runner
    /// was told to capture everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or times out.
    async fn run(&self, cmd: &CommandSpec) -> Result<Output>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Read-only facts about the host.
pub trait HostInspector {
    /// Effective user id of this process.
    fn effective_uid(&self) -> u32;
    /// Contents of the platform-identification file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_os_release(&self, path: &Path) -> Result<String>;
    /// Locate `name` on the search path of `env`.
    fn find_executable(&self, name: &str, env: &HostEnv) -> Option<PathBuf>;
}

/// Filesystem mutation.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// # Errors
    /// Returns an error on I/O failure.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// # Errors
    /// Returns an error on I/O failure.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// # Errors
    /// Returns an error on I/O failure.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Replace `path` with `content` in one rename, then apply `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn write_atomic(&self, path: &Path, content: &str, mode: u32) -> Result<()>;
    /// A fresh directory only this process can write to.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn staging_dir(&self) -> Result<StagingDir>;
    /// Point `link` at `target`, replacing any existing entry in one rename.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn symlink_replace(&self, target: &Path, link: &Path) -> Result<()>;
}

/// SHA-256 of local files.
pub trait FileHasher {
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

// ── Network Ports ─────────────────────────────────────────────────────────────

/// HTTP downloads.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Stream `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success HTTP status.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
    /// Fetch a small text body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success HTTP status.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Archive unpacking.
#[allow(async_fn_in_trait)]
pub trait ArchiveExtractor {
    /// Unpack a gzip-compressed tarball into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is corrupt or contains entries that
    /// would escape `dest`.
    async fn extract_tar_gz(&self, archive: &Path, dest: &Path) -> Result<()>;
}

// ── Credential Port ───────────────────────────────────────────────────────────

/// Supplies the source-control credential without tying the flow to a terminal.
pub trait CredentialProvider {
    /// First value yielded by `sources`, in order; `None` if none yields one.
    ///
    /// # Errors
    ///
    /// Returns an error if a source exists but cannot be read.
    fn credential(&self, sources: &[CredentialSource]) -> Result<Option<String>>;
}

// ── Locking Port ──────────────────────────────────────────────────────────────

/// Exclusive per-host run lock.
pub trait RunLock {
    /// Take the lock at `path` without blocking. The lock is released when the
    /// returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Locked` if another run holds it.
    fn try_lock(&self, path: &Path) -> Result<Box<dyn std::any::Any>>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Composite ─────────────────────────────────────────────────────────────────

/// Everything the provisioning use-case touches on the host.
pub trait HostPorts {
    type Runner: CommandRunner;
    type Inspector: HostInspector;
    type Fs: LocalFs + FileHasher;
    type Net: Downloader;
    type Archive: ArchiveExtractor;
    type Credentials: CredentialProvider;
    type Lock: RunLock;

    fn runner(&self) -> &Self::Runner;
    fn inspector(&self) -> &Self::Inspector;
    fn fs(&self) -> &Self::Fs;
    fn net(&self) -> &Self::Net;
    fn archive(&self) -> &Self::Archive;
    fn credentials(&self) -> &Self::Credentials;
    fn lock(&self) -> &Self::Lock;
}
