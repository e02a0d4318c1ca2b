//! Explicit host environment threaded between provisioning steps.

use std::path::{Path, PathBuf};

/// Search path used when the process has no `PATH`.
pub const FALLBACK_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Executable search path seen by spawned commands.
///
/// Runtime installation returns an extended copy instead of mutating the
/// provisioner's own environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    path: Vec<PathBuf>,
}

impl HostEnv {
    /// Parse a colon-separated `PATH` value; `None` uses [`FALLBACK_PATH`].
    #[must_use]
    pub fn from_path_var(path: Option<&str>) -> Self {
        let raw = path.filter(|p| !p.is_empty()).unwrap_or(FALLBACK_PATH);
        Self {
            path: raw
                .split(':')
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
        }
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.path
    }

    /// Copy with `dir` moved to the front of the search path.
    #[must_use]
    pub fn with_prepended(&self, dir: &Path) -> Self {
        let mut path = vec![dir.to_path_buf()];
        path.extend(self.path.iter().filter(|p| p.as_path() != dir).cloned());
        Self { path }
    }

    /// Value for the `PATH` variable of child processes.
    #[must_use]
    pub fn path_var(&self) -> String {
        self.path
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl Default for HostEnv {
    fn default() -> Self {
        Self::from_path_var(None)
    }
}
