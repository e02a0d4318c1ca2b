//! Host facts: effective uid, platform file, executable lookup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::HostInspector;
use crate::domain::HostEnv;

/// Production `HostInspector` backed by `nix` and `which`.
pub struct SystemInspector;

impl HostInspector for SystemInspector {
    fn effective_uid(&self) -> u32 {
        nix::unistd::geteuid().as_raw()
    }

    fn read_os_release(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn find_executable(&self, name: &str, env: &HostEnv) -> Option<PathBuf> {
        let paths = std::env::join_paths(env.dirs()).ok()?;
        which::which_in(name, Some(paths), "/").ok()
    }
}
