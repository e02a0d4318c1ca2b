//! Exclusive per-host run lock on an `flock`ed file.

use std::any::Any;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::application::ports::RunLock;
use crate::domain::ProvisionError;

/// Production `RunLock`. The lock dies with the process, so a crashed run
/// never leaves the host locked.
pub struct FlockRunLock;

impl RunLock for FlockRunLock {
    fn try_lock(&self, path: &Path) -> Result<Box<dyn Any>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("opening lock file {}", path.display()))?;
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => Ok(Box::new(guard)),
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => Err(ProvisionError::Locked {
                path: path.to_path_buf(),
            }
            .into()),
            Err((_, errno)) => {
                Err(anyhow::Error::new(errno)).with_context(|| format!("locking {}", path.display()))
            }
        }
    }
}
