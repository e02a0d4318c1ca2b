//! Filesystem infrastructure: implements `LocalFs` and `FileHasher`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::application::ports::StagingDir;

/// Production filesystem implementation.
pub struct LocalFs;

impl crate::application::ports::FileHasher for LocalFs {
    fn sha256_file(&self, path: &Path) -> Result<String> {
        sha256_file(path)
    }
}

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks count: they still occupy the name.
        path.symlink_metadata().is_ok()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn write_atomic(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        write_atomic(path, content, mode)
    }

    fn staging_dir(&self) -> Result<StagingDir> {
        staging_dir()
    }

    fn symlink_replace(&self, target: &Path, link: &Path) -> Result<()> {
        symlink_replace(target, link)
    }
}

/// Removes the staging directory on drop, logging instead of ignoring failures.
struct StagingCleanup(Option<TempDir>);

impl Drop for StagingCleanup {
    fn drop(&mut self) {
        if let Some(dir) = self.0.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::warn!(path = %path.display(), error = %e, "could not remove staging directory");
            }
        }
    }
}

/// Create a randomly named mode-0700 directory under the system temp dir.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn staging_dir() -> Result<StagingDir> {
    let dir = tempfile::Builder::new()
        .prefix("mimipanel-")
        .tempdir()
        .context("creating staging directory")?;
    let path = dir.path().to_path_buf();
    tracing::debug!(path = %path.display(), "staging directory created");
    Ok(StagingDir::new(path, Box::new(StagingCleanup(Some(dir)))))
}

fn parent_of(path: &Path) -> Result<&Path> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .with_context(|| format!("{} has no parent directory", path.display()))
}

/// Write `content` to a temp file beside `path`, set `mode`, then rename over `path`.
///
/// # Errors
///
/// Returns an error if any filesystem operation fails.
pub fn write_atomic(path: &Path, content: &str, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = parent_of(path)?;
    std::fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;
    std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("setting permissions on {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Point `link` at `target` by renaming a freshly created symlink over it.
///
/// # Errors
///
/// Returns an error if the symlink cannot be created or renamed.
pub fn symlink_replace(target: &Path, link: &Path) -> Result<()> {
    let dir = parent_of(link)?;
    std::fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    let name = link
        .file_name()
        .with_context(|| format!("{} has no file name", link.display()))?;
    let tmp = dir.join(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        std::process::id()
    ));
    if tmp.symlink_metadata().is_ok() {
        std::fs::remove_file(&tmp).with_context(|| format!("removing stale {}", tmp.display()))?;
    }
    std::os::unix::fs::symlink(target, &tmp)
        .with_context(|| format!("linking {} -> {}", tmp.display(), target.display()))?;
    std::fs::rename(&tmp, link).with_context(|| format!("replacing {}", link.display()))
}

/// Lower-case hex SHA-256 of the file at `path`, streamed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).with_context(|| format!("reading {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}
