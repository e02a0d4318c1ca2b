//! Tarball extraction with path-traversal rejection.

use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::application::ports::ArchiveExtractor;

/// Production `ArchiveExtractor` for `.tar.gz` files.
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    async fn extract_tar_gz(&self, archive: &Path, dest: &Path) -> Result<()> {
        let (archive, dest) = (archive.to_path_buf(), dest.to_path_buf());
        tokio::task::spawn_blocking(move || extract_tar_gz(&archive, &dest))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }
}

/// Reject entry paths that are absolute or climb out with `..`.
///
/// # Errors
///
/// Returns an error naming the offending entry.
pub fn check_entry_path(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                anyhow::bail!("archive entry '{}' escapes the destination", path.display())
            }
        }
    }
    Ok(())
}

/// Unpack `archive` into `dest`, failing on the first unsafe entry.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or an entry is unsafe.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);

    for entry in tar.entries().context("reading archive")? {
        let mut entry = entry.context("reading archive entry")?;
        let path = entry.path().context("invalid entry path")?.into_owned();
        check_entry_path(&path)?;
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("extracting {}", path.display()))?;
        anyhow::ensure!(unpacked, "archive entry '{}' was refused", path.display());
    }
    tracing::debug!(archive = %archive.display(), dest = %dest.display(), "archive extracted");
    Ok(())
}
