//! Network infrastructure: implements `Downloader` with ureq on `spawn_blocking`.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::Downloader;

const USER_AGENT: &str = concat!("mimipanel/", env!("CARGO_PKG_VERSION"));

/// Timeout for small text requests such as the public-IP lookup.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Production `Downloader`. Shows a byte progress bar unless `quiet`.
pub struct UreqDownloader {
    quiet: bool,
}

impl UreqDownloader {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Downloader for UreqDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let (url, dest, quiet) = (url.to_string(), dest.to_path_buf(), self.quiet);
        tokio::task::spawn_blocking(move || do_download(&url, &dest, quiet))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let response = call(ureq::get(&url).timeout(FETCH_TIMEOUT), &url)?;
            response.into_string().context("reading response")
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }
}

fn call(req: ureq::Request, url: &str) -> Result<ureq::Response> {
    match req.set("User-Agent", USER_AGENT).call() {
        Ok(r) => Ok(r),
        Err(ureq::Error::Status(code, _)) => anyhow::bail!("GET {url}: HTTP {code}"),
        Err(e) => Err(e).with_context(|| format!("GET {url}")),
    }
}

/// Stream `url` into an unpredictably named temp file beside `dest`, then
/// rename it into place. The temp file is removed if anything fails.
fn do_download(url: &str, dest: &Path, quiet: bool) -> Result<()> {
    tracing::debug!(url, dest = %dest.display(), "downloading");
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;

    let response = call(ureq::get(url), url)?;
    let total = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok());
    let mut partial = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    let pb = make_progress_bar(quiet, total);

    let mut reader = response.into_reader();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).context("download interrupted")?;
        if n == 0 {
            break;
        }
        partial.write_all(&buf[..n]).context("download interrupted")?;
        pb.inc(n as u64);
    }
    pb.finish_and_clear();
    partial.as_file().sync_all().context("flushing download")?;
    partial
        .persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to finalize {}", dest.display()))?;
    Ok(())
}

fn make_progress_bar(quiet: bool, total: Option<u64>) -> indicatif::ProgressBar {
    if quiet || !console::Term::stderr().is_term() {
        return indicatif::ProgressBar::hidden();
    }
    if let Some(t) = total {
        let pb = indicatif::ProgressBar::new(t);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("    {bar:40.cyan/dim} {percent}%  {bytes}/{total_bytes}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("━━─"),
        );
        pb
    } else {
        indicatif::ProgressBar::new_spinner()
    }
}
