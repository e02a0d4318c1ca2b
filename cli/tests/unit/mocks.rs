//! Recording mock of every host port.
//!
//! `MockHost` implements all port traits itself and is its own `HostPorts`.
//! Every call lands in one ordered journal so tests can assert what happened
//! and in which order.

#![allow(clippy::expect_used, dead_code)]

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;
use mimipanel_cli::application::ports::{
    ArchiveExtractor, CommandRunner, CommandSpec, CredentialProvider, Downloader, FileHasher,
    HostInspector, HostPorts, LocalFs, ProgressReporter, RunLock, StagingDir,
};
use mimipanel_cli::domain::artifact::CredentialSource;
use mimipanel_cli::domain::{HostEnv, ProvisionError};

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

pub const UBUNTU_OS_RELEASE: &str = r#"PRETTY_NAME="Ubuntu 24.04 LTS"
NAME="Ubuntu"
VERSION_ID="24.04"
ID=ubuntu
ID_LIKE=debian
"#;

pub const FEDORA_OS_RELEASE: &str = "NAME=\"Fedora Linux\"\nID=fedora\nVERSION_ID=40\n";

// ── MockHost ──────────────────────────────────────────────────────────────────

pub struct MockHost {
    uid: u32,
    os_release: Option<String>,
    executables: Mutex<BTreeSet<String>>,
    located: BTreeMap<String, PathBuf>,
    failing: Vec<String>,
    effects: Vec<(String, PathBuf)>,
    archive_entries: Vec<String>,
    credential: Option<String>,
    public_ip: String,
    sha256: String,
    lock_held: bool,

    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    journal: Mutex<Vec<String>>,
    specs: Mutex<Vec<CommandSpec>>,
}

impl MockHost {
    /// A root-owned Ubuntu host where every runtime is already installed.
    pub fn new() -> Self {
        Self {
            uid: 0,
            os_release: Some(UBUNTU_OS_RELEASE.to_string()),
            executables: Mutex::new(
                ["node", "npm", "go", "pm2"]
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            ),
            located: BTreeMap::new(),
            failing: Vec::new(),
            effects: Vec::new(),
            archive_entries: vec!["backend".to_string(), "frontend/package.json".to_string()],
            credential: Some("ghp_s3cret".to_string()),
            public_ip: "203.0.113.7\n".to_string(),
            sha256: "0".repeat(64),
            lock_held: false,
            files: Mutex::new(BTreeMap::new()),
            dirs: Mutex::new(BTreeSet::new()),
            journal: Mutex::new(Vec::new()),
            specs: Mutex::new(Vec::new()),
        }
    }

    // ── Builders ──────────────────────────────────────────────────────────

    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self
    }

    pub fn os_release(mut self, content: Option<&str>) -> Self {
        self.os_release = content.map(str::to_string);
        self
    }

    pub fn without_executables(self) -> Self {
        self.executables.lock().expect("lock").clear();
        self
    }

    /// `name` is installed in `dir` only, found when `dir` is on the search path.
    pub fn executable_in(mut self, name: &str, dir: &str) -> Self {
        self.located.insert(name.to_string(), PathBuf::from(dir));
        self
    }

    /// Commands whose display contains `needle` exit 1.
    pub fn failing(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    /// A command whose display contains `needle` creates `path`.
    pub fn creates_on(mut self, needle: &str, path: &str) -> Self {
        self.effects.push((needle.to_string(), PathBuf::from(path)));
        self
    }

    pub fn archive_entries(mut self, entries: &[&str]) -> Self {
        self.archive_entries = entries.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn credential(mut self, value: Option<&str>) -> Self {
        self.credential = value.map(str::to_string);
        self
    }

    pub fn public_ip(mut self, body: &str) -> Self {
        self.public_ip = body.to_string();
        self
    }

    pub fn sha256(mut self, digest: &str) -> Self {
        self.sha256 = digest.to_string();
        self
    }

    pub fn lock_held(mut self) -> Self {
        self.lock_held = true;
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.touch(Path::new(path), content);
        self
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("lock").clone()
    }

    /// Displayed command lines, in run order.
    pub fn commands(&self) -> Vec<String> {
        self.specs
            .lock()
            .expect("lock")
            .iter()
            .map(CommandSpec::display)
            .collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.specs.lock().expect("lock").clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().expect("lock").get(Path::new(path)).cloned()
    }

    /// Position of the first journal entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.journal().iter().position(|e| e.starts_with(prefix))
    }

    fn record(&self, entry: String) {
        self.journal.lock().expect("lock").push(entry);
    }

    fn touch(&self, path: &Path, content: &str) {
        let mut dirs = self.dirs.lock().expect("lock");
        for ancestor in path.ancestors().skip(1) {
            dirs.insert(ancestor.to_path_buf());
        }
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_string());
    }
}

impl CommandRunner for MockHost {
    async fn run(&self, cmd: &CommandSpec) -> Result<Output> {
        let shown = cmd.display();
        self.record(format!("run {shown}"));
        self.specs.lock().expect("lock").push(cmd.clone());
        if self.failing.iter().any(|n| shown.contains(n.as_str())) {
            let stderr = format!("boom from {}", cmd.args.join(" "));
            return Ok(err_output(1, stderr.as_bytes()));
        }
        for (needle, path) in &self.effects {
            if shown.contains(needle.as_str()) {
                self.touch(path, "built");
            }
        }
        Ok(ok_output(b""))
    }
}

impl HostInspector for MockHost {
    fn effective_uid(&self) -> u32 {
        self.uid
    }

    fn read_os_release(&self, path: &Path) -> Result<String> {
        self.os_release
            .clone()
            .ok_or_else(|| anyhow::anyhow!("{} not found", path.display()))
    }

    fn find_executable(&self, name: &str, env: &HostEnv) -> Option<PathBuf> {
        if let Some(dir) = self.located.get(name) {
            return env.dirs().contains(dir).then(|| dir.join(name));
        }
        self.executables
            .lock()
            .expect("lock")
            .contains(name)
            .then(|| env.dirs().first().cloned().unwrap_or_default().join(name))
    }
}

impl LocalFs for MockHost {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock").contains_key(path)
            || self.dirs.lock().expect("lock").contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record(format!("mkdir {}", path.display()));
        let mut dirs = self.dirs.lock().expect("lock");
        for ancestor in path.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.record(format!("rm -r {}", path.display()));
        self.files
            .lock()
            .expect("lock")
            .retain(|p, _| !p.starts_with(path));
        self.dirs
            .lock()
            .expect("lock")
            .retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.record(format!("rm {}", path.display()));
        self.files.lock().expect("lock").remove(path);
        Ok(())
    }

    fn staging_dir(&self) -> Result<StagingDir> {
        let path = PathBuf::from("/tmp/mimipanel-staging");
        self.record(format!("stage {}", path.display()));
        Ok(StagingDir::new(path, Box::new(())))
    }

    fn write_atomic(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        self.record(format!("write {} {mode:o}", path.display()));
        self.touch(path, content);
        Ok(())
    }

    fn symlink_replace(&self, target: &Path, link: &Path) -> Result<()> {
        self.record(format!("link {} -> {}", link.display(), target.display()));
        self.touch(link, &format!("-> {}", target.display()));
        Ok(())
    }
}

impl FileHasher for MockHost {
    fn sha256_file(&self, path: &Path) -> Result<String> {
        self.record(format!("hash {}", path.display()));
        Ok(self.sha256.clone())
    }
}

impl Downloader for MockHost {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.record(format!("download {url}"));
        self.touch(dest, "payload");
        Ok(())
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.record(format!("fetch {url}"));
        Ok(self.public_ip.clone())
    }
}

impl ArchiveExtractor for MockHost {
    async fn extract_tar_gz(&self, archive: &Path, dest: &Path) -> Result<()> {
        self.record(format!("extract {} -> {}", archive.display(), dest.display()));
        for entry in &self.archive_entries {
            self.touch(&dest.join(entry), "extracted");
        }
        Ok(())
    }
}

impl CredentialProvider for MockHost {
    fn credential(&self, sources: &[CredentialSource]) -> Result<Option<String>> {
        self.record(format!("credential ({} sources)", sources.len()));
        Ok(self.credential.clone())
    }
}

impl RunLock for MockHost {
    fn try_lock(&self, path: &Path) -> Result<Box<dyn Any>> {
        self.record(format!("lock {}", path.display()));
        if self.lock_held {
            return Err(ProvisionError::Locked {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(Box::new(()))
    }
}

impl HostPorts for MockHost {
    type Runner = Self;
    type Inspector = Self;
    type Fs = Self;
    type Net = Self;
    type Archive = Self;
    type Credentials = Self;
    type Lock = Self;

    fn runner(&self) -> &Self {
        self
    }
    fn inspector(&self) -> &Self {
        self
    }
    fn fs(&self) -> &Self {
        self
    }
    fn net(&self) -> &Self {
        self
    }
    fn archive(&self) -> &Self {
        self
    }
    fn credentials(&self) -> &Self {
        self
    }
    fn lock(&self) -> &Self {
        self
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}
