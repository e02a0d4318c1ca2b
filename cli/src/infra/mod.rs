//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, HTTP, archive extraction, credentials and locking.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod command_runner;
pub mod config;
pub mod credential;
pub mod fs;
pub mod host;
pub mod lock;
pub mod network;

use std::time::Duration;

use crate::application::ports::HostPorts;

/// Switches that shape the production adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortOptions {
    /// Hide download progress bars and child process output.
    pub quiet: bool,
    /// Never prompt on the terminal.
    pub non_interactive: bool,
    /// Kill external commands that run longer than this.
    pub command_timeout: Option<Duration>,
}

/// The real host, as seen through every port.
pub struct SystemPorts {
    runner: command_runner::TokioCommandRunner,
    inspector: host::SystemInspector,
    fs: fs::LocalFs,
    net: network::UreqDownloader,
    archive: archive::TarGzExtractor,
    credentials: credential::ChainCredentialProvider,
    lock: lock::FlockRunLock,
}

impl SystemPorts {
    #[must_use]
    pub fn new(opts: PortOptions) -> Self {
        Self {
            runner: command_runner::TokioCommandRunner::new(opts.command_timeout)
                .quiet(opts.quiet),
            inspector: host::SystemInspector,
            fs: fs::LocalFs,
            net: network::UreqDownloader::new(opts.quiet),
            archive: archive::TarGzExtractor,
            credentials: credential::ChainCredentialProvider::new(opts.non_interactive),
            lock: lock::FlockRunLock,
        }
    }
}

impl HostPorts for SystemPorts {
    type Runner = command_runner::TokioCommandRunner;
    type Inspector = host::SystemInspector;
    type Fs = fs::LocalFs;
    type Net = network::UreqDownloader;
    type Archive = archive::TarGzExtractor;
    type Credentials = credential::ChainCredentialProvider;
    type Lock = lock::FlockRunLock;

    fn runner(&self) -> &Self::Runner {
        &self.runner
    }
    fn inspector(&self) -> &Self::Inspector {
        &self.inspector
    }
    fn fs(&self) -> &Self::Fs {
        &self.fs
    }
    fn net(&self) -> &Self::Net {
        &self.net
    }
    fn archive(&self) -> &Self::Archive {
        &self.archive
    }
    fn credentials(&self) -> &Self::Credentials {
        &self.credentials
    }
    fn lock(&self) -> &Self::Lock {
        &self.lock
    }
}
