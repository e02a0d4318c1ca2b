//! Per-invocation state shared by the command handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::domain::PanelConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::{PortOptions, SystemPorts};
use crate::output::{HumanRenderer, OutputContext, TerminalReporter};

/// Environment variable that forces non-interactive mode.
pub const YES_ENV: &str = "MIMIPANEL_YES";

pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
}

pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `MIMIPANEL_YES` env vars).
    pub yes: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

/// Global flags, as parsed by clap.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

/// What every command needs: output, config location, prompt policy.
pub struct AppContext {
    pub output: OutputContext,
    /// Configuration file given on the command line, if any.
    pub config_path: Option<PathBuf>,
    /// When `true`, never prompt.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `MIMIPANEL_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let ci_env = std::env::var_os("CI").is_some() || std::env::var_os(YES_ENV).is_some();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_path: flags.behaviour.config,
            non_interactive: flags.behaviour.yes || ci_env,
        }
    }

    /// Load the configuration from the resolved file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, unparsable or invalid.
    pub fn load_config(&self) -> Result<PanelConfig> {
        let store = YamlConfigStore::resolve(self.config_path.as_deref());
        tracing::debug!(path = %store.path().display(), "loading configuration");
        store.load()
    }

    /// Production ports for a run with `config`.
    #[must_use]
    pub fn system_ports(&self, config: &PanelConfig) -> SystemPorts {
        SystemPorts::new(PortOptions {
            quiet: self.output.quiet,
            non_interactive: self.non_interactive,
            command_timeout: config.command_timeout_secs.map(Duration::from_secs),
        })
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
