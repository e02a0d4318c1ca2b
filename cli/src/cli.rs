//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Provision an Ubuntu host with the Mimipanel stack
#[derive(Parser)]
#[command(name = "mimipanel", version, propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "MIMIPANEL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Never prompt; fail instead
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `install`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision this host (requires root)
    Install,

    /// Show what install would do, without changing anything
    Plan(commands::plan::PlanArgs),

    /// Show version
    Version(commands::version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            config,
            quiet,
            no_color,
            yes,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes, config },
        });

        match command.unwrap_or(Command::Install) {
            Command::Install => commands::install::run(&app).await,
            Command::Plan(args) => commands::plan::run(&args, &app),
            Command::Version(args) => commands::version::run(&args, &app),
        }
    }
}
