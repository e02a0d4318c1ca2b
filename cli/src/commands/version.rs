//! Version command

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::output::json;

/// Arguments for the version command.
#[derive(Args, Default)]
pub struct VersionArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(args: &VersionArgs, app: &AppContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if args.json {
        json::print(&serde_json::json!({ "version": version }))
    } else {
        app.renderer().render_version(version);
        Ok(())
    }
}
