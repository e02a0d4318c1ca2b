//! `mimipanel plan`: show what a run would do, without touching the host.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::plan::build_plan;
use crate::output::json;

/// Arguments for the plan command.
#[derive(Args, Default)]
pub struct PlanArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run `mimipanel plan`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(args: &PlanArgs, app: &AppContext) -> Result<()> {
    let config = app.load_config()?;
    let plan = build_plan(&config);
    if args.json {
        json::print(&plan)
    } else {
        app.renderer().render_plan(&plan);
        Ok(())
    }
}
