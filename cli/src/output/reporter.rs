//! `ProgressReporter` for the terminal.

use std::cell::Cell;

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Prints provisioning progress to stdout.
///
/// Steps are `→ [n/8] title` lines separated by a blank line; outcomes
/// within a step are indented below it.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    started: Cell<bool>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            started: Cell::new(false),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.started.replace(true) {
            println!();
        }
        println!(
            "{} {}",
            "→".style(self.ctx.out.marker),
            message.style(self.ctx.out.heading)
        );
    }

    fn success(&self, message: &str) {
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(message);
    }
}
