//! Presentation layer: everything printed for the operator.

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Where user-facing text goes and how it is styled.
///
/// stdout carries progress and plans; stderr carries the final error.
/// Each stream is colored only when it is a terminal and color is allowed.
pub struct OutputContext {
    pub out: Styles,
    pub err: Styles,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let color = !no_color && std::env::var_os("NO_COLOR").is_none();
        Self {
            out: Styles::for_stream(color && Term::stdout().is_term()),
            err: Styles::for_stream(color && Term::stderr().is_term()),
            quiet,
        }
    }

    /// `  ✓ msg`
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.out.ok));
        }
    }

    /// `  ⚠ msg`
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {}", "⚠".style(self.out.caution), msg.style(self.out.caution));
        }
    }

    /// `✗ msg` on stderr. Printed even when quiet.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {}", "✗".style(self.err.failure), msg.style(self.err.failure));
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.style(self.out.heading));
        }
    }

    /// Aligned `key  value` line under a header.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<14}{value}", key.style(self.out.muted));
        }
    }
}
