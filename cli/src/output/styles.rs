//! Terminal stylesheet.

use owo_colors::Style;

/// Styles for one output stream. All plain when color is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub ok: Style,
    pub caution: Style,
    pub failure: Style,
    /// The `→` in front of a provisioning step.
    pub marker: Style,
    pub muted: Style,
    pub heading: Style,
    /// Paths of generated files in `plan` output.
    pub file: Style,
}

impl Styles {
    /// Colored styles when `enabled`, plain ones otherwise.
    #[must_use]
    pub fn for_stream(enabled: bool) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            ok: Style::new().green(),
            caution: Style::new().yellow(),
            failure: Style::new().red(),
            marker: Style::new().cyan(),
            muted: Style::new().dimmed(),
            heading: Style::new().bold(),
            file: Style::new().bold().underline(),
        }
    }
}
