//! Human-readable rendering of step results.

use console::Style;

use crate::steps::{ResultEntry, StepResult};

/// Styles for the result summary.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub key: Style,
    pub dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            error: Style::new().red().bold(),
            key: Style::new().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            error: Style::new(),
            key: Style::new(),
            dim: Style::new(),
        }
    }
}

/// Render a step result as an indented summary.
pub fn render_result(result: &StepResult, theme: &Theme) -> String {
    let mut out = String::new();

    let headline = result.summary_line();
    let headline = if result.success {
        theme.success.apply_to(headline)
    } else {
        theme.error.apply_to(headline)
    };
    out.push_str(&format!("{}\n", headline));

    if let Some(workspace) = &result.workspace {
        out.push_str(&format!(
            "  {} {}\n",
            theme.dim.apply_to("workspace:"),
            workspace.display()
        ));
    }

    if let Some(duration) = result.duration() {
        out.push_str(&format!(
            "  {} {:.2}s\n",
            theme.dim.apply_to("duration:"),
            duration.num_milliseconds() as f64 / 1000.0
        ));
    }

    render_section(&mut out, "artifacts", &result.artifacts, theme);
    render_section(&mut out, "evidence", &result.evidence, theme);
    out
}

fn render_section(out: &mut String, title: &str, entries: &[ResultEntry], theme: &Theme) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("  {}\n", theme.key.apply_to(format!("{}:", title))));
    for entry in entries {
        out.push_str(&format!(
            "    {} {}\n",
            theme.key.apply_to(&entry.name),
            theme.dim.apply_to(&entry.description)
        ));
        for line in entry.value.lines() {
            out.push_str(&format!("      {}\n", line));
        }
    }
}
