//! Terminal UI: spinners, per-entry outcome lines, and the sweep summary.
//!
//! # Design goals
//!
//! - **Clean by default.** While a copy runs the user sees only a spinner and the entry name.
//! - **Informative on failure.** A failed step prints its error beneath the label.
//! - **Testable without a terminal.** [`StageOutcome`] is plain data; [`StageOutcome::line`]
//!   renders it without colour so tests can assert on the text.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames, matching indicatif's default style.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_skip() -> console::StyledObject<&'static str> {
    style("–").dim()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage outcome ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Skipped,
    Failed,
}

/// The result of one unit of work, usually one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// Human-readable label, e.g. `"Backup games"`.
    pub label: String,
    pub status: Status,
    /// Short note shown after the label, e.g. `"3 files copied"`.
    pub detail: Option<String>,
    /// Rendered error, set when `status` is [`Status::Failed`].
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn done(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: Status::Done,
            detail: Some(detail.into()),
            error: None,
        }
    }

    pub fn skipped(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: Status::Skipped,
            detail: Some(reason.into()),
            error: None,
        }
    }

    pub fn failed(label: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self {
            label: label.into(),
            status: Status::Failed,
            detail: None,
            error: Some(err.to_string()),
        }
    }

    /// Returns `true` if the stage did not succeed.
    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Uncoloured one-line summary.
    pub fn line(&self) -> String {
        let icon = match self.status {
            Status::Done => "✓",
            Status::Skipped => "–",
            Status::Failed => "✗",
        };
        match &self.detail {
            Some(detail) => format!("{icon}  {} ({detail})", self.label),
            None => format!("{icon}  {}", self.label),
        }
    }

    /// Print the summary line to stdout, and the error to stderr on failure.
    pub fn print(&self) {
        if !console::colors_enabled() {
            println!("  {}", self.line());
            if let Some(ref msg) = self.error {
                eprintln!("  Error: {msg}");
            }
            return;
        }

        let icon = match self.status {
            Status::Done => icon_ok(),
            Status::Skipped => icon_skip(),
            Status::Failed => icon_err(),
        };
        match &self.detail {
            Some(detail) => println!(
                "  {}  {} {}",
                icon,
                style(&self.label).bold(),
                style(format!("({detail})")).dim()
            ),
            None => println!("  {}  {}", icon, style(&self.label).bold()),
        }

        if let Some(ref msg) = self.error {
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
///
/// indicatif hides the spinner automatically when stderr is not a terminal.
fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("  {spinner:.cyan}  {msg}") {
        pb.set_style(template.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `work` behind a spinner labelled `label` and return what it produced.
///
/// The spinner is cleared before returning, so the caller's outcome line is
/// printed onto a clean terminal.
pub fn with_spinner<T>(label: &str, work: impl FnOnce() -> T) -> T {
    let spinner = make_spinner(label);
    let result = work();
    spinner.finish_and_clear();
    result
}

// ─── Messages ─────────────────────────────────────────────────────────────────

pub fn warn(msg: impl std::fmt::Display) {
    eprintln!("  {} {}", style("Warning:").yellow().bold(), msg);
}

pub fn error(msg: impl std::fmt::Display) {
    eprintln!("  {} {}", style("Error:").red().bold(), msg);
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the final summary after a sweep.
///
/// Shows a success banner when nothing failed, or a failure banner listing the
/// entries that failed.
pub fn print_summary(outcomes: &[StageOutcome]) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.is_failed()).collect();
    let done = outcomes
        .iter()
        .filter(|o| o.status == Status::Done)
        .count();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style(format!("{done} of {} entries backed up.", outcomes.len()))
                .cyan()
                .bold()
        );
    } else {
        eprintln!(
            "  {}  {}",
            icon_err(),
            style(format!("{} entries failed.", failed.len())).red().bold()
        );
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
