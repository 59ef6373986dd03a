//! Centralized shell output and progress management.
//!
//! All human-facing status lines go through [`Shell`], so commands never
//! format or pad output themselves. Progress bars (via indicatif) appear
//! only in normal verbosity on a terminal; verbose mode prints immediate
//! lines instead.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::util::diagnostic::{self, Diagnostic};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no status lines or progress
    Quiet,
    /// Default: status messages + progress bars
    #[default]
    Normal,
    /// --verbose: immediate status lines, no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status prefixes for output messages.
///
/// Shell handles all formatting - callers just pick the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // In-progress statuses (cyan)
    Parsing,
    Evaluating,
    Generating,
    Cleaning,

    // Result statuses (green)
    Emitted,
    Unchanged,
    Removed,
    Finished,
}

impl Status {
    fn label(&self) -> &'static str {
        match self {
            Status::Parsing => "Parsing",
            Status::Evaluating => "Evaluating",
            Status::Generating => "Generating",
            Status::Cleaning => "Cleaning",
            Status::Emitted => "Emitted",
            Status::Unchanged => "Unchanged",
            Status::Removed => "Removed",
            Status::Finished => "Finished",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Parsing | Status::Evaluating | Status::Generating | Status::Cleaning => {
                "\x1b[1;36m"
            }
            Status::Emitted | Status::Unchanged | Status::Removed | Status::Finished => {
                "\x1b[1;32m"
            }
        }
    }
}

/// Shell output handle, cheap to clone into ops.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    color: ColorChoice,
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

impl Shell {
    /// Create a shell with explicit verbosity and color settings.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        Shell { verbosity, color }
    }

    /// Whether ANSI colors should be emitted.
    pub fn color_enabled(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        }
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Print a right-aligned status line, cargo style.
    pub fn status(&self, status: Status, message: impl std::fmt::Display) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        let label = status.label();
        if self.color_enabled() {
            eprintln!("{}{:>12}\x1b[0m {}", status.color_code(), label, message);
        } else {
            eprintln!("{:>12} {}", label, message);
        }
    }

    /// Print a Finished line with elapsed time.
    pub fn finished(&self, message: impl std::fmt::Display, elapsed: Duration) {
        self.status(
            Status::Finished,
            format!("{} in {:.2}s", message, elapsed.as_secs_f64()),
        );
    }

    /// Emit a warning diagnostic.
    pub fn warn(&self, diag: &Diagnostic) {
        diagnostic::emit(diag, self.color_enabled());
    }

    /// Print verbose-only detail.
    pub fn verbose(&self, message: impl std::fmt::Display) {
        if self.verbosity == Verbosity::Verbose {
            eprintln!("{}", message);
        }
    }

    /// Create a progress bar for `len` steps, hidden unless useful.
    ///
    /// Hidden in quiet and verbose modes and when stderr is not a
    /// terminal, so machine-captured output stays clean.
    pub fn progress(&self, len: u64) -> ProgressBar {
        if self.verbosity != Verbosity::Normal || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_parsing() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!(
            "ALWAYS".parse::<ColorChoice>().unwrap(),
            ColorChoice::Always
        );
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_color_forced_modes() {
        let always = Shell::new(Verbosity::Normal, ColorChoice::Always);
        assert!(always.color_enabled());

        let never = Shell::new(Verbosity::Normal, ColorChoice::Never);
        assert!(!never.color_enabled());
    }

    #[test]
    fn test_progress_hidden_when_quiet() {
        let shell = Shell::new(Verbosity::Quiet, ColorChoice::Never);
        let bar = shell.progress(10);
        assert!(bar.is_hidden());
    }
}
