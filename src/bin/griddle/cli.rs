//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use griddle::util::config::Config;
use griddle::util::shell::{ColorChoice, Shell, Verbosity};

/// Griddle - a declarative build-file generator for C and C++
#[derive(Parser)]
#[command(name = "griddle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Build the shell matching the global flags and user config.
    ///
    /// `--no-color` beats the config file; the config beats auto-detect.
    pub fn shell(&self, config: &Config) -> Shell {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let color = if self.no_color {
            ColorChoice::Never
        } else {
            config
                .color
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(ColorChoice::Auto)
        };
        Shell::new(verbosity, color)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate build files from a recipe
    Generate(GenerateArgs),

    /// List available toolsets
    Toolsets(ToolsetsArgs),

    /// List the settings a recipe exposes
    Settings(SettingsArgs),

    /// List the targets a recipe declares
    Targets(TargetsArgs),

    /// Remove previously generated build files
    Clean(CleanArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Recipe file to generate from
    pub file: PathBuf,

    /// Toolset to generate (repeatable; defaults to all declared)
    #[arg(short, long = "toolset")]
    pub toolsets: Vec<String>,

    /// Bind a variable before the recipe runs (NAME=VALUE, repeatable)
    #[arg(short = 'D', long = "define")]
    pub defines: Vec<String>,

    /// Report what would be written without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the output plan as JSON and exit
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct ToolsetsArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Recipe file to inspect
    pub file: PathBuf,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Recipe file to inspect
    pub file: PathBuf,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Recipe file whose outputs to remove
    pub file: PathBuf,

    /// Toolset to clean (repeatable; defaults to all declared)
    #[arg(short, long = "toolset")]
    pub toolsets: Vec<String>,

    /// Variable bindings matching the generate run (NAME=VALUE)
    #[arg(short = 'D', long = "define")]
    pub defines: Vec<String>,

    /// Report what would be removed without removing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
