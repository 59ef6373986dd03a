//! Griddle CLI - a declarative build-file generator for C and C++

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use griddle::util::config::Config;
use griddle::util::diagnostic::RecipeError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(err) = run() {
        // Recipe errors carry source spans; render them through miette.
        match err.downcast::<RecipeError>() {
            Ok(recipe_err) => eprint!("{:?}", miette::Report::new(recipe_err)),
            Err(other) => eprintln!("error: {:#}", other),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("griddle=debug")
    } else {
        EnvFilter::new("griddle=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let shell = cli.shell(&config);

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &shell, &config),
        Commands::Toolsets(args) => commands::toolsets::execute(args),
        Commands::Settings(args) => commands::settings::execute(args),
        Commands::Targets(args) => commands::targets::execute(args),
        Commands::Clean(args) => commands::clean::execute(args, &shell, &config),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
