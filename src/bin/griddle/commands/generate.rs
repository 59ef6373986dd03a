//! `griddle generate` - the main operation.

use anyhow::Result;

use griddle::ops::{self, GenerateOptions};
use griddle::util::config::Config;
use griddle::util::shell::Shell;

use crate::cli::GenerateArgs;
use crate::commands::parse_defines;

pub fn execute(args: GenerateArgs, shell: &Shell, config: &Config) -> Result<()> {
    let opts = GenerateOptions {
        toolsets: args.toolsets,
        defines: parse_defines(&args.defines)?,
        dry_run: args.dry_run,
        plan: args.plan,
    };

    ops::generate(shell, config, &args.file, &opts)?;
    Ok(())
}
