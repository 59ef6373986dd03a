//! `griddle clean` - remove generated build files.

use anyhow::Result;

use griddle::ops::{self, CleanOptions};
use griddle::util::config::Config;
use griddle::util::shell::Shell;

use crate::cli::CleanArgs;
use crate::commands::parse_defines;

pub fn execute(args: CleanArgs, shell: &Shell, config: &Config) -> Result<()> {
    let opts = CleanOptions {
        toolsets: args.toolsets,
        defines: parse_defines(&args.defines)?,
        dry_run: args.dry_run,
    };

    ops::clean(shell, config, &args.file, &opts)?;
    Ok(())
}
