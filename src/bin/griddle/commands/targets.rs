//! `griddle targets` - list the targets a recipe declares.

use anyhow::Result;

use griddle::ops;

use crate::cli::TargetsArgs;

pub fn execute(args: TargetsArgs) -> Result<()> {
    let targets = ops::list_targets(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    let width = targets.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for target in &targets {
        println!(
            "{:width$}  {:14}  [{}]",
            target.name,
            target.kind,
            target.toolsets.join(", ")
        );
    }
    Ok(())
}
