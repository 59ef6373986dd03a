//! `griddle settings` - list the settings a recipe exposes.

use anyhow::Result;

use griddle::ops;

use crate::cli::SettingsArgs;

pub fn execute(args: SettingsArgs) -> Result<()> {
    let settings = ops::list_settings(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    if settings.is_empty() {
        println!("no settings declared in {}", args.file.display());
        return Ok(());
    }

    let width = settings.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for setting in &settings {
        let help = setting.help.as_deref().unwrap_or("");
        println!(
            "{:width$}  default: {:12}  {}",
            setting.name, setting.default, help
        );
    }
    Ok(())
}
