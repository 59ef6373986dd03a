//! `griddle toolsets` - list registered toolset backends.

use anyhow::Result;
use serde::Serialize;

use griddle::backend::BackendRegistry;

use crate::cli::ToolsetsArgs;

#[derive(Serialize)]
struct ToolsetInfo {
    name: &'static str,
    description: &'static str,
}

pub fn execute(args: ToolsetsArgs) -> Result<()> {
    let registry = BackendRegistry::new();

    if args.json {
        let infos: Vec<ToolsetInfo> = registry
            .all()
            .map(|b| ToolsetInfo {
                name: b.name(),
                description: b.description(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let width = registry
        .names()
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0);
    for backend in registry.all() {
        println!("{:width$}  {}", backend.name(), backend.description());
    }
    Ok(())
}
