//! Command implementations.

pub mod clean;
pub mod completions;
pub mod generate;
pub mod settings;
pub mod targets;
pub mod toolsets;

use anyhow::{bail, Result};

/// Parse repeated `NAME=VALUE` --define flags.
pub fn parse_defines(defines: &[String]) -> Result<Vec<(String, String)>> {
    defines
        .iter()
        .map(|raw| match raw.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                Ok((name.to_string(), value.to_string()))
            }
            _ => bail!("invalid --define `{}`; expected NAME=VALUE", raw),
        })
        .collect()
}
