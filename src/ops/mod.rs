//! High-level operations.
//!
//! This module contains the implementation of Griddle commands.

pub mod clean;
pub mod generate;
pub mod query;

pub use clean::{clean, CleanOptions, CleanSummary};
pub use generate::{generate, GenerateOptions, GenerateSummary, PlanEntry};
pub use query::{list_settings, list_targets, SettingInfo, TargetInfo};
