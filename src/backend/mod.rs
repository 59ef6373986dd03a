//! Toolset backends: rendering evaluated projects to build files.
//!
//! Each backend implements [`ToolsetBackend`] and renders into an
//! [`Outbox`]; nothing here touches the filesystem, so backends are
//! trivially testable and dry-run is free.

pub mod external;
pub mod gnu;
pub mod guid;
pub mod registry;
pub mod trait_def;
pub mod vs2010;

pub use registry::BackendRegistry;
pub use trait_def::{OutFile, Outbox, ToolsetBackend};
