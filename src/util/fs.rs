//! Filesystem utilities.
//!
//! All generated files go through [`write_if_changed`], which writes
//! atomically (temp file + rename) and leaves files untouched when the
//! contents are already current, so repeated generation does not bump
//! mtimes and trigger spurious rebuilds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Outcome of a [`write_if_changed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File was created or its contents replaced.
    Written,
    /// File already had exactly these contents.
    Unchanged,
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with a path-bearing error message.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a file atomically, skipping the write when contents match.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<WriteOutcome> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            return Ok(WriteOutcome::Unchanged);
        }
    }

    let dir = path.parent().unwrap_or(Path::new("."));
    ensure_dir(dir)?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    std::io::Write::write_all(&mut tmp.as_file(), contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(WriteOutcome::Written)
}

/// Remove a file if it exists, reporting whether anything was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Expand a glob pattern relative to a base directory.
///
/// Results are sorted and relative to `base`. A pattern without glob
/// metacharacters is returned as-is even when the file does not exist;
/// whether it is missing is the build tool's concern, not ours.
pub fn glob_relative(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let full = base.join(pattern);
    let full_str = full.to_string_lossy();

    let mut matches = Vec::new();
    for entry in glob::glob(&full_str)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        let path = entry.with_context(|| format!("failed to read glob match for {}", pattern))?;
        let rel = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
        matches.push(rel);
    }
    matches.sort();

    Ok(matches)
}

/// Compute `path` relative to `base`, falling back to the absolute path.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes regardless of host platform.
///
/// Makefiles use forward slashes everywhere; MSBuild accepts both but
/// Visual Studio writes backslashes, see [`windows_slashes`].
pub fn unix_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Render a path with backslashes, as Visual Studio project files expect.
pub fn windows_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\")
}
