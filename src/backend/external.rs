//! Externally maintained Visual Studio projects.
//!
//! An `external` target wraps a project file griddle did not generate,
//! typically a vendored third-party library. The file is never
//! rewritten; griddle only extracts the identity it needs (name, GUID,
//! format version) to reference the project from the solution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::util::diagnostic::RecipeError;

/// Identity of an external Visual Studio project.
#[derive(Debug, Clone)]
pub struct ExternalVsProject {
    /// Path of the project file as referenced by the recipe.
    pub path: PathBuf,
    /// Project name (RootNamespace / Name attribute).
    pub name: String,
    /// Project GUID in registry format.
    pub guid: String,
    /// Visual Studio product year the file format belongs to.
    pub version: u16,
}

/// Read the identity of an external `.vcproj`/`.vcxproj` file.
pub fn read_vs_project(path: &Path) -> Result<ExternalVsProject> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read external project: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("vcxproj") => read_msbuild_project(path, &content),
        Some("vcproj") => read_legacy_project(path, &content),
        _ => Err(RecipeError::ExternalMalformed {
            path: path.display().to_string(),
            attribute: "a .vcproj or .vcxproj extension".to_string(),
        }
        .into()),
    }
}

/// MSBuild-era project files (VS 2010).
fn read_msbuild_project(path: &Path, content: &str) -> Result<ExternalVsProject> {
    let version = match attr(content, "ToolsVersion") {
        Some(v) if v == "4.0" => 2010,
        Some(v) => {
            return Err(RecipeError::ExternalVersion {
                path: path.display().to_string(),
                version: format!("ToolsVersion=\"{}\"", v),
            }
            .into());
        }
        None => {
            return Err(missing(path, "ToolsVersion").into());
        }
    };

    let guid = element_text(content, "ProjectGuid")
        .ok_or_else(|| missing(path, "ProjectGuid"))?
        .to_uppercase();

    // RootNamespace is optional in hand-written projects; fall back to
    // the file stem like Visual Studio itself does.
    let name = element_text(content, "RootNamespace").unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Ok(ExternalVsProject {
        path: path.to_path_buf(),
        name,
        guid,
        version,
    })
}

/// Pre-MSBuild project files (VS 2003/2005/2008).
fn read_legacy_project(path: &Path, content: &str) -> Result<ExternalVsProject> {
    let version = match attr(content, "Version") {
        Some(v) if v == "7.10" => 2003,
        Some(v) if v == "8.00" => 2005,
        Some(v) if v == "9.00" => 2008,
        Some(v) => {
            return Err(RecipeError::ExternalVersion {
                path: path.display().to_string(),
                version: format!("Version=\"{}\"", v),
            }
            .into());
        }
        None => return Err(missing(path, "Version").into()),
    };

    let name = attr(content, "Name").ok_or_else(|| missing(path, "Name"))?;
    let guid = attr(content, "ProjectGUID")
        .ok_or_else(|| missing(path, "ProjectGUID"))?
        .to_uppercase();

    Ok(ExternalVsProject {
        path: path.to_path_buf(),
        name,
        guid,
        version,
    })
}

fn missing(path: &Path, attribute: &str) -> RecipeError {
    RecipeError::ExternalMalformed {
        path: path.display().to_string(),
        attribute: attribute.to_string(),
    }
}

/// First occurrence of `name="value"` anywhere in the document.
fn attr(content: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"{}="([^"]*)""#, regex::escape(name))).unwrap();
    re.captures(content).map(|cap| cap[1].to_string())
}

/// Text of the first `<name>text</name>` element.
fn element_text(content: &str, name: &str) -> Option<String> {
    let escaped = regex::escape(name);
    let re = Regex::new(&format!(r"<{}>\s*([^<]*?)\s*</{}>", escaped, escaped)).unwrap();
    re.captures(content).map(|cap| cap[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VCXPROJ: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" ToolsVersion="4.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup Label="Globals">
    <ProjectGuid>{12345678-ABCD-4321-9876-000011112222}</ProjectGuid>
    <RootNamespace>zlib</RootNamespace>
  </PropertyGroup>
</Project>
"#;

    const VCPROJ_2008: &str = r#"<?xml version="1.0" encoding="Windows-1252"?>
<VisualStudioProject
	ProjectType="Visual C++"
	Version="9.00"
	Name="libpng"
	ProjectGUID="{aaaabbbb-cccc-4ddd-8eee-ffff00001111}"
	>
</VisualStudioProject>
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_msbuild_project() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "zlib.vcxproj", VCXPROJ);

        let project = read_vs_project(&path).unwrap();
        assert_eq!(project.name, "zlib");
        assert_eq!(project.version, 2010);
        assert_eq!(project.guid, "{12345678-ABCD-4321-9876-000011112222}");
    }

    #[test]
    fn test_read_legacy_project_uppercases_guid() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "libpng.vcproj", VCPROJ_2008);

        let project = read_vs_project(&path).unwrap();
        assert_eq!(project.name, "libpng");
        assert_eq!(project.version, 2008);
        assert_eq!(project.guid, "{AAAABBBB-CCCC-4DDD-8EEE-FFFF00001111}");
    }

    #[test]
    fn test_unrecognized_version_errors() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "old.vcproj",
            r#"<VisualStudioProject Version="6.00" Name="x" ProjectGUID="{0}"/>"#,
        );

        let err = read_vs_project(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unrecognized version"), "got: {}", msg);
        assert!(msg.contains("6.00"));
    }

    #[test]
    fn test_missing_guid_errors() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "incomplete.vcxproj",
            r#"<Project ToolsVersion="4.0"></Project>"#,
        );

        let err = read_vs_project(&path).unwrap_err();
        assert!(err.to_string().contains("ProjectGuid"));
    }

    #[test]
    fn test_msbuild_name_falls_back_to_stem() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "vendored.vcxproj",
            r#"<Project ToolsVersion="4.0"><PropertyGroup><ProjectGuid>{12345678-ABCD-4321-9876-000011112222}</ProjectGuid></PropertyGroup></Project>"#,
        );

        let project = read_vs_project(&path).unwrap();
        assert_eq!(project.name, "vendored");
    }

    #[test]
    fn test_unknown_extension_errors() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "makefile.am", "");
        assert!(read_vs_project(&path).is_err());
    }
}
