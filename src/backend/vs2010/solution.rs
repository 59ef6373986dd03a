//! `.sln` emission (Visual Studio 2010 solution format).

use std::fmt::Write;

use crate::backend::guid::VCPROJ_TYPE_GUID;

/// One project entry in the solution.
#[derive(Debug, Clone)]
pub struct SlnEntry {
    pub name: String,
    /// Project GUID in registry format.
    pub guid: String,
    /// Project file path relative to the solution, backslash-separated.
    pub rel_path: String,
    /// GUIDs of projects this one depends on.
    pub deps: Vec<String>,
}

/// Render a complete solution file.
pub fn render_sln(entries: &[SlnEntry]) -> String {
    let mut sln = String::new();
    sln.push_str("Microsoft Visual Studio Solution File, Format Version 11.00\n");
    sln.push_str("# Visual Studio 2010\n");

    for entry in entries {
        writeln!(
            sln,
            "Project(\"{}\") = \"{}\", \"{}\", \"{}\"",
            VCPROJ_TYPE_GUID, entry.name, entry.rel_path, entry.guid
        )
        .unwrap();
        if !entry.deps.is_empty() {
            sln.push_str("\tProjectSection(ProjectDependencies) = postProject\n");
            for dep in &entry.deps {
                writeln!(sln, "\t\t{} = {}", dep, dep).unwrap();
            }
            sln.push_str("\tEndProjectSection\n");
        }
        sln.push_str("EndProject\n");
    }

    sln.push_str("Global\n");
    sln.push_str("\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n");
    sln.push_str("\t\tDebug|Win32 = Debug|Win32\n");
    sln.push_str("\t\tRelease|Win32 = Release|Win32\n");
    sln.push_str("\tEndGlobalSection\n");
    sln.push_str("\tGlobalSection(ProjectConfigurationPlatforms) = postSolution\n");
    for entry in entries {
        for config in ["Debug|Win32", "Release|Win32"] {
            writeln!(sln, "\t\t{}.{}.ActiveCfg = {}", entry.guid, config, config).unwrap();
            writeln!(sln, "\t\t{}.{}.Build.0 = {}", entry.guid, config, config).unwrap();
        }
    }
    sln.push_str("\tEndGlobalSection\n");
    sln.push_str("\tGlobalSection(SolutionProperties) = preSolution\n");
    sln.push_str("\t\tHideSolutionNode = FALSE\n");
    sln.push_str("\tEndGlobalSection\n");
    sln.push_str("EndGlobal\n");
    sln
}
