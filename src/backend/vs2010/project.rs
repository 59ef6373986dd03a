//! `.vcxproj` emission (MSBuild 4.0 schema).

use crate::backend::guid::project_guid;
use crate::backend::vs2010::xml::XmlWriter;
use crate::core::target::TargetKind;
use crate::eval::{BuildItem, EvaluatedProject};
use crate::util::fs::{relative_to, windows_slashes};

const MSBUILD_NS: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// The two configurations every generated project carries.
struct Configuration {
    name: &'static str,
    define: &'static str,
    optimization: &'static str,
    runtime: &'static str,
    use_debug_libraries: &'static str,
}

const CONFIGURATIONS: &[Configuration] = &[
    Configuration {
        name: "Debug",
        define: "_DEBUG",
        optimization: "Disabled",
        runtime: "MultiThreadedDebugDLL",
        use_debug_libraries: "true",
    },
    Configuration {
        name: "Release",
        define: "NDEBUG",
        optimization: "MaxSpeed",
        runtime: "MultiThreadedDLL",
        use_debug_libraries: "false",
    },
];

fn configuration_type(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Program => "Application",
        TargetKind::Library => "StaticLibrary",
        TargetKind::SharedLibrary => "DynamicLibrary",
        TargetKind::Action => "Utility",
        TargetKind::External => unreachable!("external projects are not generated"),
    }
}

fn condition(config: &Configuration) -> String {
    format!(
        "'$(Configuration)|$(Platform)'=='{}|Win32'",
        config.name
    )
}

/// Render the project file for one generated (non-external) item.
pub fn render_vcxproj(project: &EvaluatedProject, item: &BuildItem) -> String {
    let mut xml = XmlWriter::new();
    xml.open(
        "Project",
        &[
            ("DefaultTargets", "Build"),
            ("ToolsVersion", "4.0"),
            ("xmlns", MSBUILD_NS),
        ],
    );

    // Configuration list.
    xml.open("ItemGroup", &[("Label", "ProjectConfigurations")]);
    for config in CONFIGURATIONS {
        let include = format!("{}|Win32", config.name);
        xml.open("ProjectConfiguration", &[("Include", include.as_str())]);
        xml.text_elem("Configuration", &[], config.name);
        xml.text_elem("Platform", &[], "Win32");
        xml.close();
    }
    xml.close();

    // Globals.
    xml.open("PropertyGroup", &[("Label", "Globals")]);
    xml.text_elem("ProjectGuid", &[], &project_guid(item.name.as_str()));
    xml.text_elem("Keyword", &[], "Win32Proj");
    xml.text_elem("RootNamespace", &[], item.name.as_str());
    xml.close();

    xml.empty(
        "Import",
        &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.Default.props")],
    );

    for config in CONFIGURATIONS {
        let cond = condition(config);
        xml.open(
            "PropertyGroup",
            &[("Condition", cond.as_str()), ("Label", "Configuration")],
        );
        xml.text_elem("ConfigurationType", &[], configuration_type(item.kind));
        xml.text_elem("UseDebugLibraries", &[], config.use_debug_libraries);
        xml.text_elem("CharacterSet", &[], "MultiByte");
        xml.close();
    }

    xml.empty(
        "Import",
        &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.props")],
    );

    // User settings with defaults, then naming/output overrides that
    // may reference them.
    xml.open("PropertyGroup", &[]);
    for setting in &project.settings {
        let cond = format!("'$({})' == ''", setting.name);
        xml.text_elem(
            setting.name.as_str(),
            &[("Condition", cond.as_str())],
            &setting.default.render_dollar(),
        );
    }
    if item.basename.as_literal() != Some(item.name.as_str()) {
        xml.text_elem("TargetName", &[], &item.basename.render_dollar());
    }
    if let Some(outputdir) = &item.outputdir {
        let dir = format!("{}\\", windows_slashes(outputdir));
        xml.text_elem("OutDir", &[], &dir);
    }
    xml.close();

    for config in CONFIGURATIONS {
        let cond = condition(config);
        xml.open("ItemDefinitionGroup", &[("Condition", cond.as_str())]);

        if item.kind == TargetKind::Action {
            let commands: Vec<String> =
                item.commands.iter().map(|c| c.render_dollar()).collect();
            xml.open("PreBuildEvent", &[]);
            xml.text_elem("Command", &[], &commands.join("\r\n"));
            xml.close();
        } else {
            render_cl_compile(&mut xml, project, item, config);
            if matches!(item.kind, TargetKind::Program | TargetKind::SharedLibrary) {
                render_link(&mut xml, project, item);
            }
        }

        xml.close();
    }

    // Source and header lists.
    if !item.sources.is_empty() {
        xml.open("ItemGroup", &[]);
        for source in &item.sources {
            xml.empty("ClCompile", &[("Include", windows_slashes(source).as_str())]);
        }
        xml.close();
    }
    if !item.headers.is_empty() {
        xml.open("ItemGroup", &[]);
        for header in &item.headers {
            xml.empty("ClInclude", &[("Include", windows_slashes(header).as_str())]);
        }
        xml.close();
    }

    xml.empty(
        "Import",
        &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.targets")],
    );
    xml.close();
    xml.finish()
}

fn render_cl_compile(
    xml: &mut XmlWriter,
    _project: &EvaluatedProject,
    item: &BuildItem,
    config: &Configuration,
) {
    xml.open("ClCompile", &[]);
    xml.text_elem("WarningLevel", &[], "Level3");
    xml.text_elem("Optimization", &[], config.optimization);
    xml.text_elem("RuntimeLibrary", &[], config.runtime);

    let mut defines: Vec<String> = item.defines.iter().map(|d| d.render_dollar()).collect();
    defines.push(config.define.to_string());
    defines.push("%(PreprocessorDefinitions)".to_string());
    xml.text_elem("PreprocessorDefinitions", &[], &defines.join(";"));

    if !item.includedirs.is_empty() {
        let mut dirs: Vec<String> = item
            .includedirs
            .iter()
            .map(|d| d.render_dollar().replace('/', "\\"))
            .collect();
        dirs.push("%(AdditionalIncludeDirectories)".to_string());
        xml.text_elem("AdditionalIncludeDirectories", &[], &dirs.join(";"));
    }

    if !item.compiler_options.is_empty() {
        let mut options: Vec<String> = item
            .compiler_options
            .iter()
            .map(|o| o.render_dollar())
            .collect();
        options.push("%(AdditionalOptions)".to_string());
        xml.text_elem("AdditionalOptions", &[], &options.join(" "));
    }

    xml.close();
}

fn render_link(xml: &mut XmlWriter, project: &EvaluatedProject, item: &BuildItem) {
    xml.open("Link", &[]);
    if item.kind == TargetKind::Program {
        xml.text_elem("SubSystem", &[], item.subsystem.msbuild_value());
    }
    xml.text_elem("GenerateDebugInformation", &[], "true");

    let mut libdirs: Vec<String> = item
        .libdirs
        .iter()
        .map(|d| d.render_dollar().replace('/', "\\"))
        .collect();

    let mut libs: Vec<String> = item
        .libs
        .iter()
        .map(|l| format!("{}.lib", l.render_dollar()))
        .collect();

    // Dependent static/shared libraries link by artifact name; sibling
    // modules contribute their directory as a search path.
    for dep in item
        .deps
        .iter()
        .filter_map(|d| project.find_item(*d))
        .filter(|d| d.kind.is_linkable())
    {
        libs.push(format!("{}.lib", dep.basename.render_dollar()));
        if dep.module_idx != item.module_idx {
            let from = &project.modules[item.module_idx].dir;
            let to = &project.modules[dep.module_idx].dir;
            libdirs.push(windows_slashes(&relative_to(to, from)));
        }
    }

    if !libs.is_empty() {
        libs.push("%(AdditionalDependencies)".to_string());
        xml.text_elem("AdditionalDependencies", &[], &libs.join(";"));
    }
    if !libdirs.is_empty() {
        libdirs.push("%(AdditionalLibraryDirectories)".to_string());
        xml.text_elem("AdditionalLibraryDirectories", &[], &libdirs.join(";"));
    }

    if !item.link_options.is_empty() {
        let mut options: Vec<String> = item
            .link_options
            .iter()
            .map(|o| o.render_dollar())
            .collect();
        options.push("%(AdditionalOptions)".to_string());
        xml.text_elem("AdditionalOptions", &[], &options.join(" "));
    }

    xml.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::eval::evaluate;
    use crate::util::interning::Symbol;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn evaluated(recipe: &str, files: &[&str]) -> (TempDir, EvaluatedProject) {
        let tmp = TempDir::new().unwrap();
        for file in files {
            let path = tmp.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "").unwrap();
        }
        let root = tmp.path().join("root.bkl");
        fs::write(&root, recipe).unwrap();
        let project = Project::load(&root).unwrap();
        let evaluated = evaluate(&project, Symbol::intern("vs2010"), &BTreeMap::new()).unwrap();
        (tmp, evaluated)
    }

    #[test]
    fn test_program_project_shape() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nprogram hello {\n  sources { hello.c }\n  headers { hello.h }\n  defines = GREETING;\n  includedirs = include;\n}\n",
            &["hello.c", "hello.h"],
        );
        let item = project.find_item(Symbol::intern("hello")).unwrap();
        let xml = render_vcxproj(&project, item);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("ToolsVersion=\"4.0\""));
        assert!(xml.contains("<ConfigurationType>Application</ConfigurationType>"));
        assert!(xml.contains("<RootNamespace>hello</RootNamespace>"));
        assert!(xml.contains("GREETING;_DEBUG;%(PreprocessorDefinitions)"));
        assert!(xml.contains("GREETING;NDEBUG;%(PreprocessorDefinitions)"));
        assert!(xml.contains("include;%(AdditionalIncludeDirectories)"));
        assert!(xml.contains("<ClCompile Include=\"hello.c\" />"));
        assert!(xml.contains("<ClInclude Include=\"hello.h\" />"));
        assert!(xml.contains("<SubSystem>Console</SubSystem>"));
        assert!(xml.contains("Microsoft.Cpp.targets"));
    }

    #[test]
    fn test_library_kinds_map_to_configuration_types() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nlibrary a { sources { a.c } }\nshared-library b { sources { b.c } }\n",
            &["a.c", "b.c"],
        );

        let a = render_vcxproj(&project, project.find_item(Symbol::intern("a")).unwrap());
        assert!(a.contains("<ConfigurationType>StaticLibrary</ConfigurationType>"));
        // Static libraries have no linker section.
        assert!(!a.contains("<Link>"));

        let b = render_vcxproj(&project, project.find_item(Symbol::intern("b")).unwrap());
        assert!(b.contains("<ConfigurationType>DynamicLibrary</ConfigurationType>"));
        assert!(b.contains("<Link>"));
    }

    #[test]
    fn test_settings_emitted_as_defaulted_properties() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nsetting PROGRAM_NAME {\n  help = \"Output name\";\n  default = hello;\n}\nprogram hello {\n  sources { hello.c }\n  basename = $(PROGRAM_NAME);\n}\n",
            &["hello.c"],
        );
        let item = project.find_item(Symbol::intern("hello")).unwrap();
        let xml = render_vcxproj(&project, item);

        assert!(xml.contains(
            "<PROGRAM_NAME Condition=\"'$(PROGRAM_NAME)' == ''\">hello</PROGRAM_NAME>"
        ));
        assert!(xml.contains("<TargetName>$(PROGRAM_NAME)</TargetName>"));
    }

    #[test]
    fn test_windows_subsystem() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nprogram gui {\n  sources { gui.c }\n  win32-subsystem = windows;\n}\n",
            &["gui.c"],
        );
        let item = project.find_item(Symbol::intern("gui")).unwrap();
        let xml = render_vcxproj(&project, item);
        assert!(xml.contains("<SubSystem>Windows</SubSystem>"));
    }

    #[test]
    fn test_dep_library_linked() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nprogram app {\n  sources { app.c }\n  deps = util;\n}\nlibrary util { sources { util.c } }\n",
            &["app.c", "util.c"],
        );
        let item = project.find_item(Symbol::intern("app")).unwrap();
        let xml = render_vcxproj(&project, item);
        assert!(xml.contains("util.lib;%(AdditionalDependencies)"));
    }

    #[test]
    fn test_action_uses_prebuild_event() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\naction docs { commands = \"doxygen Doxyfile\"; }\n",
            &[],
        );
        let item = project.find_item(Symbol::intern("docs")).unwrap();
        let xml = render_vcxproj(&project, item);
        assert!(xml.contains("<ConfigurationType>Utility</ConfigurationType>"));
        assert!(xml.contains("<Command>doxygen Doxyfile</Command>"));
    }

    #[test]
    fn test_outputdir_sets_outdir() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nprogram hello {\n  sources { hello.c }\n  outputdir = bin;\n}\n",
            &["hello.c"],
        );
        let item = project.find_item(Symbol::intern("hello")).unwrap();
        let xml = render_vcxproj(&project, item);
        assert!(xml.contains("<OutDir>bin\\</OutDir>"));
    }

    #[test]
    fn test_subdirectory_sources_use_backslashes() {
        let (_tmp, project) = evaluated(
            "toolsets = vs2010;\nprogram hello { sources { src/main.c } }\n",
            &["src/main.c"],
        );
        let item = project.find_item(Symbol::intern("hello")).unwrap();
        let xml = render_vcxproj(&project, item);
        assert!(xml.contains("<ClCompile Include=\"src\\main.c\" />"));
    }
}
