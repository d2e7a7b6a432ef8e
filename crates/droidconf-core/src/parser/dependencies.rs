//! `dependencies { }` block.
//!
//! Regex-based extraction of coordinate notations, platform BoMs and the
//! named-argument form. A dependency with a configuration lambda
//! (`implementation("a:b:1") { exclude(...) }`) is read from the block header.

use crate::error::ParseError;
use crate::parser::{RawDependency, RawDescriptor};
use crate::syntax::{Block, Node, Statement};
use crate::types::Coordinate;
use crate::value::unescape;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Matches: implementation("group:artifact[:version]")
static RE_NOTATION: OnceLock<Regex> = OnceLock::new();
/// Matches: implementation(platform("group:artifact:version"))
static RE_PLATFORM: OnceLock<Regex> = OnceLock::new();
/// Matches: implementation(group = "g", name = "a", version = "v")
static RE_NAMED: OnceLock<Regex> = OnceLock::new();
/// Matches: implementation(<anything>)
static RE_ANY_CALL: OnceLock<Regex> = OnceLock::new();

fn re_notation() -> &'static Regex {
    RE_NOTATION.get_or_init(|| Regex::new(r#"^(\w+)\(\s*"([^"]*)"\s*\)$"#).unwrap())
}

fn re_platform() -> &'static Regex {
    RE_PLATFORM.get_or_init(|| {
        Regex::new(r#"^(\w+)\(\s*(?:platform|enforcedPlatform)\(\s*"([^"]*)"\s*\)\s*\)$"#).unwrap()
    })
}

fn re_named() -> &'static Regex {
    RE_NAMED.get_or_init(|| {
        Regex::new(
            r#"^(\w+)\(\s*group\s*=\s*"([^"]+)"\s*,\s*name\s*=\s*"([^"]+)"(?:\s*,\s*version\s*=\s*"([^"]+)")?\s*\)$"#,
        )
        .unwrap()
    })
}

fn re_any_call() -> &'static Regex {
    RE_ANY_CALL.get_or_init(|| Regex::new(r"^(\w+)\((.*)\)$").unwrap())
}

const CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "testImplementation",
    "testRuntimeOnly",
    "annotationProcessor",
    "kapt",
    "classpath",
    "ksp",
    "testCompileOnly",
    "coreLibraryDesugaring",
    "lintChecks",
];

/// Variant-specific configurations (`debugImplementation`, `releaseApi`, ...).
const CONFIGURATION_SUFFIXES: &[&str] = &["Implementation", "Api", "CompileOnly", "RuntimeOnly"];

fn is_configuration(name: &str) -> bool {
    CONFIGURATIONS.contains(&name)
        || CONFIGURATION_SUFFIXES
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

pub fn parse_dependencies_block(block: &Block, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    for node in &block.children {
        match node {
            Node::Statement(statement) => parse_declaration(statement, raw)?,
            Node::Block(child) => {
                let header = Statement {
                    text: child.header.clone(),
                    line: child.line,
                };
                parse_declaration(&header, raw)?;
            }
        }
    }
    Ok(())
}

fn parse_declaration(statement: &Statement, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    let text = statement.text.as_str();
    let line = statement.line;

    let Some(call) = re_any_call().captures(text) else {
        debug!(line, text, "skipping dependencies statement");
        return Ok(());
    };
    let configuration = call.get(1).map_or("", |m| m.as_str());
    if !is_configuration(configuration) {
        debug!(line, configuration, "skipping non-configuration call");
        return Ok(());
    }

    let (notation, is_bom) = if let Some(caps) = re_platform().captures(text) {
        (unescape(caps.get(2).map_or("", |m| m.as_str())), true)
    } else if let Some(caps) = re_notation().captures(text) {
        (unescape(caps.get(2).map_or("", |m| m.as_str())), false)
    } else if let Some(caps) = re_named().captures(text) {
        let group = unescape(caps.get(2).map_or("", |m| m.as_str()));
        let name = unescape(caps.get(3).map_or("", |m| m.as_str()));
        let notation = match (group, name, caps.get(4).map(|m| unescape(m.as_str()))) {
            (Some(group), Some(name), Some(Some(version))) => {
                Some(format!("{group}:{name}:{version}"))
            }
            (Some(group), Some(name), None) => Some(format!("{group}:{name}")),
            _ => None,
        };
        (notation, false)
    } else {
        // project(":core"), libs.foo, files("x.jar"), fileTree(...)
        raw.skip(statement);
        return Ok(());
    };
    // "g:a:$version" is interpolated at build time
    let Some(notation) = notation else {
        raw.skip(statement);
        return Ok(());
    };

    let coordinate =
        Coordinate::parse(notation.trim()).ok_or_else(|| ParseError::MalformedDependency {
            notation: notation.clone(),
            line,
        })?;

    raw.dependencies.push(RawDependency {
        configuration: configuration.to_string(),
        coordinate,
        is_bom,
        line,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::is_configuration;
    use crate::error::ParseError;
    use crate::parser::parse_descriptor;
    use crate::warning::Warning;

    #[test]
    fn test_parse_bom_and_pins() {
        let content = r#"dependencies {
  // Import the Firebase BoM
  implementation(platform("com.google.firebase:firebase-bom:33.15.0"))
  implementation("com.google.firebase:firebase-analytics")
  implementation("androidx.multidex:multidex:2.0.1")
}
"#;
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.dependencies.len(), 3);

        let bom = &raw.dependencies[0];
        assert!(bom.is_bom);
        assert_eq!(bom.coordinate.name(), "com.google.firebase:firebase-bom");
        assert_eq!(bom.coordinate.version.as_deref(), Some("33.15.0"));
        assert_eq!(bom.configuration, "implementation");
        assert_eq!(bom.line, 3);

        assert!(raw.dependencies[1].coordinate.version.is_none());
        assert!(!raw.dependencies[1].is_bom);
        assert_eq!(
            raw.dependencies[2].coordinate.version.as_deref(),
            Some("2.0.1")
        );
    }

    #[test]
    fn test_named_arguments_and_variants() {
        let content = r#"dependencies {
    debugImplementation(group = "com.squareup.leakcanary", name = "leakcanary-android", version = "2.14")
    coreLibraryDesugaring("com.android.tools:desugar_jdk_libs:2.1.4")
    androidTestImplementation(enforcedPlatform("androidx.compose:compose-bom:2024.10.00"))
}
"#;
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.dependencies.len(), 3);
        assert_eq!(
            raw.dependencies[0].coordinate.to_string(),
            "com.squareup.leakcanary:leakcanary-android:2.14"
        );
        assert_eq!(raw.dependencies[0].configuration, "debugImplementation");
        assert_eq!(raw.dependencies[1].configuration, "coreLibraryDesugaring");
        assert!(raw.dependencies[2].is_bom);
    }

    #[test]
    fn test_dependency_with_lambda() {
        let content = r#"dependencies {
    implementation("com.example:lib:1.0") {
        exclude(group = "com.other")
    }
}
"#;
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.dependencies.len(), 1);
        assert_eq!(raw.dependencies[0].coordinate.name(), "com.example:lib");
    }

    #[test]
    fn test_project_dependency_is_skipped() {
        let content = "dependencies {\n    implementation(project(\":core\"))\n    implementation(libs.androidx.core)\n}\n";
        let raw = parse_descriptor(content).unwrap();
        assert!(raw.dependencies.is_empty());
        assert_eq!(raw.warnings.len(), 2);
        assert!(matches!(raw.warnings[0], Warning::SkippedDeclaration { line: 2, .. }));
    }

    #[test]
    fn test_string_template_version_is_skipped() {
        let content = r#"dependencies {
    implementation("org.jetbrains.kotlin:kotlin-stdlib:$kotlin_version")
    implementation(group = "com.example", name = "lib", version = "${libVersion}")
    implementation("com.example:escaped:1.0\$beta")
}
"#;
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.dependencies.len(), 1);
        assert_eq!(
            raw.dependencies[0].coordinate.version.as_deref(),
            Some("1.0$beta")
        );
        assert_eq!(raw.warnings.len(), 2);
        assert!(matches!(raw.warnings[0], Warning::SkippedDeclaration { line: 2, .. }));
        assert!(matches!(raw.warnings[1], Warning::SkippedDeclaration { line: 3, .. }));
    }

    #[test]
    fn test_malformed_notation() {
        let err = parse_descriptor("dependencies {\n    implementation(\"multidex\")\n}\n")
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedDependency {
                notation: "multidex".into(),
                line: 2
            }
        );
    }

    #[test]
    fn test_non_configuration_calls_are_ignored() {
        let content = "dependencies {\n    add(\"implementation\", \"a:b:1\")\n    constraints {\n    }\n}\n";
        let raw = parse_descriptor(content).unwrap();
        assert!(raw.dependencies.is_empty());
        assert!(raw.warnings.is_empty());
    }

    #[test]
    fn test_is_configuration() {
        assert!(is_configuration("implementation"));
        assert!(is_configuration("releaseImplementation"));
        assert!(is_configuration("stagingApi"));
        assert!(!is_configuration("Implementation"));
        assert!(!is_configuration("add"));
        assert!(!is_configuration("constraints"));
    }
}
