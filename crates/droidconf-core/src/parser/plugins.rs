//! `plugins { }` block.

use crate::error::ParseError;
use crate::parser::{RawDescriptor, RawPlugin};
use crate::syntax::{Block, Node};
use crate::value::unescape;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Matches: id("x"), kotlin("android"), `java-library`, application
/// each optionally followed by a version and an apply flag, in either
/// infix (`version "1.0" apply false`) or call (`.version("1.0").apply(false)`) style.
static RE_PLUGIN: OnceLock<Regex> = OnceLock::new();
/// Matches: alias(libs.plugins.android.application)
static RE_ALIAS: OnceLock<Regex> = OnceLock::new();

fn re_plugin() -> &'static Regex {
    RE_PLUGIN.get_or_init(|| {
        Regex::new(concat!(
            r#"^(?:id\(\s*"(?P<id>[^"\s]+)"\s*\)|kotlin\(\s*"(?P<kotlin>[^"\s]+)"\s*\)"#,
            r#"|`(?P<tick>[^`\s]+)`|(?P<bare>[A-Za-z]\w*))"#,
            r#"(?:\s+version\s+"(?P<v1>[^"]+)"|\.version\(\s*"(?P<v2>[^"]+)"\s*\))?"#,
            r#"(?:\s+apply\s+(?P<a1>true|false)|\.apply\(\s*(?P<a2>true|false)\s*\))?$"#,
        ))
        .unwrap()
    })
}

fn re_alias() -> &'static Regex {
    RE_ALIAS.get_or_init(|| Regex::new(r"^alias\(\s*[\w.]+\s*\)").unwrap())
}

/// Kotlin DSL `kotlin("x")` is shorthand for `id("org.jetbrains.kotlin.x")`.
const KOTLIN_PLUGIN_PREFIX: &str = "org.jetbrains.kotlin.";

pub fn parse_plugins_block(block: &Block, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    for node in &block.children {
        let statement = match node {
            Node::Statement(s) => s,
            Node::Block(b) => {
                debug!(header = %b.header, line = b.line, "skipping block inside plugins");
                continue;
            }
        };
        let text = statement.text.as_str();

        if re_alias().is_match(text) {
            raw.skip(statement);
            continue;
        }

        let Some(caps) = re_plugin().captures(text) else {
            return Err(ParseError::MalformedPlugin {
                text: text.to_string(),
                line: statement.line,
            });
        };

        let id = if let Some(m) = caps.name("id") {
            unescape(m.as_str())
        } else if let Some(m) = caps.name("kotlin") {
            unescape(m.as_str()).map(|name| format!("{KOTLIN_PLUGIN_PREFIX}{name}"))
        } else if let Some(m) = caps.name("tick").or_else(|| caps.name("bare")) {
            Some(m.as_str().to_string())
        } else {
            return Err(ParseError::MalformedPlugin {
                text: text.to_string(),
                line: statement.line,
            });
        };
        let version = caps
            .name("v1")
            .or_else(|| caps.name("v2"))
            .map(|m| unescape(m.as_str()));

        // id("x") version "$agpVersion"
        let (Some(id), Some(version)) = (id, version.map_or(Some(None), |v| v.map(Some))) else {
            raw.skip(statement);
            continue;
        };
        let apply = caps
            .name("a1")
            .or_else(|| caps.name("a2"))
            .is_none_or(|m| m.as_str() == "true");

        raw.plugins.push(RawPlugin {
            id,
            version,
            apply,
            line: statement.line,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::ParseError;
    use crate::parser::parse_descriptor;
    use crate::warning::Warning;

    #[test]
    fn test_parse_plugins_in_order() {
        let content = r#"plugins {
    id("com.android.application")
    id("kotlin-android")
    // The Flutter Gradle Plugin must be applied after the Android and Kotlin Gradle plugins.
    id("dev.flutter.flutter-gradle-plugin")
    kotlin("android")
    id("com.google.gms.google-services")
}
"#;
        let raw = parse_descriptor(content).unwrap();
        let ids: Vec<_> = raw.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "com.android.application",
                "kotlin-android",
                "dev.flutter.flutter-gradle-plugin",
                "org.jetbrains.kotlin.android",
                "com.google.gms.google-services",
            ]
        );
        assert!(raw.plugins.iter().all(|p| p.apply && p.version.is_none()));
        assert_eq!(raw.plugins[3].line, 6);
    }

    #[test]
    fn test_version_and_apply() {
        let content = r#"plugins {
    id("com.google.gms.google-services") version "4.4.2" apply false
    id("com.google.firebase.crashlytics").version("3.0.2").apply(false)
    `java-library`
    application
}
"#;
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.plugins[0].version.as_deref(), Some("4.4.2"));
        assert!(!raw.plugins[0].apply);
        assert_eq!(raw.plugins[1].version.as_deref(), Some("3.0.2"));
        assert!(!raw.plugins[1].apply);
        assert_eq!(raw.plugins[2].id, "java-library");
        assert_eq!(raw.plugins[3].id, "application");
        assert!(raw.plugins[3].apply);
    }

    #[test]
    fn test_alias_is_skipped_with_warning() {
        let raw = parse_descriptor("plugins {\n    alias(libs.plugins.android.application)\n}\n")
            .unwrap();
        assert!(raw.plugins.is_empty());
        assert!(matches!(
            raw.warnings.as_slice(),
            [Warning::SkippedDeclaration { line: 2, .. }]
        ));
    }

    #[test]
    fn test_templated_plugin_version_is_skipped() {
        let content = "plugins {\n    id(\"com.android.application\") version \"$agpVersion\" apply false\n    id(\"com.example.tool\") version \"2\\$1\"\n}\n";
        let raw = parse_descriptor(content).unwrap();
        assert_eq!(raw.plugins.len(), 1);
        assert_eq!(raw.plugins[0].id, "com.example.tool");
        assert_eq!(raw.plugins[0].version.as_deref(), Some("2$1"));
        assert!(matches!(raw.warnings[..], [Warning::SkippedDeclaration { line: 2, .. }]));
    }

    #[test]
    fn test_malformed_plugin() {
        let err = parse_descriptor("plugins {\n    id(\"a\") version\n}\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedPlugin {
                text: "id(\"a\") version".into(),
                line: 2
            }
        );
    }
}
