//! `android { }` and top-level `kotlin { }` blocks.

use crate::error::ParseError;
use crate::parser::{Form, Key, RawDescriptor, Setting, apply_settings, classify};
use crate::syntax::{Block, Node};
use crate::value::parse_value;
use crate::warning::Warning;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Matches: getByName("release"), named("release"), create("staging"), ...
static RE_BUILD_TYPE_CALL: OnceLock<Regex> = OnceLock::new();
/// Matches: release
static RE_BUILD_TYPE_BARE: OnceLock<Regex> = OnceLock::new();

fn re_build_type_call() -> &'static Regex {
    RE_BUILD_TYPE_CALL.get_or_init(|| {
        Regex::new(r#"^(?:getByName|named|create|maybeCreate|register)\(\s*"([^"]+)"\s*\)$"#)
            .unwrap()
    })
}

fn re_build_type_bare() -> &'static Regex {
    RE_BUILD_TYPE_BARE.get_or_init(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap())
}

const ANDROID_KEYS: &[(&str, Key)] = &[
    ("namespace", Key::Namespace),
    ("compileSdk", Key::CompileSdk),
    ("compileSdkVersion", Key::CompileSdk),
    ("ndkVersion", Key::NdkVersion),
];

const DEFAULT_CONFIG_KEYS: &[(&str, Key)] = &[
    ("applicationId", Key::ApplicationId),
    ("minSdk", Key::MinSdk),
    ("minSdkVersion", Key::MinSdk),
    ("targetSdk", Key::TargetSdk),
    ("targetSdkVersion", Key::TargetSdk),
    ("versionCode", Key::VersionCode),
    ("versionName", Key::VersionName),
    ("multiDexEnabled", Key::MultiDexEnabled),
];

const COMPILE_OPTIONS_KEYS: &[(&str, Key)] = &[
    ("sourceCompatibility", Key::SourceCompatibility),
    ("targetCompatibility", Key::TargetCompatibility),
    ("isCoreLibraryDesugaringEnabled", Key::CoreLibraryDesugaring),
];

const KOTLIN_OPTIONS_KEYS: &[(&str, Key)] = &[("jvmTarget", Key::JvmTarget)];

/// Container names that configure every build type rather than naming one.
const BUILD_TYPE_CONTAINER_OPS: &[&str] = &["all", "configureEach", "forEach", "whenObjectAdded"];

pub fn parse_android_block(block: &Block, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    apply_settings(raw, ANDROID_KEYS, block)?;

    for node in &block.children {
        let Node::Block(child) = node else {
            continue;
        };
        match child.header.as_str() {
            "defaultConfig" => apply_settings(raw, DEFAULT_CONFIG_KEYS, child)?,
            "compileOptions" => apply_settings(raw, COMPILE_OPTIONS_KEYS, child)?,
            "kotlinOptions" => apply_settings(raw, KOTLIN_OPTIONS_KEYS, child)?,
            "buildTypes" => parse_build_types(child, raw)?,
            other => debug!(block = other, line = child.line, "skipping android sub-block"),
        }
    }
    Ok(())
}

/// `kotlin { compilerOptions { jvmTarget.set(JvmTarget.JVM_17) } }`
pub fn parse_kotlin_block(block: &Block, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    for options in block.blocks_named("compilerOptions") {
        apply_settings(raw, KOTLIN_OPTIONS_KEYS, options)?;
    }
    Ok(())
}

fn build_type_name(header: &str) -> Option<&str> {
    if let Some(caps) = re_build_type_call().captures(header) {
        return caps.get(1).map(|m| m.as_str());
    }
    if re_build_type_bare().is_match(header) && !BUILD_TYPE_CONTAINER_OPS.contains(&header) {
        return Some(header);
    }
    None
}

fn parse_build_types(block: &Block, raw: &mut RawDescriptor) -> Result<(), ParseError> {
    for node in &block.children {
        let Node::Block(child) = node else {
            continue;
        };
        let Some(name) = build_type_name(&child.header) else {
            debug!(header = %child.header, line = child.line, "skipping buildTypes entry");
            continue;
        };

        for statement in child.statements() {
            let Form::Assign { name: key, value } = classify(&statement.text) else {
                continue;
            };
            let key: &'static str = match key {
                "isMinifyEnabled" => "isMinifyEnabled",
                "isShrinkResources" => "isShrinkResources",
                _ => {
                    debug!(build_type = name, key, "skipping build type setting");
                    continue;
                }
            };
            let setting = Setting {
                value: parse_value(key, value, statement.line)?,
                line: statement.line,
            };
            let build_type = raw.build_type_mut(name, child.line);
            let slot = if key == "isMinifyEnabled" {
                &mut build_type.minify
            } else {
                &mut build_type.shrink_resources
            };
            if let Some(previous) = slot.replace(setting) {
                raw.warnings.push(Warning::DuplicateSetting {
                    key,
                    line: statement.line,
                    previous_line: previous.line,
                });
            }
        }
        // Declared without settings still counts as a build type.
        raw.build_type_mut(name, child.line);
    }
    Ok(())
}
