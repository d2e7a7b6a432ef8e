//! Interpreter from the scanned block tree to raw, untyped settings.
//!
//! Recognized blocks are routed to their own module; everything else is
//! skipped. Typed conversion and invariants live in [`crate::resolver`].

pub mod android;
pub mod dependencies;
pub mod plugins;

use crate::error::ParseError;
use crate::syntax::{self, Block, Node, Statement};
use crate::types::Coordinate;
use crate::value::{Value, parse_value};
use crate::warning::Warning;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Matches: key = value (value may be empty, reported as missing)
static RE_ASSIGNMENT: OnceLock<Regex> = OnceLock::new();
/// Matches: key.set(value)
static RE_SETTER: OnceLock<Regex> = OnceLock::new();
/// Matches: name(args)
static RE_CALL: OnceLock<Regex> = OnceLock::new();

fn re_assignment() -> &'static Regex {
    RE_ASSIGNMENT.get_or_init(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*=(?:[^=](.*))?$").unwrap())
}

fn re_setter() -> &'static Regex {
    RE_SETTER.get_or_init(|| Regex::new(r"^([A-Za-z_]\w*)\.set\((.*)\)$").unwrap())
}

fn re_call() -> &'static Regex {
    RE_CALL.get_or_init(|| Regex::new(r"^([A-Za-z_]\w*)\s*\((.*)\)$").unwrap())
}

/// A recognized setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    ApplicationId,
    Namespace,
    MinSdk,
    TargetSdk,
    CompileSdk,
    VersionCode,
    VersionName,
    MultiDexEnabled,
    NdkVersion,
    SourceCompatibility,
    TargetCompatibility,
    JvmTarget,
    CoreLibraryDesugaring,
    FlutterSource,
    FlutterTarget,
}

impl Key {
    /// Name as written in the descriptor.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApplicationId => "applicationId",
            Self::Namespace => "namespace",
            Self::MinSdk => "minSdk",
            Self::TargetSdk => "targetSdk",
            Self::CompileSdk => "compileSdk",
            Self::VersionCode => "versionCode",
            Self::VersionName => "versionName",
            Self::MultiDexEnabled => "multiDexEnabled",
            Self::NdkVersion => "ndkVersion",
            Self::SourceCompatibility => "sourceCompatibility",
            Self::TargetCompatibility => "targetCompatibility",
            Self::JvmTarget => "jvmTarget",
            Self::CoreLibraryDesugaring => "isCoreLibraryDesugaringEnabled",
            Self::FlutterSource => "flutter.source",
            Self::FlutterTarget => "flutter.target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub value: Value,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlugin {
    /// Id as written, before alias normalization.
    pub id: String,
    pub version: Option<String>,
    pub apply: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    pub configuration: String,
    pub coordinate: Coordinate,
    pub is_bom: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuildType {
    pub name: String,
    pub line: usize,
    pub minify: Option<Setting>,
    pub shrink_resources: Option<Setting>,
}

/// Everything recognized in a descriptor, still untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDescriptor {
    pub plugins: Vec<RawPlugin>,
    pub dependencies: Vec<RawDependency>,
    pub settings: BTreeMap<Key, Setting>,
    pub build_types: Vec<RawBuildType>,
    pub has_flutter_block: bool,
    pub warnings: Vec<Warning>,
}

impl RawDescriptor {
    pub fn get(&self, key: Key) -> Option<&Setting> {
        self.settings.get(&key)
    }

    /// Records `key`; a later assignment replaces an earlier one.
    pub(crate) fn set(&mut self, key: Key, setting: Setting) {
        let line = setting.line;
        if let Some(previous) = self.settings.insert(key, setting) {
            self.warnings.push(Warning::DuplicateSetting {
                key: key.name(),
                line,
                previous_line: previous.line,
            });
        }
    }

    pub(crate) fn build_type_mut(&mut self, name: &str, line: usize) -> &mut RawBuildType {
        let idx = match self.build_types.iter().position(|b| b.name == name) {
            Some(idx) => idx,
            None => {
                self.build_types.push(RawBuildType {
                    name: name.to_string(),
                    line,
                    minify: None,
                    shrink_resources: None,
                });
                self.build_types.len() - 1
            }
        };
        &mut self.build_types[idx]
    }

    pub(crate) fn skip(&mut self, statement: &Statement) {
        self.warnings.push(Warning::SkippedDeclaration {
            text: statement.text.clone(),
            line: statement.line,
        });
    }
}

/// Shape of a single statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Form<'a> {
    Assign { name: &'a str, value: &'a str },
    Call { name: &'a str, args: &'a str },
    Other,
}

pub(crate) fn classify(text: &str) -> Form<'_> {
    if let Some(caps) = re_setter().captures(text) {
        return Form::Assign {
            name: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = re_assignment().captures(text) {
        return Form::Assign {
            name: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(0).map_or("", |m| {
                let whole = m.as_str();
                whole.split_once('=').map_or("", |(_, v)| v)
            }),
        };
    }
    if let Some(caps) = re_call().captures(text) {
        return Form::Call {
            name: caps.get(1).map_or("", |m| m.as_str()),
            args: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    Form::Other
}

/// Applies `statement` when it assigns one of `keys`, either as
/// `key = value`, `key.set(value)` or the legacy `key(value)` call form.
///
/// Returns `Ok(false)` when the statement names none of `keys`.
pub(crate) fn apply_setting(
    raw: &mut RawDescriptor,
    keys: &[(&str, Key)],
    statement: &Statement,
) -> Result<bool, ParseError> {
    let (name, value_text) = match classify(&statement.text) {
        Form::Assign { name, value } | Form::Call { name, args: value } => (name, value),
        Form::Other => return Ok(false),
    };
    let Some(&(_, key)) = keys.iter().find(|(n, _)| *n == name) else {
        return Ok(false);
    };
    let value = parse_value(name, value_text, statement.line)?;
    raw.set(
        key,
        Setting {
            value,
            line: statement.line,
        },
    );
    Ok(true)
}

/// Applies every statement of `block` that names one of `keys`; the rest is skipped.
pub(crate) fn apply_settings(
    raw: &mut RawDescriptor,
    keys: &[(&str, Key)],
    block: &Block,
) -> Result<(), ParseError> {
    for statement in block.statements() {
        if !apply_setting(raw, keys, statement)? {
            debug!(
                block = %block.header,
                line = statement.line,
                text = %statement.text,
                "skipping unrecognized statement"
            );
        }
    }
    Ok(())
}

const FLUTTER_KEYS: &[(&str, Key)] = &[
    ("source", Key::FlutterSource),
    ("target", Key::FlutterTarget),
];

/// Parses descriptor text into raw settings.
///
/// # Errors
///
/// Returns [`ParseError`] when the text is not well-formed declarative syntax.
pub fn parse_descriptor(content: &str) -> Result<RawDescriptor, ParseError> {
    let root = syntax::parse_tree(content)?;
    let mut raw = RawDescriptor::default();

    for node in &root.children {
        match node {
            Node::Block(block) => match block.header.as_str() {
                "plugins" => plugins::parse_plugins_block(block, &mut raw)?,
                "dependencies" => dependencies::parse_dependencies_block(block, &mut raw)?,
                "android" => android::parse_android_block(block, &mut raw)?,
                "kotlin" => android::parse_kotlin_block(block, &mut raw)?,
                "flutter" => {
                    raw.has_flutter_block = true;
                    apply_settings(&mut raw, FLUTTER_KEYS, block)?;
                }
                other => debug!(block = other, line = block.line, "skipping unrecognized block"),
            },
            Node::Statement(statement) => debug!(
                line = statement.line,
                text = %statement.text,
                "skipping top-level statement"
            ),
        }
    }

    debug!(
        plugins = raw.plugins.len(),
        dependencies = raw.dependencies.len(),
        settings = raw.settings.len(),
        "parsed descriptor"
    );
    Ok(raw)
}
