//! Non-fatal findings reported alongside a successful resolution.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A key was assigned more than once; the last assignment wins.
    DuplicateSetting {
        key: &'static str,
        line: usize,
        previous_line: usize,
    },
    /// A plugin (possibly under an alias) was declared twice.
    DuplicatePlugin { id: String, line: usize },
    /// A declaration that cannot be resolved without evaluating the build,
    /// such as `project(":core")` or a version-catalog alias.
    SkippedDeclaration { text: String, line: usize },
    /// `minSdk` is high enough that multidex is native to the platform.
    NativeMultidex { min_sdk: u32 },
    /// The Flutter plugin is applied but there is no `flutter { }` block.
    MissingFlutterBlock,
    /// A dependency has no version and no declared BoM manages its group.
    UnmanagedVersion { dependency: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSetting {
                key,
                line,
                previous_line,
            } => write!(
                f,
                "line {line}: `{key}` overrides the value set on line {previous_line}"
            ),
            Self::DuplicatePlugin { id, line } => {
                write!(f, "line {line}: plugin `{id}` is already declared")
            }
            Self::SkippedDeclaration { text, line } => {
                write!(f, "line {line}: skipped `{text}` (not a literal declaration)")
            }
            Self::NativeMultidex { min_sdk } => write!(
                f,
                "minSdk {min_sdk} supports multidex natively; the multidex setup is redundant"
            ),
            Self::MissingFlutterBlock => {
                f.write_str("Flutter plugin applied without a `flutter { source = ... }` block")
            }
            Self::UnmanagedVersion { dependency } => {
                write!(f, "`{dependency}` has no version and no declared BoM manages it")
            }
        }
    }
}
