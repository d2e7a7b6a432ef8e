//! Errors produced while reading and validating a build descriptor.
//!
//! Resolution fails in exactly two ways: the text is not well-formed
//! declarative syntax ([`ParseError`]) or it is well-formed but violates an
//! invariant ([`ValidationError`]). Both are wrapped by [`ResolveError`].

use thiserror::Error;

/// Exit codes reported by command-line front ends.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const PARSE_ERROR: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
}

/// Malformed descriptor text. Every variant carries the 1-based line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: block `{name}` is never closed")]
    UnterminatedBlock { name: String, line: usize },

    #[error("line {line}: unexpected `}}` with no open block")]
    UnexpectedClose { line: usize },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },

    #[error("line {line}: unbalanced parentheses")]
    UnbalancedParens { line: usize },

    #[error("line {line}: `{{` inside an argument list is not supported")]
    BraceInArguments { line: usize },

    #[error("line {line}: block has no name")]
    AnonymousBlock { line: usize },

    #[error("line {line}: `{key}` has no value")]
    MissingValue { key: String, line: usize },

    #[error("line {line}: unsupported expression for `{key}`: {text}")]
    UnsupportedExpression {
        key: String,
        text: String,
        line: usize,
    },

    #[error("line {line}: malformed dependency notation `{notation}`")]
    MalformedDependency { notation: String, line: usize },

    #[error("line {line}: malformed plugin declaration `{text}`")]
    MalformedPlugin { text: String, line: usize },
}

impl ParseError {
    /// Line the error was detected on.
    pub const fn line(&self) -> usize {
        match self {
            Self::UnterminatedBlock { line, .. }
            | Self::UnexpectedClose { line }
            | Self::UnterminatedString { line }
            | Self::UnterminatedComment { line }
            | Self::UnbalancedParens { line }
            | Self::BraceInArguments { line }
            | Self::AnonymousBlock { line }
            | Self::MissingValue { line, .. }
            | Self::UnsupportedExpression { line, .. }
            | Self::MalformedDependency { line, .. }
            | Self::MalformedPlugin { line, .. } => *line,
        }
    }
}

/// Well-formed descriptor that violates a consistency rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required key `{key}` is not set")]
    MissingKey { key: &'static str },

    #[error("`{key}` must not be empty")]
    EmptyValue { key: &'static str },

    #[error("`{key}` = \"{value}\" is not a reverse-domain identifier")]
    MalformedIdentifier { key: &'static str, value: String },

    #[error("`{key}` expects {expected}, found {found}")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("`{key}` refers to `{reference}`, which has no configured value")]
    UnresolvedReference {
        key: &'static str,
        reference: String,
    },

    #[error("`{key}` = {value} is invalid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("minSdk must be at least 1, got {min_sdk}")]
    MinSdkTooLow { min_sdk: u32 },

    #[error(
        "SDK bounds must satisfy minSdk <= targetSdk <= compileSdk \
         (minSdk = {min_sdk}, targetSdk = {target_sdk}, compileSdk = {compile_sdk})"
    )]
    SdkOrder {
        min_sdk: u32,
        target_sdk: u32,
        compile_sdk: u32,
    },

    #[error("unsupported Java version `{value}` for `{key}`")]
    UnsupportedJavaVersion { key: &'static str, value: String },

    #[error("Java compatibility levels disagree: {details}")]
    JavaCompatibilityMismatch { details: String },

    #[error("build type `{build_type}` enables isShrinkResources without isMinifyEnabled")]
    ShrinkWithoutMinify { build_type: String },

    #[error("BoM `{coordinate}` must declare a version")]
    BomWithoutVersion { coordinate: String },

    #[error("unknown plugin `{id}`")]
    UnknownPlugin { id: String },

    #[error("plugins `{first}` and `{second}` cannot be applied together")]
    ConflictingPlugins { first: String, second: String },

    #[error("plugin `{plugin}` requires one of: {required}")]
    MissingPluginRequirement { plugin: String, required: String },

    #[error("plugin `{plugin}` requires the `{bom}` BoM in dependencies")]
    MissingBom { plugin: String, bom: String },

    #[error("plugin `{plugin}` must be applied after `{must_follow}`")]
    PluginOrder { plugin: String, must_follow: String },

    #[error("isCoreLibraryDesugaringEnabled is set but no coreLibraryDesugaring dependency is declared")]
    DesugaringWithoutDependency,
}

/// Failure of a resolution pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ResolveError {
    /// Process exit code for this failure.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) => exit_codes::PARSE_ERROR,
            Self::Validation(_) => exit_codes::VALIDATION_ERROR,
        }
    }
}

/// Failure to load the resolver configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Syntax { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    Invalid { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
