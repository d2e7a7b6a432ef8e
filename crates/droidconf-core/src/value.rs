//! Literal values on the right-hand side of a setting.

use crate::error::ParseError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static RE_REFERENCE: OnceLock<Regex> = OnceLock::new();
static RE_INTEGER: OnceLock<Regex> = OnceLock::new();

fn re_reference() -> &'static Regex {
    RE_REFERENCE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*(?:\(\))?$").unwrap()
    })
}

fn re_integer() -> &'static Regex {
    RE_INTEGER.get_or_init(|| Regex::new(r"^-?[0-9]+$").unwrap())
}

/// A declarative value: a literal or a dotted reference such as
/// `flutter.minSdkVersion` or `JavaVersion.VERSION_17`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Reference(String),
}

impl Value {
    /// Short description used in type-mismatch messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Str(s) => format!("string \"{s}\""),
            Self::Int(i) => format!("integer {i}"),
            Self::Bool(b) => format!("boolean {b}"),
            Self::Reference(r) => format!("reference `{r}`"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{}\"", escape(s)),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Reference(r) => f.write_str(r),
        }
    }
}

/// Parses the value text assigned to `key`.
///
/// # Errors
///
/// Returns [`ParseError::MissingValue`] for empty text and
/// [`ParseError::UnsupportedExpression`] for anything that is not a single
/// literal or reference (arithmetic, concatenation, lambdas).
pub fn parse_value(key: &str, text: &str, line: usize) -> Result<Value, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::MissingValue {
            key: key.to_string(),
            line,
        });
    }

    if text.starts_with('"') {
        return parse_string_literal(text)
            .map(Value::Str)
            .ok_or_else(|| unsupported(key, text, line));
    }

    match text {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if re_integer().is_match(text) {
        return text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| unsupported(key, text, line));
    }

    if re_reference().is_match(text) {
        return Ok(Value::Reference(text.to_string()));
    }

    Err(unsupported(key, text, line))
}

fn unsupported(key: &str, text: &str, line: usize) -> ParseError {
    ParseError::UnsupportedExpression {
        key: key.to_string(),
        text: text.to_string(),
        line,
    }
}

/// Decodes `text` if it is exactly one double-quoted string literal.
pub fn parse_string_literal(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    unescape(inner)
}

/// Decodes the body of a Kotlin string literal.
///
/// Returns `None` for invalid escapes, a stray `"`, or a string template
/// (`$name`, `${expr}`), whose value is only known at build time.
pub fn unescape(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other @ ('"' | '\\' | '$' | '\'') => out.push(other),
                _ => return None,
            },
            '$' if chars
                .peek()
                .is_some_and(|&next| next == '{' || next == '_' || next.is_alphabetic()) =>
            {
                return None;
            }
            '"' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Escapes `s` for use inside a Kotlin string literal.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
