//! Domain types for a resolved Android build descriptor.

use serde::Serialize;
use std::fmt;

/// Java language / bytecode level shared by `compileOptions` and `jvmTarget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum JavaVersion {
    #[serde(rename = "1.8")]
    Java8,
    #[serde(rename = "11")]
    Java11,
    #[serde(rename = "17")]
    Java17,
    #[serde(rename = "21")]
    Java21,
}

impl JavaVersion {
    pub const ALL: [Self; 4] = [Self::Java8, Self::Java11, Self::Java17, Self::Java21];

    /// Accepts `JavaVersion.VERSION_17`, `JavaVersion.VERSION_1_8`,
    /// `JvmTarget.JVM_17`, `"17"`, `"1.8"` and the same with a trailing
    /// `.toString()`.
    pub fn from_notation(notation: &str) -> Option<Self> {
        let s = notation.trim();
        let s = s.strip_suffix(".toString()").unwrap_or(s);
        let s = s
            .strip_prefix("JavaVersion.VERSION_")
            .or_else(|| s.strip_prefix("JvmTarget.JVM_"))
            .unwrap_or(s);
        match s.replace('_', ".").as_str() {
            "1.8" | "8" => Some(Self::Java8),
            "11" => Some(Self::Java11),
            "17" => Some(Self::Java17),
            "21" => Some(Self::Java21),
            _ => None,
        }
    }

    /// `JavaVersion.VERSION_17`
    pub const fn gradle_constant(self) -> &'static str {
        match self {
            Self::Java8 => "JavaVersion.VERSION_1_8",
            Self::Java11 => "JavaVersion.VERSION_11",
            Self::Java17 => "JavaVersion.VERSION_17",
            Self::Java21 => "JavaVersion.VERSION_21",
        }
    }

    /// Value accepted by Kotlin's `jvmTarget`.
    pub const fn jvm_target(self) -> &'static str {
        match self {
            Self::Java8 => "1.8",
            Self::Java11 => "11",
            Self::Java17 => "17",
            Self::Java21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jvm_target())
    }
}

/// Maven coordinate `group:artifact[:version[:classifier]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl Coordinate {
    /// Parses dependency notation. Returns `None` when the notation does not
    /// have two to four non-empty `:`-separated parts.
    pub fn parse(notation: &str) -> Option<Self> {
        let parts: Vec<&str> = notation.split(':').collect();
        if !(2..=4).contains(&parts.len()) {
            return None;
        }
        if parts
            .iter()
            .any(|p| p.is_empty() || p.chars().any(char::is_whitespace))
        {
            return None;
        }
        let valid_name =
            |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || "._-".contains(c));
        if !valid_name(parts[0]) || !valid_name(parts[1]) {
            return None;
        }
        Some(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts.get(2).map(|v| (*v).to_string()),
            classifier: parts.get(3).map(|c| (*c).to_string()),
        })
    }

    /// Canonical identifier: `"{groupId}:{artifactId}"`
    pub fn name(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Deduplication key.
    pub fn key(&self) -> (&str, &str) {
        (&self.group_id, &self.artifact_id)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Gradle configuration (e.g. "implementation", "coreLibraryDesugaring")
    pub configuration: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Declared through `platform(...)` or `enforcedPlatform(...)`.
    pub is_bom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// Canonical plugin id (aliases such as `kotlin-android` are normalized).
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `false` for `apply false` declarations.
    pub apply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    pub name: String,
    pub minify: bool,
    pub shrink_resources: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkBounds {
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub compile_sdk: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlutterSource {
    /// Path to the shared Flutter project root, relative to the module.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Normalized, validated build configuration of one Android application module.
///
/// Constructed once per resolution pass and never mutated afterwards.
/// `version_code` is expected to increase between releases; that contract is
/// not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDescriptor {
    pub application_id: String,
    pub namespace: String,
    #[serde(flatten)]
    pub sdk: SdkBounds,
    pub version_code: u32,
    pub version_name: String,
    pub multi_dex_enabled: bool,
    pub ndk_version: Option<String>,
    pub java_compatibility: Option<JavaVersion>,
    pub core_library_desugaring: bool,
    pub plugins: Vec<Plugin>,
    pub build_types: Vec<BuildType>,
    pub dependencies: Vec<Dependency>,
    pub flutter: Option<FlutterSource>,
}

impl BuildDescriptor {
    /// Dependencies declared as platform BoMs, in declaration order.
    pub fn boms(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.is_bom)
    }

    /// Whether a plugin with canonical `id` is applied to this module.
    pub fn applies_plugin(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p.apply && p.id == id)
    }
}
