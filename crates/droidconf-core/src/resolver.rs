//! Typed conversion and validation of parsed descriptors.

use crate::config::ResolverConfig;
use crate::error::{Result, ValidationError};
use crate::merge::{MergedDependency, PlatformBom, VersionSource, merge_dependencies};
use crate::parser::{Key, RawDescriptor, Setting, parse_descriptor};
use crate::plugins::{self, FLUTTER};
use crate::types::{
    BuildDescriptor, BuildType, Dependency, FlutterSource, JavaVersion, Plugin, SdkBounds,
};
use crate::value::Value;
use crate::version::is_numeric_version;
use crate::warning::Warning;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Matches: com.example.bistro_shop
static RE_IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn re_identifier() -> &'static Regex {
    RE_IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(?:\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
    })
}

const MAX_VERSION_CODE: i64 = 2_100_000_000;
/// First API level with native multidex support.
const NATIVE_MULTIDEX_MIN_SDK: u32 = 21;
const MULTIDEX_ARTIFACTS: &[(&str, &str)] = &[
    ("androidx.multidex", "multidex"),
    ("com.android.support", "multidex"),
];
const DESUGARING_CONFIGURATION: &str = "coreLibraryDesugaring";
const FLUTTER_REFERENCE_PREFIX: &str = "flutter.";

/// A successful resolution together with its non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub descriptor: BuildDescriptor,
    pub warnings: Vec<Warning>,
}

/// Parses, validates and normalizes build descriptors.
///
/// # Examples
///
/// ```
/// use droidconf_core::ConfigResolver;
///
/// let resolver = ConfigResolver::default();
/// let err = resolver.resolve("android {").unwrap_err();
/// assert_eq!(err.exit_code(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    config: ResolverConfig,
}

impl ConfigResolver {
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Parses and validates descriptor text.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Parse`](crate::ResolveError::Parse) for malformed text,
    /// [`ResolveError::Validation`](crate::ResolveError::Validation) for the
    /// first violated invariant.
    pub fn resolve(&self, raw: &str) -> Result<BuildDescriptor> {
        self.resolve_report(raw).map(|resolution| resolution.descriptor)
    }

    /// Like [`resolve`](Self::resolve), also returning warnings.
    pub fn resolve_report(&self, raw: &str) -> Result<Resolution> {
        let mut parsed = parse_descriptor(raw)?;
        let mut warnings = std::mem::take(&mut parsed.warnings);

        let descriptor = Conversion {
            config: &self.config,
            raw: &parsed,
            warnings: &mut warnings,
        }
        .run()?;

        for merged in self.merged_dependencies(&descriptor) {
            if merged.source == VersionSource::Unversioned {
                warnings.push(Warning::UnmanagedVersion {
                    dependency: merged.to_string(),
                });
            }
        }

        for warning in &warnings {
            warn!(%warning, "descriptor warning");
        }
        info!(
            application_id = %descriptor.application_id,
            plugins = descriptor.plugins.len(),
            dependencies = descriptor.dependencies.len(),
            warnings = warnings.len(),
            "resolved build descriptor"
        );

        Ok(Resolution {
            descriptor,
            warnings,
        })
    }

    /// Merged dependency list of `descriptor`, using the configured BoM
    /// catalogs. A BoM without a configured catalog manages nothing but still
    /// claims versionless dependencies of its group family.
    pub fn merged_dependencies(&self, descriptor: &BuildDescriptor) -> Vec<MergedDependency> {
        let boms: Vec<PlatformBom> = descriptor
            .boms()
            .map(|bom| {
                self.config
                    .catalog_for(&bom.coordinate)
                    .cloned()
                    .unwrap_or_else(|| {
                        debug!(bom = %bom.coordinate, "no catalog configured for BoM");
                        PlatformBom::new(bom.coordinate.clone())
                    })
            })
            .collect();
        merge_dependencies(&boms, &descriptor.dependencies)
    }
}

/// Resolves a single descriptor. Each step returns the first violation.
struct Conversion<'a> {
    config: &'a ResolverConfig,
    raw: &'a RawDescriptor,
    warnings: &'a mut Vec<Warning>,
}

impl Conversion<'_> {
    fn run(mut self) -> std::result::Result<BuildDescriptor, ValidationError> {
        let application_id = self.identifier(Key::ApplicationId)?;
        let namespace = self.identifier(Key::Namespace)?;
        let sdk = self.sdk_bounds()?;
        let version_code = self.version_code()?;
        let version_name = self.required_string(Key::VersionName)?;
        if version_name.trim().is_empty() {
            return Err(ValidationError::EmptyValue {
                key: Key::VersionName.name(),
            });
        }
        let multi_dex_enabled = self.optional_bool(Key::MultiDexEnabled)?.unwrap_or(false);
        let ndk_version = self.ndk_version()?;
        let java_compatibility = self.java_compatibility()?;
        let build_types = self.build_types()?;
        let dependencies = self.dependencies()?;
        let plugins = self.plugins(&dependencies)?;

        let core_library_desugaring = self
            .optional_bool(Key::CoreLibraryDesugaring)?
            .unwrap_or(false);
        if core_library_desugaring
            && !dependencies
                .iter()
                .any(|d| d.configuration == DESUGARING_CONFIGURATION)
        {
            return Err(ValidationError::DesugaringWithoutDependency);
        }

        let flutter = self.flutter_source()?;
        if flutter.is_none() && plugins.iter().any(|p| p.apply && p.id == FLUTTER) {
            self.warnings.push(Warning::MissingFlutterBlock);
        }

        let uses_multidex = multi_dex_enabled
            || dependencies.iter().any(|d| {
                MULTIDEX_ARTIFACTS
                    .iter()
                    .any(|&(group, artifact)| d.coordinate.key() == (group, artifact))
            });
        if uses_multidex && sdk.min_sdk >= NATIVE_MULTIDEX_MIN_SDK {
            self.warnings.push(Warning::NativeMultidex {
                min_sdk: sdk.min_sdk,
            });
        }

        Ok(BuildDescriptor {
            application_id,
            namespace,
            sdk,
            version_code,
            version_name,
            multi_dex_enabled,
            ndk_version,
            java_compatibility,
            core_library_desugaring,
            plugins,
            build_types,
            dependencies,
            flutter,
        })
    }

    /// Value of `key` with `flutter.<name>` references substituted.
    fn value(&self, key: Key) -> std::result::Result<Option<Value>, ValidationError> {
        let Some(setting) = self.raw.get(key) else {
            return Ok(None);
        };
        resolve_reference(self.config, key.name(), &setting.value).map(Some)
    }

    fn required(&self, key: Key) -> std::result::Result<Value, ValidationError> {
        self.value(key)?
            .ok_or(ValidationError::MissingKey { key: key.name() })
    }

    fn required_string(&self, key: Key) -> std::result::Result<String, ValidationError> {
        expect_string(key, self.required(key)?)
    }

    fn optional_bool(&self, key: Key) -> std::result::Result<Option<bool>, ValidationError> {
        self.value(key)?
            .map(|value| expect_bool(key.name(), value))
            .transpose()
    }

    fn identifier(&self, key: Key) -> std::result::Result<String, ValidationError> {
        let value = self.required_string(key)?;
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyValue { key: key.name() });
        }
        if !re_identifier().is_match(&value) {
            return Err(ValidationError::MalformedIdentifier {
                key: key.name(),
                value,
            });
        }
        Ok(value)
    }

    fn api_level(&self, key: Key) -> std::result::Result<u32, ValidationError> {
        let level = expect_int(key, self.required(key)?)?;
        u32::try_from(level).map_err(|_| ValidationError::InvalidValue {
            key: key.name(),
            value: level.to_string(),
            reason: "must be a non-negative API level",
        })
    }

    fn sdk_bounds(&self) -> std::result::Result<SdkBounds, ValidationError> {
        let compile_sdk = self.api_level(Key::CompileSdk)?;
        let min_sdk = self.api_level(Key::MinSdk)?;
        let target_sdk = self.api_level(Key::TargetSdk)?;

        if min_sdk < 1 {
            return Err(ValidationError::MinSdkTooLow { min_sdk });
        }
        if min_sdk > target_sdk || target_sdk > compile_sdk {
            return Err(ValidationError::SdkOrder {
                min_sdk,
                target_sdk,
                compile_sdk,
            });
        }
        Ok(SdkBounds {
            min_sdk,
            target_sdk,
            compile_sdk,
        })
    }

    fn version_code(&self) -> std::result::Result<u32, ValidationError> {
        let key = Key::VersionCode;
        let code = expect_int(key, self.required(key)?)?;
        if !(1..=MAX_VERSION_CODE).contains(&code) {
            return Err(ValidationError::InvalidValue {
                key: key.name(),
                value: code.to_string(),
                reason: "must be between 1 and 2100000000",
            });
        }
        u32::try_from(code).map_err(|_| ValidationError::InvalidValue {
            key: key.name(),
            value: code.to_string(),
            reason: "must be between 1 and 2100000000",
        })
    }

    fn ndk_version(&self) -> std::result::Result<Option<String>, ValidationError> {
        let key = Key::NdkVersion;
        let Some(value) = self.value(key)? else {
            return Ok(None);
        };
        let version = expect_string(key, value)?;
        if !is_numeric_version(&version) {
            return Err(ValidationError::InvalidValue {
                key: key.name(),
                value: format!("\"{version}\""),
                reason: "must be dot-separated digits",
            });
        }
        Ok(Some(version))
    }

    fn java_version(&self, key: Key) -> std::result::Result<Option<JavaVersion>, ValidationError> {
        let Some(value) = self.value(key)? else {
            return Ok(None);
        };
        let notation = match value {
            Value::Str(s) | Value::Reference(s) => s,
            Value::Int(i) => i.to_string(),
            other @ Value::Bool(_) => {
                return Err(ValidationError::TypeMismatch {
                    key: key.name(),
                    expected: "a Java version",
                    found: other.describe(),
                });
            }
        };
        JavaVersion::from_notation(&notation)
            .map(Some)
            .ok_or_else(|| ValidationError::UnsupportedJavaVersion {
                key: key.name(),
                value: notation,
            })
    }

    fn java_compatibility(&self) -> std::result::Result<Option<JavaVersion>, ValidationError> {
        let source = self.java_version(Key::SourceCompatibility)?;
        let target = self.java_version(Key::TargetCompatibility)?;
        let jvm_target = self.java_version(Key::JvmTarget)?;

        let compile_options = match (source, target) {
            (Some(s), Some(t)) if s == t => Some(s),
            (Some(s), Some(t)) => {
                return Err(ValidationError::JavaCompatibilityMismatch {
                    details: format!("sourceCompatibility = {s}, targetCompatibility = {t}"),
                });
            }
            (Some(_), None) => {
                return Err(ValidationError::JavaCompatibilityMismatch {
                    details: "sourceCompatibility is set without targetCompatibility".into(),
                });
            }
            (None, Some(_)) => {
                return Err(ValidationError::JavaCompatibilityMismatch {
                    details: "targetCompatibility is set without sourceCompatibility".into(),
                });
            }
            (None, None) => None,
        };

        match (compile_options, jvm_target) {
            (Some(c), Some(j)) if c != j => Err(ValidationError::JavaCompatibilityMismatch {
                details: format!("compileOptions use {c}, jvmTarget = {j}"),
            }),
            (c, j) => Ok(c.or(j)),
        }
    }

    fn build_types(&self) -> std::result::Result<Vec<BuildType>, ValidationError> {
        let mut build_types = Vec::with_capacity(self.raw.build_types.len());
        for raw in &self.raw.build_types {
            let flag = |setting: &Option<Setting>, key: &'static str| {
                setting
                    .as_ref()
                    .map(|s| {
                        resolve_reference(self.config, key, &s.value)
                            .and_then(|v| expect_bool(key, v))
                    })
                    .transpose()
                    .map(|v| v.unwrap_or(false))
            };
            let minify = flag(&raw.minify, "isMinifyEnabled")?;
            let shrink_resources = flag(&raw.shrink_resources, "isShrinkResources")?;

            if shrink_resources && !minify {
                return Err(ValidationError::ShrinkWithoutMinify {
                    build_type: raw.name.clone(),
                });
            }
            build_types.push(BuildType {
                name: raw.name.clone(),
                minify,
                shrink_resources,
            });
        }
        Ok(build_types)
    }

    fn dependencies(&self) -> std::result::Result<Vec<Dependency>, ValidationError> {
        let mut dependencies = Vec::with_capacity(self.raw.dependencies.len());
        for raw in &self.raw.dependencies {
            if raw.is_bom && raw.coordinate.version.is_none() {
                return Err(ValidationError::BomWithoutVersion {
                    coordinate: raw.coordinate.to_string(),
                });
            }
            dependencies.push(Dependency {
                configuration: raw.configuration.clone(),
                coordinate: raw.coordinate.clone(),
                is_bom: raw.is_bom,
            });
        }
        Ok(dependencies)
    }

    fn plugins(
        &mut self,
        dependencies: &[Dependency],
    ) -> std::result::Result<Vec<Plugin>, ValidationError> {
        let mut declared: Vec<Plugin> = Vec::with_capacity(self.raw.plugins.len());
        for raw in &self.raw.plugins {
            let id = plugins::canonical_id(&raw.id);
            if declared.iter().any(|p| p.id == id) {
                self.warnings.push(Warning::DuplicatePlugin {
                    id: id.to_string(),
                    line: raw.line,
                });
                continue;
            }
            if raw.apply && plugins::lookup(id).is_none() && !self.config.allows_plugin(id) {
                return Err(ValidationError::UnknownPlugin { id: id.to_string() });
            }
            declared.push(Plugin {
                id: id.to_string(),
                version: raw.version.clone(),
                apply: raw.apply,
            });
        }

        let applied: Vec<&str> = declared
            .iter()
            .filter(|p| p.apply)
            .map(|p| p.id.as_str())
            .collect();
        let position = |id: &str| applied.iter().position(|a| *a == id);

        for (idx, id) in applied.iter().enumerate() {
            let Some(known) = plugins::lookup(id) else {
                continue;
            };

            if let Some(other) = known.conflicts_with.iter().find(|c| position(c).is_some()) {
                return Err(ValidationError::ConflictingPlugins {
                    first: (*id).to_string(),
                    second: (*other).to_string(),
                });
            }

            if !known.requires_any.is_empty()
                && !known.requires_any.iter().any(|r| position(r).is_some())
            {
                return Err(ValidationError::MissingPluginRequirement {
                    plugin: (*id).to_string(),
                    required: known.requires_any.join(", "),
                });
            }

            if let Some(bom) = known.requires_bom
                && !dependencies
                    .iter()
                    .any(|d| d.is_bom && d.coordinate.name() == bom)
            {
                return Err(ValidationError::MissingBom {
                    plugin: (*id).to_string(),
                    bom: bom.to_string(),
                });
            }

            if let Some(before) = known
                .apply_after
                .iter()
                .find(|b| position(b).is_some_and(|p| p > idx))
            {
                return Err(ValidationError::PluginOrder {
                    plugin: (*id).to_string(),
                    must_follow: (*before).to_string(),
                });
            }
        }

        Ok(declared)
    }

    fn flutter_source(&self) -> std::result::Result<Option<FlutterSource>, ValidationError> {
        if !self.raw.has_flutter_block {
            return Ok(None);
        }
        let source = self.required_string(Key::FlutterSource)?;
        let target = self
            .value(Key::FlutterTarget)?
            .map(|v| expect_string(Key::FlutterTarget, v))
            .transpose()?;
        Ok(Some(FlutterSource { source, target }))
    }
}

/// Substitutes `flutter.<name>` references from the configuration; other
/// values are returned unchanged.
fn resolve_reference(
    config: &ResolverConfig,
    key: &'static str,
    value: &Value,
) -> std::result::Result<Value, ValidationError> {
    let Value::Reference(reference) = value else {
        return Ok(value.clone());
    };
    let Some(name) = reference.strip_prefix(FLUTTER_REFERENCE_PREFIX) else {
        return Ok(value.clone());
    };
    config
        .flutter_property(name)
        .cloned()
        .ok_or_else(|| ValidationError::UnresolvedReference {
            key,
            reference: reference.clone(),
        })
}

fn expect_int(key: Key, value: Value) -> std::result::Result<i64, ValidationError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(ValidationError::TypeMismatch {
            key: key.name(),
            expected: "an integer",
            found: other.describe(),
        }),
    }
}

fn expect_string(key: Key, value: Value) -> std::result::Result<String, ValidationError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(ValidationError::TypeMismatch {
            key: key.name(),
            expected: "a string",
            found: other.describe(),
        }),
    }
}

fn expect_bool(key: &'static str, value: Value) -> std::result::Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(ValidationError::TypeMismatch {
            key,
            expected: "a boolean",
            found: other.describe(),
        }),
    }
}
