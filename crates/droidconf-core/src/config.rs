//! Resolver configuration (`droidconf.toml`).
//!
//! ```toml
//! [plugins]
//! allowed = ["com.example.custom"]
//!
//! [flutter]
//! minSdkVersion = 21
//!
//! [boms."com.google.firebase:firebase-bom:33.15.0"]
//! "com.google.firebase:firebase-analytics" = "22.4.0"
//! ```

use crate::error::ConfigError;
use crate::merge::PlatformBom;
use crate::types::Coordinate;
use crate::value::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, TableLike};
use tracing::{debug, warn};

/// Searched in order, relative to the working directory.
pub const CONFIG_CANDIDATES: &[&str] = &[
    "droidconf.toml",
    ".droidconf.toml",
    ".config/droidconf.toml",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Plugin ids accepted in addition to the built-in registry.
    pub allowed_plugins: Vec<String>,
    /// Values for `flutter.<name>` references.
    pub flutter: BTreeMap<String, Value>,
    pub boms: Vec<PlatformBom>,
}

impl ResolverConfig {
    /// Loads the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&content, &display)
    }

    /// Loads `explicit` if given, else the first of [`CONFIG_CANDIDATES`] found
    /// under `dir`, else defaults. Returns the path that was used.
    pub fn discover(
        explicit: Option<&Path>,
        dir: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = explicit.map(Path::to_path_buf).or_else(|| {
            CONFIG_CANDIDATES
                .iter()
                .map(|candidate| dir.join(candidate))
                .find(|candidate| candidate.is_file())
        });

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading resolver config");
                Ok((Self::load(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Parses configuration text; `path` is only used in error messages.
    pub fn from_toml(content: &str, path: &str) -> Result<Self, ConfigError> {
        let doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| ConfigError::Syntax {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_string(),
            message,
        };

        let mut config = Self::default();
        for (section, item) in doc.iter() {
            match section {
                "plugins" => config.allowed_plugins = parse_plugins(item).map_err(invalid)?,
                "flutter" => config.flutter = parse_flutter(item).map_err(invalid)?,
                "boms" => config.boms = parse_boms(item).map_err(invalid)?,
                other => warn!(path, section = other, "ignoring unknown config section"),
            }
        }
        Ok(config)
    }

    pub fn flutter_property(&self, name: &str) -> Option<&Value> {
        self.flutter.get(name)
    }

    pub fn allows_plugin(&self, id: &str) -> bool {
        self.allowed_plugins.iter().any(|p| p == id)
    }

    /// Catalog for the exact BoM release `bom` (group, artifact and version).
    pub fn catalog_for(&self, bom: &Coordinate) -> Option<&PlatformBom> {
        self.boms
            .iter()
            .find(|c| c.coordinate.key() == bom.key() && c.coordinate.version == bom.version)
    }
}

fn as_table<'a>(item: &'a Item, section: &str) -> Result<&'a dyn TableLike, String> {
    item.as_table_like()
        .ok_or_else(|| format!("`{section}` must be a table"))
}

fn parse_plugins(item: &Item) -> Result<Vec<String>, String> {
    let table = as_table(item, "plugins")?;
    let mut allowed = Vec::new();
    for (key, value) in table.iter() {
        if key != "allowed" {
            return Err(format!("unknown key `plugins.{key}`"));
        }
        let array = value
            .as_array()
            .ok_or_else(|| "`plugins.allowed` must be an array of strings".to_string())?;
        for entry in array.iter() {
            let id = entry
                .as_str()
                .ok_or_else(|| "`plugins.allowed` must be an array of strings".to_string())?;
            allowed.push(id.to_string());
        }
    }
    Ok(allowed)
}

fn parse_flutter(item: &Item) -> Result<BTreeMap<String, Value>, String> {
    let table = as_table(item, "flutter")?;
    let mut properties = BTreeMap::new();
    for (key, value) in table.iter() {
        let parsed = if let Some(i) = value.as_integer() {
            Value::Int(i)
        } else if let Some(s) = value.as_str() {
            Value::Str(s.to_string())
        } else if let Some(b) = value.as_bool() {
            Value::Bool(b)
        } else {
            return Err(format!(
                "`flutter.{key}` must be an integer, string or boolean"
            ));
        };
        properties.insert(key.to_string(), parsed);
    }
    Ok(properties)
}

fn parse_boms(item: &Item) -> Result<Vec<PlatformBom>, String> {
    let table = as_table(item, "boms")?;
    let mut catalogs = Vec::new();
    for (notation, entries) in table.iter() {
        let bom = Coordinate::parse(notation)
            .filter(|c| c.version.is_some())
            .ok_or_else(|| format!("BoM key `{notation}` must be `group:artifact:version`"))?;
        let entries = entries
            .as_table_like()
            .ok_or_else(|| format!("`boms.\"{notation}\"` must be a table"))?;

        let mut managed = Vec::new();
        for (name, version) in entries.iter() {
            let version = version
                .as_str()
                .ok_or_else(|| format!("version of `{name}` in `{notation}` must be a string"))?;
            let coordinate = Coordinate::parse(&format!("{name}:{version}"))
                .filter(|c| c.classifier.is_none())
                .ok_or_else(|| format!("`{name}` in `{notation}` must be `group:artifact`"))?;
            managed.push(coordinate);
        }
        catalogs.push(PlatformBom {
            coordinate: bom,
            managed,
        });
    }
    Ok(catalogs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[plugins]
allowed = ["com.example.custom"]

[flutter]
compileSdkVersion = 35
minSdkVersion = 21
versionName = "1.0.0"

[boms."com.google.firebase:firebase-bom:33.15.0"]
"com.google.firebase:firebase-analytics" = "22.4.0"
"com.google.firebase:firebase-auth" = "23.2.1"
"#;

    #[test]
    fn test_parse_sample() {
        let config = ResolverConfig::from_toml(SAMPLE, "droidconf.toml").unwrap();
        assert!(config.allows_plugin("com.example.custom"));
        assert!(!config.allows_plugin("com.example.other"));
        assert_eq!(
            config.flutter_property("minSdkVersion"),
            Some(&Value::Int(21))
        );
        assert_eq!(
            config.flutter_property("versionName"),
            Some(&Value::Str("1.0.0".into()))
        );

        assert_eq!(config.boms.len(), 1);
        let catalog = &config.boms[0];
        assert_eq!(catalog.coordinate.to_string(), "com.google.firebase:firebase-bom:33.15.0");
        assert_eq!(catalog.managed.len(), 2);
        assert_eq!(
            catalog.managed[0].to_string(),
            "com.google.firebase:firebase-analytics:22.4.0"
        );
    }

    #[test]
    fn test_catalog_lookup_matches_version() {
        let config = ResolverConfig::from_toml(SAMPLE, "droidconf.toml").unwrap();
        let same = Coordinate::parse("com.google.firebase:firebase-bom:33.15.0").unwrap();
        let other = Coordinate::parse("com.google.firebase:firebase-bom:32.0.0").unwrap();
        assert!(config.catalog_for(&same).is_some());
        assert!(config.catalog_for(&other).is_none());
    }

    #[test]
    fn test_syntax_error() {
        let err = ResolverConfig::from_toml("[plugins\n", "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { .. }));
    }

    #[test]
    fn test_invalid_values() {
        for content in [
            "plugins = 3\n",
            "[plugins]\nallowed = \"x\"\n",
            "[plugins]\nother = []\n",
            "[flutter]\nminSdkVersion = [1]\n",
            "[boms.\"no-version:here\"]\n",
            "[boms.\"a:b:1\"]\n\"c\" = \"1.0\"\n",
        ] {
            let err = ResolverConfig::from_toml(content, "x.toml").unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { .. }),
                "expected invalid for {content:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let config = ResolverConfig::from_toml("[extra]\nkey = 1\n", "x.toml").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_discover_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let (config, path) = ResolverConfig::discover(None, dir.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_discover_finds_candidate() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".config")).unwrap();
        std::fs::write(
            dir.path().join(".config/droidconf.toml"),
            "[flutter]\nminSdkVersion = 24\n",
        )
        .unwrap();

        let (config, path) = ResolverConfig::discover(None, dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join(".config/droidconf.toml")));
        assert_eq!(config.flutter_property("minSdkVersion"), Some(&Value::Int(24)));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ResolverConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
