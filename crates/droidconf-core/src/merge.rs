//! Merging of BoM-managed versions with explicit dependency declarations.

use crate::types::{Coordinate, Dependency};
use crate::version::compare_versions;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// A platform BoM and the versions it manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformBom {
    pub coordinate: Coordinate,
    /// Managed artifacts, in catalog order. May be empty when the BoM contents
    /// are unknown.
    pub managed: Vec<Coordinate>,
}

impl PlatformBom {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            managed: Vec::new(),
        }
    }

    /// Whether `group_id` is the BoM's group or one of its sub-groups.
    pub fn covers_group(&self, group_id: &str) -> bool {
        let family = self.coordinate.group_id.as_str();
        group_id == family
            || group_id
                .strip_prefix(family)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Where the version of a merged dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionSource {
    /// Pinned in the descriptor.
    Explicit,
    /// Implied by the named BoM (`group:artifact:version`).
    Bom { bom: String },
    Unversioned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub source: VersionSource,
    /// Configuration of the first explicit declaration; `None` for entries
    /// that only come from a BoM.
    pub configuration: Option<String>,
}

impl fmt::Display for MergedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

/// Deduplicates `explicit` against the versions managed by `boms`, keyed by
/// `(groupId, artifactId)` and preserving order of first occurrence.
///
/// BoM entries come first (BoM order, then catalog order), followed by
/// explicit declarations. An explicit pin replaces a BoM version; an explicit
/// declaration without a version keeps it. Between two explicit pins the
/// higher version wins. Platform declarations in `explicit` are ignored.
pub fn merge_dependencies(boms: &[PlatformBom], explicit: &[Dependency]) -> Vec<MergedDependency> {
    let mut merged: Vec<MergedDependency> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for bom in boms {
        let bom_name = bom.coordinate.to_string();
        for managed in &bom.managed {
            let key = (managed.group_id.clone(), managed.artifact_id.clone());
            if index.contains_key(&key) {
                debug!(dependency = %managed, bom = %bom_name, "already managed by an earlier BoM");
                continue;
            }
            index.insert(key, merged.len());
            merged.push(MergedDependency {
                group_id: managed.group_id.clone(),
                artifact_id: managed.artifact_id.clone(),
                version: managed.version.clone(),
                source: VersionSource::Bom {
                    bom: bom_name.clone(),
                },
                configuration: None,
            });
        }
    }

    for dep in explicit.iter().filter(|d| !d.is_bom) {
        let coordinate = &dep.coordinate;
        let key = (coordinate.group_id.clone(), coordinate.artifact_id.clone());

        let Some(&idx) = index.get(&key) else {
            let (version, source) = match &coordinate.version {
                Some(version) => (Some(version.clone()), VersionSource::Explicit),
                None => match boms.iter().find(|b| b.covers_group(&coordinate.group_id)) {
                    Some(bom) => (
                        None,
                        VersionSource::Bom {
                            bom: bom.coordinate.to_string(),
                        },
                    ),
                    None => (None, VersionSource::Unversioned),
                },
            };
            index.insert(key, merged.len());
            merged.push(MergedDependency {
                group_id: coordinate.group_id.clone(),
                artifact_id: coordinate.artifact_id.clone(),
                version,
                source,
                configuration: Some(dep.configuration.clone()),
            });
            continue;
        };

        let entry = &mut merged[idx];
        if entry.configuration.is_none() {
            entry.configuration = Some(dep.configuration.clone());
        }
        let Some(version) = &coordinate.version else {
            continue;
        };

        let replace = match (&entry.source, entry.version.as_deref()) {
            (VersionSource::Explicit, Some(current)) => {
                compare_versions(version, current) == Ordering::Greater
            }
            (VersionSource::Bom { bom }, Some(current)) => {
                if compare_versions(version, current) == Ordering::Less {
                    warn!(
                        dependency = %coordinate.name(),
                        pinned = %version,
                        managed = %current,
                        bom = %bom,
                        "explicit pin downgrades a BoM-managed version"
                    );
                }
                true
            }
            _ => true,
        };
        if replace {
            entry.version = Some(version.clone());
            entry.source = VersionSource::Explicit;
        }
    }

    merged
}
