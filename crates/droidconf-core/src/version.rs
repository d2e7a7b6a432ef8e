//! Maven-style version comparison.

use std::cmp::Ordering;

/// Pre-release qualifiers: SNAPSHOT, alpha, beta, rc, M (milestone).
fn is_prerelease_qualifier(segment: &str) -> bool {
    let s = segment.to_ascii_uppercase();
    s.starts_with("SNAPSHOT")
        || s.starts_with("ALPHA")
        || s.starts_with("BETA")
        || s.starts_with("RC")
        || s.strip_prefix('M')
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// Compares two Maven version strings.
///
/// Splits on `.` and `-`, compares numeric segments numerically,
/// string segments case-insensitively. A missing segment counts as `0`
/// against a number, and a pre-release qualifier sorts before a missing segment
/// (`1.0-rc1 < 1.0`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = split_version(a);
    let b_parts = split_version(b);

    let max_len = a_parts.len().max(b_parts.len());
    for i in 0..max_len {
        let ord = match (a_parts.get(i), b_parts.get(i)) {
            (Some(ap), Some(bp)) => compare_segment(ap, bp),
            (Some(ap), None) => compare_to_missing(ap),
            (None, Some(bp)) => compare_to_missing(bp).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// Whether `version` is dot-separated digits only (e.g. an NDK revision).
pub fn is_numeric_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn split_version(v: &str) -> Vec<&str> {
    v.split(['.', '-']).filter(|s| !s.is_empty()).collect()
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(an), Ok(bn)) => an.cmp(&bn),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        _ => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
    }
}

fn compare_to_missing(segment: &str) -> Ordering {
    match segment.parse::<u64>() {
        Ok(0) => Ordering::Equal,
        Ok(_) => Ordering::Greater,
        Err(_) if is_prerelease_qualifier(segment) => Ordering::Less,
        Err(_) => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_qualifiers() {
        for segment in ["SNAPSHOT", "alpha01", "beta", "rc1", "M10"] {
            assert!(is_prerelease_qualifier(segment), "{segment}");
        }
        for segment in ["jre", "RELEASE", "M", "Mx"] {
            assert!(!is_prerelease_qualifier(segment), "{segment}");
        }
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.1", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("10.0.0", "9.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("33.15.0", "33.9.0"), Ordering::Greater);
    }

    #[test]
    fn test_missing_segments() {
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0-rc1", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0", "1.0.0-rc1"), Ordering::Greater);
    }

    #[test]
    fn test_numeric_version() {
        assert!(is_numeric_version("27.0.12077973"));
        assert!(is_numeric_version("26"));
        assert!(!is_numeric_version("27.0.x"));
        assert!(!is_numeric_version("27..1"));
        assert!(!is_numeric_version(""));
    }
}
