//! Registry of Gradle plugins with their aliases, requirements and ordering.
//!
//! Application order inside `plugins { }` is validated against
//! [`KnownPlugin::apply_after`] instead of being left to convention.

pub const ANDROID_APPLICATION: &str = "com.android.application";
pub const ANDROID_LIBRARY: &str = "com.android.library";
pub const KOTLIN_ANDROID: &str = "org.jetbrains.kotlin.android";
pub const FLUTTER: &str = "dev.flutter.flutter-gradle-plugin";
pub const GOOGLE_SERVICES: &str = "com.google.gms.google-services";
pub const CRASHLYTICS: &str = "com.google.firebase.crashlytics";
pub const FIREBASE_PERF: &str = "com.google.firebase.firebase-perf";

/// `group:artifact` of the Firebase Bill of Materials.
pub const FIREBASE_BOM: &str = "com.google.firebase:firebase-bom";

const ANDROID_PLUGINS: &[&str] = &[ANDROID_APPLICATION, ANDROID_LIBRARY];
const KOTLIN_ONLY: &[&str] = &[KOTLIN_ANDROID];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownPlugin {
    pub id: &'static str,
    /// Legacy ids that resolve to `id`.
    pub aliases: &'static [&'static str],
    /// At least one of these must also be applied.
    pub requires_any: &'static [&'static str],
    /// `group:artifact` of a BoM that must be declared as a platform dependency.
    pub requires_bom: Option<&'static str>,
    /// Plugins that, when applied, must be declared before this one.
    pub apply_after: &'static [&'static str],
    pub conflicts_with: &'static [&'static str],
}

impl KnownPlugin {
    const fn new(id: &'static str) -> Self {
        Self {
            id,
            aliases: &[],
            requires_any: &[],
            requires_bom: None,
            apply_after: &[],
            conflicts_with: &[],
        }
    }
}

pub const KNOWN_PLUGINS: &[KnownPlugin] = &[
    KnownPlugin {
        conflicts_with: &[ANDROID_LIBRARY],
        ..KnownPlugin::new(ANDROID_APPLICATION)
    },
    KnownPlugin {
        conflicts_with: &[ANDROID_APPLICATION],
        ..KnownPlugin::new(ANDROID_LIBRARY)
    },
    KnownPlugin {
        aliases: &["kotlin-android"],
        requires_any: ANDROID_PLUGINS,
        ..KnownPlugin::new(KOTLIN_ANDROID)
    },
    KnownPlugin {
        requires_any: ANDROID_PLUGINS,
        apply_after: &[ANDROID_APPLICATION, ANDROID_LIBRARY, KOTLIN_ANDROID],
        ..KnownPlugin::new(FLUTTER)
    },
    KnownPlugin {
        requires_any: ANDROID_PLUGINS,
        requires_bom: Some(FIREBASE_BOM),
        ..KnownPlugin::new(GOOGLE_SERVICES)
    },
    KnownPlugin {
        requires_any: &[GOOGLE_SERVICES],
        ..KnownPlugin::new(CRASHLYTICS)
    },
    KnownPlugin {
        requires_any: &[GOOGLE_SERVICES],
        ..KnownPlugin::new(FIREBASE_PERF)
    },
    KnownPlugin {
        aliases: &["kotlin-kapt"],
        requires_any: KOTLIN_ONLY,
        ..KnownPlugin::new("org.jetbrains.kotlin.kapt")
    },
    KnownPlugin {
        aliases: &["kotlin-parcelize"],
        requires_any: KOTLIN_ONLY,
        ..KnownPlugin::new("org.jetbrains.kotlin.plugin.parcelize")
    },
    KnownPlugin {
        aliases: &["kotlinx-serialization"],
        requires_any: KOTLIN_ONLY,
        ..KnownPlugin::new("org.jetbrains.kotlin.plugin.serialization")
    },
    KnownPlugin {
        requires_any: KOTLIN_ONLY,
        ..KnownPlugin::new("org.jetbrains.kotlin.plugin.compose")
    },
    KnownPlugin {
        requires_any: KOTLIN_ONLY,
        ..KnownPlugin::new("com.google.devtools.ksp")
    },
];

/// Finds a plugin by canonical id or alias.
pub fn lookup(id: &str) -> Option<&'static KnownPlugin> {
    KNOWN_PLUGINS
        .iter()
        .find(|p| p.id == id || p.aliases.contains(&id))
}

/// Canonical id for `id`; unknown ids are returned unchanged.
pub fn canonical_id(id: &str) -> &str {
    lookup(id).map_or(id, |p| p.id)
}
