//! Core of droidconf: reads the declarative subset of an Android
//! `build.gradle.kts`, validates it and produces an immutable
//! [`BuildDescriptor`].
//!
//! # Examples
//!
//! ```
//! use droidconf_core::ConfigResolver;
//!
//! let descriptor = ConfigResolver::default()
//!     .resolve(
//!         r#"
//! plugins {
//!     id("com.android.application")
//! }
//! android {
//!     namespace = "com.example.app"
//!     compileSdk = 35
//!     defaultConfig {
//!         applicationId = "com.example.app"
//!         minSdk = 23
//!         targetSdk = 35
//!         versionCode = 1
//!         versionName = "1.0"
//!     }
//! }
//! "#,
//!     )
//!     .unwrap();
//! assert_eq!(descriptor.sdk.min_sdk, 23);
//! ```

pub mod config;
pub mod error;
mod formatter;
pub mod merge;
pub mod parser;
pub mod plugins;
pub mod resolver;
pub mod syntax;
pub mod types;
pub mod value;
pub mod version;
pub mod warning;

pub use config::{CONFIG_CANDIDATES, ResolverConfig};
pub use error::{ConfigError, ParseError, ResolveError, Result, ValidationError, exit_codes};
pub use merge::{MergedDependency, PlatformBom, VersionSource, merge_dependencies};
pub use resolver::{ConfigResolver, Resolution};
pub use types::{
    BuildDescriptor, BuildType, Coordinate, Dependency, FlutterSource, JavaVersion, Plugin,
    SdkBounds,
};
pub use version::compare_versions;
pub use warning::Warning;
