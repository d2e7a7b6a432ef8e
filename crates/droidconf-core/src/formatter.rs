//! Canonical Kotlin DSL rendering of a [`BuildDescriptor`].

use crate::types::{BuildDescriptor, Dependency, Plugin};
use crate::value::escape;
use std::fmt::Write;

const INDENT: &str = "    ";

impl BuildDescriptor {
    /// Renders the descriptor as a canonical `build.gradle.kts`.
    ///
    /// The output resolves back to an equal descriptor. Settings at their
    /// default value (`multiDexEnabled = false`, no desugaring) are omitted.
    pub fn to_kotlin_dsl(&self) -> String {
        let mut out = Writer::default();

        if !self.plugins.is_empty() {
            out.open("plugins");
            for plugin in &self.plugins {
                out.line(&plugin_declaration(plugin));
            }
            out.close();
            out.blank();
        }

        if !self.dependencies.is_empty() {
            out.open("dependencies");
            for dependency in &self.dependencies {
                out.line(&dependency_declaration(dependency));
            }
            out.close();
            out.blank();
        }

        out.open("android");
        out.line(&format!("namespace = {}", quote(&self.namespace)));
        out.line(&format!("compileSdk = {}", self.sdk.compile_sdk));
        if let Some(ndk) = &self.ndk_version {
            out.line(&format!("ndkVersion = {}", quote(ndk)));
        }

        out.blank();
        out.open("defaultConfig");
        out.line(&format!("applicationId = {}", quote(&self.application_id)));
        out.line(&format!("minSdk = {}", self.sdk.min_sdk));
        out.line(&format!("targetSdk = {}", self.sdk.target_sdk));
        out.line(&format!("versionCode = {}", self.version_code));
        out.line(&format!("versionName = {}", quote(&self.version_name)));
        if self.multi_dex_enabled {
            out.line("multiDexEnabled = true");
        }
        out.close();

        if !self.build_types.is_empty() {
            out.blank();
            out.open("buildTypes");
            for build_type in &self.build_types {
                out.open(&format!("getByName({})", quote(&build_type.name)));
                out.line(&format!("isMinifyEnabled = {}", build_type.minify));
                out.line(&format!("isShrinkResources = {}", build_type.shrink_resources));
                out.close();
            }
            out.close();
        }

        if self.java_compatibility.is_some() || self.core_library_desugaring {
            out.blank();
            out.open("compileOptions");
            if let Some(java) = self.java_compatibility {
                out.line(&format!("sourceCompatibility = {}", java.gradle_constant()));
                out.line(&format!("targetCompatibility = {}", java.gradle_constant()));
            }
            if self.core_library_desugaring {
                out.line("isCoreLibraryDesugaringEnabled = true");
            }
            out.close();
        }

        if let Some(java) = self.java_compatibility {
            out.blank();
            out.open("kotlinOptions");
            out.line(&format!("jvmTarget = {}", quote(java.jvm_target())));
            out.close();
        }
        out.close();

        if let Some(flutter) = &self.flutter {
            out.blank();
            out.open("flutter");
            out.line(&format!("source = {}", quote(&flutter.source)));
            if let Some(target) = &flutter.target {
                out.line(&format!("target = {}", quote(target)));
            }
            out.close();
        }

        out.finish()
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

fn plugin_declaration(plugin: &Plugin) -> String {
    let mut decl = format!("id({})", quote(&plugin.id));
    if let Some(version) = &plugin.version {
        let _ = write!(decl, " version {}", quote(version));
    }
    if !plugin.apply {
        decl.push_str(" apply false");
    }
    decl
}

fn dependency_declaration(dependency: &Dependency) -> String {
    let notation = quote(&dependency.coordinate.to_string());
    if dependency.is_bom {
        format!("{}(platform({notation}))", dependency.configuration)
    } else {
        format!("{}({notation})", dependency.configuration)
    }
}

/// Indentation-tracking line buffer.
#[derive(Default)]
struct Writer {
    buf: String,
    depth: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.buf
    }
}
