//! Terminal output helpers.

use anyhow::Context;
use droidconf_core::{BuildDescriptor, MergedDependency, VersionSource};
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
}

/// Forces colors off for every helper in this module.
pub fn disable_colors() {
    owo_colors::set_override(false);
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
        message
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
        message.if_supports_color(Stream::Stderr, |s| s.red())
    );
}

pub fn print_stat(label: &str, value: &str) {
    println!(
        "  {}: {}",
        label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
        value
    );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize to JSON")?;
    println!("{json}");
    Ok(())
}

/// Human-readable summary of a resolved descriptor.
pub fn print_descriptor(descriptor: &BuildDescriptor) {
    print_success(&descriptor.application_id);
    print_stat("Namespace", &descriptor.namespace);
    print_stat(
        "SDK",
        &format!(
            "min {}, target {}, compile {}",
            descriptor.sdk.min_sdk, descriptor.sdk.target_sdk, descriptor.sdk.compile_sdk
        ),
    );
    print_stat(
        "Version",
        &format!("{} ({})", descriptor.version_name, descriptor.version_code),
    );
    if let Some(java) = descriptor.java_compatibility {
        print_stat("Java", &java.to_string());
    }
    if let Some(ndk) = &descriptor.ndk_version {
        print_stat("NDK", ndk);
    }
    print_stat("Multidex", &descriptor.multi_dex_enabled.to_string());
    if descriptor.core_library_desugaring {
        print_stat("Desugaring", "enabled");
    }
    if let Some(flutter) = &descriptor.flutter {
        print_stat("Flutter source", &flutter.source);
    }

    if !descriptor.plugins.is_empty() {
        println!();
        println!("Plugins:");
        for plugin in &descriptor.plugins {
            let mut line = plugin.id.clone();
            if let Some(version) = &plugin.version {
                line.push_str(&format!(" {version}"));
            }
            if !plugin.apply {
                line.push_str(" (not applied)");
            }
            println!("  {line}");
        }
    }

    if !descriptor.build_types.is_empty() {
        println!();
        println!("Build types:");
        for build_type in &descriptor.build_types {
            println!(
                "  {} (minify: {}, shrinkResources: {})",
                build_type.name, build_type.minify, build_type.shrink_resources
            );
        }
    }

    if !descriptor.dependencies.is_empty() {
        println!();
        println!("Dependencies:");
        for dependency in &descriptor.dependencies {
            let platform = if dependency.is_bom { " (platform)" } else { "" };
            println!(
                "  {}: {}{platform}",
                dependency.configuration, dependency.coordinate
            );
        }
    }
}

pub fn source_label(source: &VersionSource) -> String {
    match source {
        VersionSource::Explicit => "explicit".to_string(),
        VersionSource::Bom { bom } => format!("bom {bom}"),
        VersionSource::Unversioned => "unversioned".to_string(),
    }
}

pub fn print_dependencies(merged: &[MergedDependency]) {
    for dependency in merged {
        let label = format!("[{}]", source_label(&dependency.source));
        println!(
            "{} {}",
            dependency,
            label.if_supports_color(Stream::Stdout, |s| s.dimmed())
        );
    }
}
