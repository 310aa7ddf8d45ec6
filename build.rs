use anyhow::{Context, Result};
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    // Generate git information
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    // Reproducible builds pin the timestamp
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => chrono::Utc
            .timestamp_opt(val.parse::<i64>()?, 0)
            .single()
            .context("SOURCE_DATE_EPOCH out of range")?,
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let ltc_version = ltc_version_from_metadata().unwrap_or_else(|_| {
        ltc_version_fallback().unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=LTC_VERSION={ltc_version}");

    println!("cargo:rerun-if-changed=ltc/Cargo.toml");

    Ok(())
}

/// Version of the `ltc` library, local or published.
fn ltc_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    // workspace member
    if let Some(packages) = metadata["packages"].as_array() {
        let version = packages
            .iter()
            .filter(|package| package["name"].as_str() == Some("ltc"))
            .find_map(|package| package["version"].as_str());
        if let Some(version) = version {
            return Ok(version.to_string());
        }
    }

    // "ltc 0.1.0 (registry+...)" in the resolved graph
    if let Some(nodes) = metadata["resolve"]["nodes"].as_array() {
        let version = nodes
            .iter()
            .filter_map(|node| node["id"].as_str())
            .filter_map(|id| id.strip_prefix("ltc "))
            .find_map(|rest| rest.split(' ').next());
        if let Some(version) = version {
            return Ok(version.to_string());
        }
    }

    anyhow::bail!("ltc package not found in metadata");
}

/// Reads the version line of ltc/Cargo.toml directly.
fn ltc_version_fallback() -> Result<String> {
    let toml_content = fs::read_to_string("ltc/Cargo.toml")?;

    toml_content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("version"))
        .find_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').trim_matches('\'').to_string())
        .context("Could not find version in ltc/Cargo.toml")
}
