//! Records the compiler version this crate is built with.
//!
//! The value becomes `COMPILER_VERSION`, so a host only accepts plugins whose
//! declared compiler versions include the one the host was compiled by.

use std::env;
use std::process::Command;

const VERSION_ENV: &str = "PLUGIN_API_RUSTC_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");
    println!("cargo:rerun-if-env-changed=RUSTC");
    println!("cargo:rerun-if-changed=build.rs");

    let version = env::var(VERSION_ENV)
        .ok()
        .filter(|version| !version.trim().is_empty())
        .or_else(query_rustc)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={VERSION_ENV}={version}");
}

/// Asks the compiler Cargo is using for its `release:` line.
fn query_rustc() -> Option<String> {
    let rustc = env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
    let output = Command::new(rustc).arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8(output.stdout)
        .ok()?
        .lines()
        .find_map(|line| line.strip_prefix("release: "))
        .map(|release| release.trim().to_string())
}
