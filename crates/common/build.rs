use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn report_build_profile() {
    println!(
        "cargo:rustc-env=RELAY_BUILD_PROFILE={}",
        env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string())
    );
}

fn report_repository_version() {
    // CI provides the ref explicitly, local builds ask git
    let version = env::var("CI_BUILD_REF")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--long", "--tags"]))
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".into()));

    println!("cargo:rustc-env=RELAY_REPO_VERSION={}", version);
}

fn report_build_timestamp() {
    println!(
        "cargo:rustc-env=RELAY_BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );
}

fn report_target() {
    println!(
        "cargo:rustc-env=RELAY_BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=CI_BUILD_REF");

    report_build_profile();
    report_repository_version();
    report_build_timestamp();
    report_target();
}
