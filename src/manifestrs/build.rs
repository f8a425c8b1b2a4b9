// manifestrs/build.rs
use std::process::Command;

fn main() {
    let crate_env_name = "MANIFESTRS_CLI_VERSION";
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    let hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    let dirty = git_dirty().unwrap_or("");

    println!(
        "cargo:rustc-env={}={} {}{}-{}",
        crate_env_name, version, hash, dirty, profile
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("ambiguous argument 'HEAD'") {
            return Some("no-commits".to_string());
        }
        return None;
    }

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(hash)
}

fn git_dirty() -> Option<&'static str> {
    let status = Command::new("git")
        .args(["diff", "--quiet", "."])
        .status()
        .ok()?;

    Some(if status.success() { "" } else { "-dirty" })
}
