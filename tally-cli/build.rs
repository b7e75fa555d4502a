use std::env;
use std::process::Command;

/// Commit id shown by `tally --version`.
///
/// A `TALLY_BUILD_SHA` already set in the environment (release tarballs,
/// CI) wins over asking git.
fn build_id() -> String {
    if let Ok(preset) = env::var("TALLY_BUILD_SHA") {
        let preset = preset.trim();
        if !preset.is_empty() {
            return preset.to_string();
        }
    }

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    Command::new("git")
        .arg("-C")
        .arg(format!("{manifest_dir}/.."))
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env=TALLY_BUILD_SHA={}", build_id());
    println!("cargo:rerun-if-env-changed=TALLY_BUILD_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
