//! Build script for deploys
//! Stamps the git revision and build time into `deploys version`

use chrono::Utc;
use std::env;
use std::process::Command;

fn git_hash() -> String {
    // CI images build without a .git directory and pass the revision in
    if let Ok(hash) = env::var("DEPLOYS_GIT_HASH") {
        if !hash.is_empty() {
            return hash;
        }
    }
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("cargo:rerun-if-env-changed=DEPLOYS_GIT_HASH");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
