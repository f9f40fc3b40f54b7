use std::process::Command;

fn main() {
    // Packaged builds without a git checkout can pin the hash explicitly.
    let git_hash = std::env::var("CATALOG_BUILD_HASH").ok().or_else(|| {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
    });

    println!(
        "cargo:rustc-env=GIT_HASH={}",
        git_hash.unwrap_or_else(|| "unknown".to_string())
    );

    println!("cargo:rerun-if-env-changed=CATALOG_BUILD_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
