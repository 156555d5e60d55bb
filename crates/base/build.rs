use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let manifest_dir = PathBuf::from(
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR should be set"),
    );
    let repo_root = manifest_dir
        .ancestors()
        .find(|candidate| candidate.join(".git").exists())
        .map(Path::to_path_buf);

    if let Some(repo_root) = &repo_root {
        let git_dir = repo_root.join(".git");
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
    }

    let package_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_owned());
    let commit_id = repo_root
        .as_deref()
        .and_then(|root| git(root, &["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_owned());
    let dirty_suffix = match repo_root.as_deref() {
        Some(root) if is_dirty(root) => "-dev",
        _ => "",
    };

    println!(
        "cargo:rustc-env=LEXVIEW_PROJECT_REVISION={package_version}+{commit_id}{dirty_suffix}"
    );
}

fn is_dirty(repo_root: &Path) -> bool {
    git(repo_root, &["status", "--porcelain"]).is_some_and(|status| !status.is_empty())
}

fn git(repo_root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    Some(value.trim().to_owned())
}
