use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `(stem, absolute path)` of every bundled sample scenario, sorted by stem.
fn sample_scenarios(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut samples: Vec<_> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .collect();
    samples.sort();
    samples
}

fn main() {
    // Source tarballs carry no .git, so packagers can pin the revision
    println!("cargo:rerun-if-env-changed=RICE_SCENARIO_BUILD_SHA");
    let sha = env::var("RICE_SCENARIO_BUILD_SHA")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| git(&["rev-parse", "--short=12", "HEAD"]))
        .unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=GIT_SHA={sha}");
    let date = git(&["show", "-s", "--format=%cs", "HEAD"]).unwrap_or_else(|| "undated".into());
    println!("cargo:rustc-env=BUILD_DATE={date}");
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    // Sample farms selectable with --sample
    let manifest = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let dir = manifest.join("../../assets/scenarios");
    println!("cargo:rerun-if-changed={}", dir.display());
    let mut code = String::from("pub const SAMPLES: &[(&str, &str)] = &[\n");
    for (stem, path) in sample_scenarios(&dir) {
        println!("cargo:rerun-if-changed={}", path.display());
        let _ = writeln!(code, "    ({stem:?}, include_str!({:?})),", path.display().to_string());
    }
    code.push_str("];\n");
    let out = PathBuf::from(env::var("OUT_DIR").unwrap_or_default()).join("samples.rs");
    if let Err(err) = fs::write(&out, code) {
        panic!("writing {}: {err}", out.display());
    }
}
