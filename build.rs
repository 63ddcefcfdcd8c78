// Builds the wasm bundle for wasm32 targets and stages `static/` into `dist/`.
use std::process::Command;
use std::{env, fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    // Only run the heavy wasm-pack build when targeting wasm32.
    let target = env::var("TARGET").unwrap_or_default();
    // wasm-pack re-enters cargo, so the nested build must not spawn it again.
    let nested = env::var_os("ORB_VIZ_NESTED_BUILD").is_some();
    if target == "wasm32-unknown-unknown" && !nested {
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .env("ORB_VIZ_NESTED_BUILD", "1")
            .status();

        match status {
            Ok(st) if !st.success() => println!("cargo:warning=wasm-pack build failed"),
            Ok(_) => {}
            Err(_) => println!("cargo:warning=wasm-pack not installed – skipping"),
        }
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    fs::create_dir_all(out_dir).ok();

    let static_dir = Path::new("static");
    if static_dir.exists() {
        let options = CopyOptions::new().content_only(true).overwrite(true);
        if let Err(e) = copy(static_dir, out_dir, &options) {
            println!("cargo:warning=failed to stage static assets: {e}");
        }
    }
}
