// Tries to generate the C header with `cbindgen`. Without it, the checked-in
// `include/umbra.h` is copied to $OUT_DIR instead.

use std::{env, fs, path::PathBuf, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/umbra.h");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let header_repo = crate_dir.join("include").join("umbra.h");
    let header_out = out_dir.join("umbra.h");

    let cbindgen_ok = Command::new("cbindgen")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if cbindgen_ok {
        let status = Command::new("cbindgen")
            .args(["--crate", "umbra-ffi", "--lang", "C", "--output"])
            .arg(&header_out)
            .current_dir(&crate_dir)
            .status();

        if matches!(status, Ok(s) if s.success()) {
            println!("cargo:warning=umbra-ffi: generated header -> {}", header_out.display());
            return;
        }
        println!("cargo:warning=umbra-ffi: cbindgen failed; using checked-in header");
    }

    fs::copy(&header_repo, &header_out).expect("failed to copy include/umbra.h to OUT_DIR");
}
