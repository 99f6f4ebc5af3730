fn main() {
    // Declare the cfgs Tauri normally emits so `check-cfg` stays quiet when
    // `tauri_build::build()` is skipped (core-only unit tests).
    println!("cargo:rustc-check-cfg=cfg(desktop)");
    println!("cargo:rustc-check-cfg=cfg(mobile)");

    // `tauri_build::build()` reads env vars exported by the `tauri` crate
    // (e.g. `DEP_TAURI_DEV`). With `--no-default-features` the runtime stack
    // is not compiled at all, so the build helpers must be skipped too.
    if std::env::var_os("CARGO_FEATURE_APP").is_some() {
        tauri_build::build()
    }
}
