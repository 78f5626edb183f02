use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let out = crate_dir.join("include").join("watchlist.h");

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let config = cbindgen::Config::from_root_or_default(&crate_dir);
    match cbindgen::generate_with_config(&crate_dir, config) {
        Ok(bindings) => {
            if let Some(dir) = out.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            bindings.write_to_file(&out);
        }
        // Header generation is best-effort.
        Err(err) => println!("cargo:warning=cbindgen failed: {err}"),
    }
}
