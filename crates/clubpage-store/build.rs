use std::fs;
use std::path::PathBuf;

/// Schema files embedded by `schema.rs`.
const MIGRATION_FILES: &[&str] = &["001_schema.sql"];

fn main() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    // Workspace checkout first, then a packaged crate carrying its own copy.
    let candidates = [
        manifest_dir.join("../../migrations"),
        manifest_dir.join("migrations"),
    ];

    let Some(migrations_dir) = candidates
        .iter()
        .find(|dir| MIGRATION_FILES.iter().all(|file| dir.join(file).exists()))
    else {
        let searched: Vec<String> = candidates
            .iter()
            .map(|dir| format!("  - {}", dir.display()))
            .collect();
        panic!("no migrations directory found, searched:\n{}", searched.join("\n"));
    };

    let dest = out_dir.join("migrations");
    fs::create_dir_all(&dest).expect("failed to create OUT_DIR/migrations");

    for file in MIGRATION_FILES {
        let src = migrations_dir.join(file);
        fs::copy(&src, dest.join(file))
            .unwrap_or_else(|e| panic!("failed to copy {}: {}", src.display(), e));
        println!("cargo:rerun-if-changed={}", src.display());
    }
}
