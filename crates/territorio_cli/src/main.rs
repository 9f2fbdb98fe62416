//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `territorio_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use territorio_core::{MunicipalityDirectory, Normalizer, StaticDirectoryLoader};

fn main() {
    println!("territorio_core version={}", territorio_core::core_version());

    let normalizer = Normalizer::default();
    match MunicipalityDirectory::load(&StaticDirectoryLoader::builtin(), &normalizer) {
        Ok(directory) => {
            println!(
                "territorio_core directory municipalities={} regions={}",
                directory.len(),
                directory.regions().len()
            );
        }
        Err(err) => {
            eprintln!("territorio_core directory load failed: {err}");
            std::process::exit(1);
        }
    }
}
