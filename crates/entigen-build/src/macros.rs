//! Build-script helper: synthesize every entity of a schema file into
//! `$OUT_DIR/entities.rs`, to be pulled in with
//! `include!(concat!(env!("OUT_DIR"), "/entities.rs"))`.
#[macro_export]
macro_rules! build {
    ($schema:expr) => {{
        use std::{env::var, fs, path::PathBuf};

        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");
        println!("cargo:rerun-if-changed={}", $schema);

        let out_dir = var("OUT_DIR").expect("OUT_DIR not set");

        //
        // ENTITIES
        //

        let output = match $crate::build_source($schema) {
            Ok(output) => output,
            Err(e) => panic!("entigen: {e}"),
        };

        let entities_file = PathBuf::from(out_dir).join("entities.rs");
        fs::write(&entities_file, output)
            .unwrap_or_else(|e| panic!("entigen: cannot write {}: {e}", entities_file.display()));
    }};
}
