// Build script to regenerate Rust code from the protobuf definitions
use std::io::Result;

fn main() -> Result<()> {
    // Re-run build if the proto file or the regeneration switch changes
    println!("cargo:rerun-if-changed=api.proto");
    println!("cargo:rerun-if-env-changed=APISERVICE_REGENERATE_PROTO");

    // The generated module and descriptor set are checked in at
    // src/api.v1.rs and src/api.v1.bin, so protoc is only
    // needed when the schema changes.
    if std::env::var_os("APISERVICE_REGENERATE_PROTO").is_none() {
        return Ok(());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(".api.v1", "#[derive(serde::Serialize, serde::Deserialize)]")
        .out_dir("src/")
        .file_descriptor_set_path("src/api.v1.bin")
        .compile_protos(&["api.proto"], &["."])?;

    Ok(())
}
