use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc_path =
        protoc_bin_vendored::protoc_bin_path().map_err(|e| format!("vendored protoc unavailable: {e:?}"))?;
    unsafe {
        std::env::set_var("PROTOC", protoc_path);
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let proto = "proto/road/echo/v1/echo.proto";
    println!("cargo:rerun-if-changed={proto}");

    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("echo_descriptor.bin"))
        .compile_protos(&[proto], &["proto"])?;

    Ok(())
}
