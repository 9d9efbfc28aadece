fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only regenerate if the proto file changes
    println!("cargo:rerun-if-changed=proto/is_prime.proto");

    // Server stubs are only used by the in-process test server
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/is_prime.proto"], &["proto"])?;

    println!("cargo:info=Protobuf compilation completed successfully");

    Ok(())
}
