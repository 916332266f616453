fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tell cargo to rerun this if the schema changes
    println!("cargo:rerun-if-changed=../../schema/http_log.capnp");

    // Generates $OUT_DIR/http_log_capnp.rs; needs the `capnp` tool on PATH
    capnpc::CompilerCommand::new()
        .src_prefix("../../schema")
        .file("../../schema/http_log.capnp")
        .run()?;

    Ok(())
}
