use anyhow::Result;

fn main() -> Result<()> {
    // Emits VERGEN_RUSTC_SEMVER, reported by `/info`.
    vergen::Emitter::default()
        .add_instructions(&vergen::RustcBuilder::all_rustc()?)?
        .emit()?;

    Ok(())
}
