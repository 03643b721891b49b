use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Byte every payload is XORed with to produce the obfuscated variant
pub const OBFUSCATION_KEY: u8 = 0xAA;

/// XORs every byte in place; applying it twice restores the input
pub fn xor_bytes(data: &mut [u8], key: u8) {
    for byte in data.iter_mut() {
        *byte ^= key;
    }
}

/// `dir/chair.glb` becomes `dir/chair-obfuscation.glb`
pub fn obfuscated_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match input.extension() {
        Some(ext) => format!("{}-obfuscation.{}", stem, ext.to_string_lossy()),
        None => format!("{}-obfuscation", stem),
    };

    input.with_file_name(file_name)
}

/// Writes the obfuscated copy next to the input and returns its path
pub fn obfuscate_file(input: impl AsRef<Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let mut data =
        std::fs::read(input).with_context(|| format!("Failed to read asset: {:?}", input))?;

    xor_bytes(&mut data, OBFUSCATION_KEY);

    let output = obfuscated_path(input);
    std::fs::write(&output, &data)
        .with_context(|| format!("Failed to write obfuscated asset: {:?}", output))?;

    log::debug!("Obfuscated asset saved to: {:?}", output);
    Ok(output)
}
