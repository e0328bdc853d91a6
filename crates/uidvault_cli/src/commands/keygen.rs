//! Keygen command implementation.

use super::CliResult;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use uidvault_core::EncryptionKey;
use zeroize::Zeroizing;

/// Writes a fresh hex-encoded key to `path`, refusing to overwrite.
pub fn run(path: &Path) -> CliResult<()> {
    let key = EncryptionKey::generate();
    let mut encoded = Zeroizing::new(hex::encode(key.as_bytes()));
    encoded.push('\n');

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| format!("cannot create key file {}: {e}", path.display()))?;
    file.write_all(encoded.as_bytes())?;
    file.sync_all()?;

    println!("Wrote new key to {}", path.display());
    Ok(())
}
