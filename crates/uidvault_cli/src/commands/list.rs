//! List command implementation.

use super::{open_store, CliResult};
use std::path::Path;
use uidvault_core::AeadAlgorithm;

/// Prints every stored UID.
pub fn run(dir: &Path, algorithm: AeadAlgorithm, format: &str) -> CliResult<()> {
    let store = open_store(dir, algorithm)?;
    let uids: Vec<String> = store.uids()?.iter().map(ToString::to_string).collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&uids)?),
        _ => {
            for uid in &uids {
                println!("{uid}");
            }
            println!("{} object(s)", uids.len());
        }
    }
    Ok(())
}
