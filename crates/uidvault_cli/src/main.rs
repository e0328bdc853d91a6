//! uidvault CLI
//!
//! Command-line tools for a directory-backed uidvault store.
//!
//! # Commands
//!
//! - `put` - Encrypt a file into the store
//! - `get` - Decrypt an object to stdout or a file
//! - `info` - Show the size and flags of an object
//! - `remove` - Remove an object
//! - `purge` - Remove an object that no longer authenticates
//! - `list` - List stored UIDs
//! - `verify` - Scan the store for orphaned or damaged records
//! - `keygen` - Write a fresh hex-encoded key file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uidvault_core::AeadAlgorithm;

/// uidvault command-line store tools.
#[derive(Parser)]
#[command(name = "uidvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    dir: Option<PathBuf>,

    /// File holding the hex-encoded 32-byte key
    #[arg(global = true, short, long)]
    key_file: Option<PathBuf>,

    /// Cipher for new objects (aes-256-gcm, chacha20-poly1305)
    #[arg(global = true, long, default_value = "aes-256-gcm")]
    algorithm: AeadAlgorithm,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file and store it under a UID
    Put {
        /// Object UID (decimal or 0x-prefixed hex)
        uid: String,

        /// File to read the plaintext from
        file: PathBuf,

        /// Refuse later overwrites and removal
        #[arg(long)]
        write_once: bool,

        /// Associated data bound to the object
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// Decrypt an object
    Get {
        /// Object UID (decimal or 0x-prefixed hex)
        uid: String,

        /// Write the plaintext here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Associated data the object was stored with
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// Show the size and flags of an object
    Info {
        /// Object UID (decimal or 0x-prefixed hex)
        uid: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove an object
    Remove {
        /// Object UID (decimal or 0x-prefixed hex)
        uid: String,
    },

    /// Remove an object, ignoring write-once if it fails authentication
    Purge {
        /// Object UID (decimal or 0x-prefixed hex)
        uid: String,

        /// Associated data the object was stored with
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// List stored UIDs
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Scan the store for orphaned or damaged records
    Verify {
        /// Also decrypt every object with the key file
        #[arg(short, long)]
        authenticate: bool,

        /// Associated data used when authenticating
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// Write a fresh random key to a file
    Keygen {
        /// Destination file (must not exist)
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let algorithm = cli.algorithm;
    let store_dir = || cli.dir.clone().ok_or("Store directory required (--dir)");
    let key_file = || cli.key_file.clone().ok_or("Key file required (--key-file)");

    match cli.command {
        Commands::Put {
            ref uid,
            ref file,
            write_once,
            ref aad,
        } => {
            let uid = commands::parse_uid(uid)?;
            commands::object::put(
                &store_dir()?,
                &key_file()?,
                algorithm,
                uid,
                file,
                write_once,
                aad.as_bytes(),
            )?;
        }
        Commands::Get {
            ref uid,
            ref out,
            ref aad,
        } => {
            let uid = commands::parse_uid(uid)?;
            commands::object::get(
                &store_dir()?,
                &key_file()?,
                algorithm,
                uid,
                out.as_deref(),
                aad.as_bytes(),
            )?;
        }
        Commands::Info {
            ref uid,
            ref format,
        } => {
            let uid = commands::parse_uid(uid)?;
            commands::object::info(&store_dir()?, algorithm, uid, format)?;
        }
        Commands::Remove { ref uid } => {
            let uid = commands::parse_uid(uid)?;
            commands::object::remove(&store_dir()?, algorithm, uid)?;
        }
        Commands::Purge { ref uid, ref aad } => {
            let uid = commands::parse_uid(uid)?;
            commands::object::purge(&store_dir()?, &key_file()?, algorithm, uid, aad.as_bytes())?;
        }
        Commands::List { ref format } => {
            commands::list::run(&store_dir()?, algorithm, format)?;
        }
        Commands::Verify {
            authenticate,
            ref aad,
        } => {
            let key = if authenticate { Some(key_file()?) } else { None };
            commands::verify::run(&store_dir()?, algorithm, key.as_deref(), aad.as_bytes())?;
        }
        Commands::Keygen { ref file } => {
            commands::keygen::run(file)?;
        }
        Commands::Version => {
            println!("uidvault CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("uidvault Core v{}", uidvault_core::VERSION);
        }
    }

    Ok(())
}
