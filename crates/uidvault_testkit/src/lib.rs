//! # uidvault Testkit
//!
//! Test utilities for uidvault.
//!
//! This crate provides:
//! - Backend fixtures over temporary directories
//! - A fault-injecting key-value backend
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uidvault_testkit::prelude::*;
//!
//! #[test]
//! fn survives_failed_write() {
//!     let backend = FaultyBackend::in_memory();
//!     backend.fail_set_after(1);
//!     // ... store operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
