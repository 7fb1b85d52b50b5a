//! WhistleChain Core Library
//!
//! Domain traits, content fingerprinting and report sealing shared by the
//! server and the reporter CLI.

// Re-export pure types from whistle-types
pub use whistle_types::*;

#[cfg(feature = "crypto")]
pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod ports;

pub use error::{Result, WhistleError};
pub use ports::ReportStore;
