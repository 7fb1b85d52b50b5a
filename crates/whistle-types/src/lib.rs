//! WhistleChain Types - Pure type definitions
//!
//! This crate contains only plain data types with no async runtime
//! dependencies, so the server and the CLI can share one wire format.

pub mod organization;
pub mod report;

pub use organization::*;
pub use report::*;

/// Encryption types (definitions only, no implementation)
pub mod encryption {
    /// XSalsa20-Poly1305 secret key (32 bytes)
    pub type SecretKey = [u8; 32];

    /// XSalsa20 nonce (24 bytes)
    pub type Nonce = [u8; 24];

    /// Nonce length in bytes
    pub const NONCE_LEN: usize = 24;

    /// Poly1305 authentication tag length in bytes
    pub const TAG_LEN: usize = 16;
}

pub use encryption::*;
