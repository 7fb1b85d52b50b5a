//! Error types for WhistleChain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WhistleError>;

#[derive(Error, Debug)]
pub enum WhistleError {
    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Unknown company: {0}")]
    UnknownCompany(i64),

    #[error("Database error: {0}")]
    Database(String),
}
