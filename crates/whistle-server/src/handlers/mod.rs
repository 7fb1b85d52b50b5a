//! HTTP handlers

pub mod health;
pub mod reports;

pub use health::health;
