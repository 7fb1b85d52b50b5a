//! Command implementations

pub mod keys;
pub mod reports;

use anyhow::{Context, Result};
use std::io::Read;

/// Use the argument if given, otherwise read all of stdin
fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf.trim_end_matches('\n').to_string())
        }
    }
}
