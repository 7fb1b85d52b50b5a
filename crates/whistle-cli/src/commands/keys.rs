//! Local key, sealing and fingerprint commands

use super::read_input;
use anyhow::Result;
use colored::Colorize;
use whistle_core::{crypto, fingerprint};

pub fn keygen() -> Result<()> {
    let key = crypto::generate_key();
    println!("{}", hex::encode(key));
    eprintln!(
        "{}",
        "Keep this key offline. Anyone holding it can read your reports.".yellow()
    );
    Ok(())
}

pub fn seal(key: &str, text: Option<String>) -> Result<()> {
    let key = crypto::parse_key(key)?;
    let plaintext = read_input(text)?;
    println!("{}", crypto::encrypt(&plaintext, &key)?);
    Ok(())
}

pub fn open(key: &str, ciphertext: Option<String>) -> Result<()> {
    let key = crypto::parse_key(key)?;
    let sealed = read_input(ciphertext)?;
    println!("{}", crypto::decrypt(&sealed, &key)?);
    Ok(())
}

pub fn hash(text: Option<String>) -> Result<()> {
    let payload = read_input(text)?;
    println!("{}", fingerprint::hash(&payload));
    Ok(())
}
