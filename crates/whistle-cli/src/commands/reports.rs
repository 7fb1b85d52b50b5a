//! Commands talking to the server

use super::read_input;
use crate::api::Client;
use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;
use whistle_core::{crypto, fingerprint, Report, ReportSubmission};

/// Build the request body, sealing the text when a key is given
fn build_submission(
    text: String,
    key: Option<&str>,
    company: Option<i64>,
) -> Result<ReportSubmission> {
    let description = match key {
        Some(key) => {
            let key = crypto::parse_key(key)?;
            crypto::encrypt(&text, &key)?
        }
        None => text,
    };

    let submission = ReportSubmission {
        description,
        company_id: company,
    };
    submission.validate()?;
    Ok(submission)
}

pub async fn submit(
    client: &Client,
    key: Option<&str>,
    company: Option<i64>,
    text: Option<String>,
) -> Result<()> {
    let text = read_input(text)?;
    if key.is_none() {
        println!(
            "{}",
            "⚠️  No key given, the report is sent unsealed".yellow()
        );
    }

    let submission = build_submission(text, key, company)?;
    let expected = fingerprint::hash(&submission.description);

    let receipt = client.submit(&submission).await?;
    println!("{}", format!("✅ {}", receipt.message).green());
    println!("   id:   {}", receipt.id);

    match receipt.hash {
        Some(hash) if hash == expected => println!("   hash: {}", hash),
        Some(hash) => {
            warn!("server fingerprint {} differs from local {}", hash, expected);
            println!(
                "{}",
                format!("⚠️  Server hash {} does not match local hash {}", hash, expected).red()
            );
        }
        None => println!("   hash: {} (server did not fingerprint)", expected),
    }

    Ok(())
}

pub async fn list(client: &Client) -> Result<()> {
    let reports = client.list().await?;
    if reports.is_empty() {
        println!("No reports");
        return Ok(());
    }

    for report in &reports {
        println!("{}", summary_line(report));
    }
    println!("{} report(s)", reports.len());
    Ok(())
}

pub async fn get(client: &Client, id: &str, key: Option<&str>) -> Result<()> {
    let Some(report) = client.get(id).await? else {
        anyhow::bail!("Report {} not found", id);
    };

    println!("{}", summary_line(&report));
    if let Some(key) = key {
        let key = crypto::parse_key(key)?;
        let plaintext = crypto::decrypt(&report.description, &key)
            .context("Could not open report with this key")?;
        println!("{}", plaintext);
    } else {
        println!("{}", report.description);
    }
    Ok(())
}

fn summary_line(report: &Report) -> String {
    let company = report
        .company_id
        .map(|id| format!(" company={}", id))
        .unwrap_or_default();
    let hash = report
        .blockchain_hash
        .as_deref()
        .map(|h| h.chars().take(12).collect::<String>())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} hash={}{}",
        report.id.bold(),
        report.timestamp.format("%Y-%m-%d %H:%M:%S"),
        hash,
        company
    )
}
