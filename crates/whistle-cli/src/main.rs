//! WhistleChain CLI
//!
//! Seal reports locally and submit them to a WhistleChain server.

mod api;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::Level;

#[derive(Parser)]
#[command(name = "whistle")]
#[command(author, version, about = "WhistleChain - anonymous report submission", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server base URL
    #[arg(
        long,
        global = true,
        env = "WHISTLE_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new sealing key (hex)
    Keygen,

    /// Seal a report with a key
    Seal {
        /// Key as 64 hex chars or base64
        #[arg(short, long, env = "WHISTLE_KEY", hide_env_values = true)]
        key: String,

        /// Report text (read from stdin when omitted)
        text: Option<String>,
    },

    /// Open a sealed report
    Open {
        /// Key as 64 hex chars or base64
        #[arg(short, long, env = "WHISTLE_KEY", hide_env_values = true)]
        key: String,

        /// Sealed report (read from stdin when omitted)
        ciphertext: Option<String>,
    },

    /// Print the fingerprint the server will store for a payload
    Hash {
        /// Payload (read from stdin when omitted)
        text: Option<String>,
    },

    /// Submit a report, sealing it first when a key is given
    Submit {
        /// Key as 64 hex chars or base64
        #[arg(short, long, env = "WHISTLE_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Company the report is about
        #[arg(short, long)]
        company: Option<i64>,

        /// Report text (read from stdin when omitted)
        text: Option<String>,
    },

    /// List all reports on the server
    List,

    /// Fetch one report
    Get {
        /// Report ID
        id: String,

        /// Open the report with this key
        #[arg(short, long, env = "WHISTLE_KEY", hide_env_values = true)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = api::Client::new(&cli.server);

    match cli.command {
        Commands::Keygen => commands::keys::keygen(),
        Commands::Seal { key, text } => commands::keys::seal(&key, text),
        Commands::Open { key, ciphertext } => commands::keys::open(&key, ciphertext),
        Commands::Hash { text } => commands::keys::hash(text),
        Commands::Submit { key, company, text } => {
            commands::reports::submit(&client, key.as_deref(), company, text).await
        }
        Commands::List => commands::reports::list(&client).await,
        Commands::Get { id, key } => commands::reports::get(&client, &id, key.as_deref()).await,
    }
}
