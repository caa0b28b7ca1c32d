//! Look up the notes a nostr user has been zapped for.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use nostr_zap_receipts::{normalize, parse_relay_list, Config, Event, Session};
use std::io::BufRead;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "zapped-notes", version, about = "Show zap receipts for a nostr user")]
struct Cli {
    /// Relay to query. May be repeated. Replaces the configured relay list.
    #[arg(long = "relay", global = true)]
    relays: Vec<String>,

    /// Seconds to wait for each relay to connect
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    /// Seconds a relay may stay quiet before its results are taken as complete
    #[arg(long, global = true)]
    query_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the zap receipts for a key (npub or hex). Reads stdin if no key is given.
    Fetch { key: Option<String> },

    /// Print the hex form of a key without connecting to any relay
    Decode { key: Option<String> },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Decode { ref key } => {
            let key = normalize(&read_key(key.as_deref())?)?;
            println!("{key}");
            Ok(())
        }
        Commands::Fetch { ref key } => {
            let input = read_key(key.as_deref())?;
            let session = Session::new(build_config(&cli)?);
            let _ = session.initialize().await?;

            let events = session.fetch_zapped_notes(&input).await?;
            if events.is_empty() {
                println!("No zapped notes found for this user on provided relays.");
            }
            for event in &events {
                print_receipt(event);
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if !cli.relays.is_empty() {
        config.relays = parse_relay_list(&cli.relays.join(","))?;
    }
    if let Some(secs) = cli.connect_timeout {
        config.connect_timeout = seconds(secs)?;
    }
    if let Some(secs) = cli.query_timeout {
        config.query_timeout = seconds(secs)?;
    }
    Ok(config)
}

fn seconds(secs: u64) -> anyhow::Result<Duration> {
    if secs == 0 {
        bail!("timeouts must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

fn read_key(arg: Option<&str>) -> anyhow::Result<String> {
    if let Some(key) = arg {
        return Ok(key.trim().to_owned());
    }
    let mut line = String::new();
    let _ = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read a key from stdin")?;
    let key = line.trim();
    if key.is_empty() {
        bail!("no key given");
    }
    Ok(key.to_owned())
}

fn print_receipt(event: &Event) {
    println!("Content: {}", event.content);
    println!("Created At: {}", event.created_at.to_local_string());
    println!("Event ID: {}", event.id);

    match event.zap_data() {
        Ok(Some(zap)) => {
            if let Some(note) = zap.zapped_event {
                println!("Zapped Note: {note}");
            }
            if let Some(amount) = zap.amount {
                println!("Amount: {amount}");
            }
            if let Some(payer) = zap.payer {
                let sender = payer.as_bech32_string().unwrap_or_else(|_| payer.to_string());
                println!("Sender: {sender}");
            }
            if let Some(comment) = zap.comment.filter(|c| !c.is_empty()) {
                println!("Comment: {comment}");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::debug!("receipt {} has no usable zap data: {e}", event.id),
    }
    println!("---------------------");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_key_trims_argument() {
        let key = read_key(Some("  npub1abc \n")).unwrap();
        assert_eq!(key, "npub1abc");
    }
}
