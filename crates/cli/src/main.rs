//! Universal resolver command line tool
//!
//! Encodes and hashes names, builds reverse names and inspects the payloads
//! exchanged with off-store gateways.

mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use settings::Settings;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use unires_names::Name;
use unires_types::Address;
use unires_universal_resolver::{decode_query, decode_replies, ContinuationToken, OffchainLookup};

#[derive(Parser)]
#[command(name = "unires")]
#[command(about = "Universal resolver name and continuation tooling")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a dotted name into its wire form
    Encode {
        /// Dotted name, `[<64 hex>]` for opaque labels
        name: String,
    },

    /// Decode a hex wire name into its dotted form
    Decode {
        /// Wire bytes as hex, `0x` prefix optional
        wire: String,
    },

    /// Compute the node identifier of a name
    Namehash { name: String },

    /// Compute the hash of a single label
    Labelhash { label: String },

    /// Build the reverse name of an address
    ReverseName {
        address: String,

        /// Parent of reverse records (defaults to the configured suffix)
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Pretty-print a continuation token
    DecodeToken {
        /// Token bytes as hex
        token: String,
    },

    /// Pretty-print an `OffchainLookup` suspend signal
    DecodeLookup {
        /// Revert data as hex
        data: String,
    },

    /// Pretty-print a gateway response
    DecodeResponse {
        /// Response bytes as hex
        response: String,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "configuration loaded");

    match cli.command {
        Commands::Encode { name } => {
            let wire = unires_names::encode(&name)?;
            println!("0x{}", hex::encode(wire));
        }
        Commands::Decode { wire } => {
            let bytes = parse_hex(&wire).context("Invalid hex wire name")?;
            println!("{}", unires_names::decode(&bytes)?);
        }
        Commands::Namehash { name } => {
            println!("{}", unires_names::namehash(&name)?);
        }
        Commands::Labelhash { label } => {
            println!("0x{}", hex::encode(unires_names::labelhash(&label)?));
        }
        Commands::ReverseName { address, suffix } => {
            let address: Address = address.parse().context("Invalid address")?;
            let suffix = suffix.unwrap_or(settings.resolver.reverse_suffix);
            let name = Name::reverse(&address, &suffix)?;
            println!("{name}");
            println!("{}", name.namehash());
        }
        Commands::DecodeToken { token } => {
            let bytes = parse_hex(&token).context("Invalid hex token")?;
            let token = ContinuationToken::decode(&bytes).context("Malformed continuation token")?;
            print_json(&token_json(&token))?;
        }
        Commands::DecodeLookup { data } => {
            let bytes = parse_hex(&data).context("Invalid hex revert data")?;
            let lookup = OffchainLookup::decode(&bytes).context("Not an OffchainLookup")?;
            let requests = decode_query(&lookup.call_data).ok().map(|requests| {
                requests
                    .iter()
                    .map(|r| {
                        json!({
                            "sender": r.sender,
                            "urls": r.urls,
                            "callData": to_hex(&r.call_data),
                        })
                    })
                    .collect::<Vec<_>>()
            });
            let token = ContinuationToken::decode(&lookup.extra_data)
                .ok()
                .map(|token| token_json(&token));
            print_json(&json!({
                "sender": lookup.sender,
                "urls": lookup.urls,
                "callData": to_hex(&lookup.call_data),
                "requests": requests,
                "callbackFunction": lookup.callback.to_string(),
                "extraData": to_hex(&lookup.extra_data),
                "token": token,
            }))?;
        }
        Commands::DecodeResponse { response } => {
            let bytes = parse_hex(&response).context("Invalid hex response")?;
            let replies = decode_replies(&bytes).context("Malformed gateway response")?;
            let replies: Vec<_> = replies
                .iter()
                .map(|r| json!({ "failed": r.failed, "data": to_hex(&r.data) }))
                .collect();
            print_json(&replies)?;
        }
        Commands::Config => {
            print_json(&settings)?;
        }
    }

    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let payload = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(payload)?)
}

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn token_json(token: &ContinuationToken) -> serde_json::Value {
    let slots: Vec<_> = token
        .slots
        .iter()
        .map(|slot| {
            json!({
                "callbackFunction": slot.callback.to_string(),
                "data": to_hex(&slot.data),
            })
        })
        .collect();
    json!({
        "resolver": token.resolver,
        "urls": token.urls,
        "metadata": to_hex(&token.metadata),
        "slots": slots,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
