//! msgwire CLI — encode message records into a single batch buffer.
//!
//! # Commands
//! ```text
//! msgwire encode --input <records.json> [--output <file>] [--hex] [--config <encoder.json>]
//! msgwire info
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use msgwire_observability::{init_tracing, LogConfig};

mod cmd_encode;

#[derive(Parser)]
#[command(
    name = "msgwire",
    about = "Batch message encoder — msgwire CLI",
    long_about = "
msgwire CLI: encode JSON message records into the commit-log layout and
pack them into one buffer, in input order. Records that fail to encode are
reported and left out.
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON structured logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON array of records into one batch buffer
    Encode {
        /// Path to a JSON file holding an array of records
        #[arg(short, long)]
        input: String,
        /// Write raw bytes to this file (default: hex to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Print hex to stdout even when --output is given
        #[arg(long)]
        hex: bool,
        /// Encoder config JSON file
        #[arg(long)]
        config: Option<String>,
    },

    /// Show codec and layout info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = LogConfig {
        level: if cli.verbose { "debug".into() } else { "warn".into() },
        json: cli.json_logs,
        ..LogConfig::default()
    };
    init_tracing(&log).context("failed to initialise logging")?;

    match cli.command {
        Commands::Encode {
            input,
            output,
            hex,
            config,
        } => cmd_encode::run(&input, output.as_deref(), hex, config.as_deref()),

        Commands::Info => cmd_info(),
    }
}

fn cmd_info() -> Result<()> {
    use msgwire_commitlog::{codec::IPV4_HOST_LEN, codec::IPV6_HOST_LEN, FIXED_LEN, MESSAGE_MAGIC_CODE};

    let encoder = msgwire_batch::BatchEncoder::shared();
    let config = encoder.config();

    println!("msgwire v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Codec:            {}", encoder.codec_name());
    println!("Magic code:       0x{:08x}", MESSAGE_MAGIC_CODE as u32);
    println!("Fixed bytes:      {FIXED_LEN}");
    println!("Host bytes:       {IPV4_HOST_LEN} (IPv4) / {IPV6_HOST_LEN} (IPv6)");
    println!("Topic warn len:   {}", config.topic_warn_len);
    Ok(())
}
