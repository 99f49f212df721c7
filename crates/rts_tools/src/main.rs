//! Post-Scarcity RTS - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rts_protocol::config::CodecConfig;
use rts_protocol::replay::OrderReplay;
use rts_tools::inspect::{self, InspectError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rts-tools")]
#[command(about = "Development tools for Post-Scarcity RTS")]
struct Cli {
    /// Codec configuration (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every order frame in a captured packet
    Inspect {
        /// Packet file
        path: PathBuf,
        /// Treat the file as a hex dump instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
    /// Summarize a replay file
    Replay {
        /// Replay file
        path: PathBuf,
        /// Also list the decoded orders of this frame
        #[arg(long)]
        frame: Option<u32>,
    },
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig, InspectError> {
    match path {
        Some(path) => Ok(CodecConfig::load(path)?),
        None => Ok(CodecConfig::default()),
    }
}

fn read_packet(path: &Path, hex: bool) -> Result<Vec<u8>, InspectError> {
    let io_error = |source| rts_protocol::error::ProtocolError::Io {
        path: path.display().to_string(),
        source,
    };
    if hex {
        let text = std::fs::read_to_string(path).map_err(io_error)?;
        inspect::parse_hex(&text)
    } else {
        Ok(std::fs::read(path).map_err(io_error)?)
    }
}

fn run(cli: Cli) -> Result<(), InspectError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { path, hex } => {
            tracing::info!("Inspecting packet: {}", path.display());
            let bytes = read_packet(&path, hex)?;
            println!("{}", inspect::inspect_packet(&config, &bytes));
        }
        Commands::Replay { path, frame } => {
            tracing::info!("Loading replay: {}", path.display());
            let replay = OrderReplay::load(&path)?;
            print!("{}", inspect::summarize_replay(&config, &replay));
            if let Some(frame) = frame {
                println!("Frame {frame}:");
                for (client, order) in inspect::replay_frame(&config, &replay, frame) {
                    println!("  [client {client}] {order}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
