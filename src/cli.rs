//! Command-line interface for strictly_chess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_chess::Color;

/// Strictly Chess - play chess against a remote move-inference service
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Terminal chess against a remote engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the inference service is reachable
    Health {
        /// Service URL (overrides config)
        #[arg(long)]
        service_url: Option<String>,

        /// Path to controller config
        #[arg(short, long, default_value = "strictly_chess.toml")]
        config: PathBuf,
    },

    /// Play a game on stdin/stdout
    Play {
        /// Path to controller config
        #[arg(short, long, default_value = "strictly_chess.toml")]
        config: PathBuf,

        /// Service URL (overrides config)
        #[arg(long)]
        service_url: Option<String>,

        /// Side to play (white or black)
        #[arg(long)]
        color: Option<Color>,

        /// Engine skill rating (1100-1900, steps of 100)
        #[arg(long)]
        level: Option<u32>,

        /// Engine node budget (1-10000)
        #[arg(long)]
        nodes: Option<u32>,
    },
}
