//! votesort CLI — play the puzzles in a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "votesort", version, about = "Guess how the crowd voted")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the commands that deal puzzles.
#[derive(Args, Clone, Debug, Default)]
pub struct GameArgs {
    /// Puzzle variant: match, pair, rank, rank-once
    #[arg(long)]
    variant: Option<String>,

    /// Data file (JSON or script-wrapped). Defaults to today's dated file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Seed for a reproducible deal
    #[arg(long)]
    seed: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively on stdin/stdout
    Play(GameArgs),

    /// Print one dealt puzzle as JSON
    Deal(GameArgs),

    /// Report how a data file filters for every variant
    Validate {
        /// Path to the data file
        #[arg(long)]
        data: PathBuf,
    },

    /// Create starter config and sample data
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("votesort=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play(args) => commands::play::execute(args).await,
        Commands::Deal(args) => commands::deal::execute(args).await,
        Commands::Validate { data } => commands::validate::execute(data).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
