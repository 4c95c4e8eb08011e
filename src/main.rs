use anyhow::Result;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use elevation_fetch::batch::DEFAULT_CHUNK_SIZE;
use elevation_fetch::commands::{handle_fetch, handle_reduce};

#[derive(Parser, Debug)]
#[command(
    name = "elevation-fetch",
    about = "Fetch elevations for a list of coordinates and output JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch elevations for every location in the input file
    Fetch {
        /// Input file with a JSON array of coordinates
        #[arg(long, default_value = "data/sidewalk_locations.json")]
        input: PathBuf,
        /// Output file for the full result records
        #[arg(long = "full-output", default_value = "data/sidewalk_elevations_full_output.json")]
        full_output: PathBuf,
        /// Output file for the elevations-only sequence
        #[arg(
            long = "elevations-output",
            default_value = "data/sidewalk_elevations.json"
        )]
        elevations_output: PathBuf,
        /// Locations per API request (the API caps this at 512)
        #[arg(long = "chunk-size", default_value_t = NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap())]
        chunk_size: NonZeroUsize,
    },
    /// Rebuild the elevations-only file from an existing full output
    Reduce {
        /// Full output file written by a previous fetch
        #[arg(long, default_value = "data/sidewalk_elevations_full_output.json")]
        full_output: PathBuf,
        /// Output file for the elevations-only sequence
        #[arg(
            long = "elevations-output",
            default_value = "data/sidewalk_elevations.json"
        )]
        elevations_output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables (including the API key) from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            input,
            full_output,
            elevations_output,
            chunk_size,
        } => handle_fetch(&input, &full_output, &elevations_output, chunk_size).await,
        Commands::Reduce {
            full_output,
            elevations_output,
        } => handle_reduce(&full_output, &elevations_output),
    }
}
