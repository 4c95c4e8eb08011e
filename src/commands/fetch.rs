use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::info;

use crate::batch::fetch_elevations;
use crate::elevation::GoogleElevationClient;
use crate::locations::load_locations;
use crate::output::{write_elevations_output, write_full_output};

/// End-to-end pipeline: load locations, fetch elevations in chunks, then
/// write both output files. The API key comes from the environment so it
/// never appears on the command line.
pub async fn handle_fetch(
    input: &Path,
    full_output: &Path,
    elevations_output: &Path,
    chunk_size: NonZeroUsize,
) -> Result<()> {
    let api_key = env::var("GOOGLE_MAPS_API_KEY")
        .context("GOOGLE_MAPS_API_KEY must be set (directly or via .env)")?;

    let client = GoogleElevationClient::new(api_key)?;

    let locations = load_locations(input).context("failed to load locations")?;
    info!(
        "Fetching elevations for {} locations from {} (chunk size {})",
        locations.len(),
        input.display(),
        chunk_size
    );

    let samples = fetch_elevations(&client, &locations, chunk_size)
        .await
        .context("failed to fetch elevations")?;

    write_full_output(full_output, &samples).context("failed to write full output")?;
    write_elevations_output(elevations_output, &samples)
        .context("failed to write elevations output")?;

    Ok(())
}
