use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::elevation::ElevationSample;
use crate::output::write_elevations_output;

/// Regenerate the elevations-only file from an existing full output, without
/// hitting the API again. Useful when only the second write failed, or when
/// the reduced file was lost.
pub fn handle_reduce(full_output: &Path, elevations_output: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(full_output)
        .with_context(|| format!("failed to read full output {}", full_output.display()))?;

    let samples: Vec<ElevationSample> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse full output {}", full_output.display()))?;

    info!(
        "Reducing {} records from {}",
        samples.len(),
        full_output.display()
    );

    write_elevations_output(elevations_output, &samples)
        .context("failed to write elevations output")?;

    Ok(())
}
