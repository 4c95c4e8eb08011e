use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, info};

use crate::elevation::{ElevationProvider, ElevationSample, MAX_LOCATIONS_PER_REQUEST};
use crate::locations::Point;

/// Default chunk size, matching the Elevation API per-request location limit.
pub const DEFAULT_CHUNK_SIZE: usize = MAX_LOCATIONS_PER_REQUEST;

/// A lookup failed partway through the batch. `start..end` is the half-open
/// index range of the failed chunk within the input sequence.
#[derive(Debug, Error)]
#[error("elevation fetch failed for chunk {chunk_index} (locations {start}..{end}): {kind}")]
pub struct ElevationFetchError {
    pub chunk_index: usize,
    pub start: usize,
    pub end: usize,
    #[source]
    pub kind: FetchFailure,
}

#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),

    #[error("lookup returned {actual} results for {expected} locations")]
    CountMismatch { expected: usize, actual: usize },
}

/// Fetch elevations for `locations` by submitting consecutive chunks of at
/// most `chunk_size` locations to `provider`, one call at a time, in order.
///
/// The returned sequence is positionally aligned with the input: result `i`
/// is the elevation record for `locations[i]`, no matter how the chunks were
/// split. Any chunk whose lookup fails, or whose response length differs from
/// the chunk length, aborts the whole fetch; partial results are never
/// returned.
pub async fn fetch_elevations<P>(
    provider: &P,
    locations: &[Point],
    chunk_size: NonZeroUsize,
) -> Result<Vec<ElevationSample>, ElevationFetchError>
where
    P: ElevationProvider + ?Sized,
{
    let mut results: Vec<ElevationSample> = Vec::with_capacity(locations.len());

    for (chunk_index, chunk) in locations.chunks(chunk_size.get()).enumerate() {
        let start = chunk_index * chunk_size.get();
        let end = start + chunk.len();

        debug!(
            "Fetching chunk {} ({} locations, {}..{})",
            chunk_index,
            chunk.len(),
            start,
            end
        );

        let chunk_results =
            provider
                .lookup(chunk)
                .await
                .map_err(|e| ElevationFetchError {
                    chunk_index,
                    start,
                    end,
                    kind: FetchFailure::Lookup(e),
                })?;

        if chunk_results.len() != chunk.len() {
            return Err(ElevationFetchError {
                chunk_index,
                start,
                end,
                kind: FetchFailure::CountMismatch {
                    expected: chunk.len(),
                    actual: chunk_results.len(),
                },
            });
        }

        results.extend(chunk_results);
    }

    info!(
        "Fetched {} elevations in {} chunks",
        results.len(),
        locations.len().div_ceil(chunk_size.get())
    );

    Ok(results)
}
