use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::elevation::ElevationSample;

#[derive(Debug, Error)]
pub enum OutputWriteError {
    #[error("failed to serialize output for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize `value` as JSON and replace `path` with it. Writes go through a
/// sibling temp file and a rename so a failure never leaves a truncated file
/// behind (and never clobbers a previous good output).
fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputWriteError> {
    let json = serde_json::to_string(value).map_err(|source| OutputWriteError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("json.tmp");
    let result = std::fs::write(&temp_path, json.as_bytes())
        .and_then(|_| std::fs::rename(&temp_path, path));

    result.map_err(|source| OutputWriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the full result records, one-to-one with the input order.
pub fn write_full_output(
    path: &Path,
    samples: &[ElevationSample],
) -> Result<(), OutputWriteError> {
    write_json_atomically(path, &samples)?;
    info!("Wrote {} full records to {}", samples.len(), path.display());
    Ok(())
}

/// Extract just the elevation values, preserving order.
pub fn reduce_elevations(samples: &[ElevationSample]) -> Vec<f64> {
    samples.iter().map(|s| s.elevation).collect()
}

/// Write the elevations-only output, positionally aligned with the full one.
pub fn write_elevations_output(
    path: &Path,
    samples: &[ElevationSample],
) -> Result<(), OutputWriteError> {
    let elevations = reduce_elevations(samples);
    write_json_atomically(path, &elevations)?;
    info!(
        "Wrote {} elevations to {}",
        elevations.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::LatLng;

    fn sample(elevation: f64) -> ElevationSample {
        ElevationSample {
            elevation,
            location: LatLng {
                lat: 39.7,
                lng: -104.9,
            },
            resolution: Some(4.77),
        }
    }

    #[test]
    fn test_reduction_matches_full_output() {
        let samples: Vec<ElevationSample> =
            (0..10).map(|i| sample(1600.0 + i as f64)).collect();

        let reduced = reduce_elevations(&samples);

        assert_eq!(reduced.len(), samples.len());
        for (i, elevation) in reduced.iter().enumerate() {
            assert_eq!(*elevation, samples[i].elevation);
        }
    }

    #[test]
    fn test_full_output_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.json");
        let samples = vec![sample(1608.6), sample(12.5)];

        write_full_output(&path, &samples).expect("write should succeed");

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ElevationSample> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn test_elevations_output_is_plain_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elevations.json");
        let samples = vec![sample(1608.6), sample(12.5)];

        write_elevations_output(&path, &samples).expect("write should succeed");

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<f64> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, vec![1608.6, 12.5]);
    }

    #[test]
    fn test_write_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.json");

        write_full_output(&path, &[sample(1.0), sample(2.0)]).unwrap();
        write_full_output(&path, &[sample(3.0)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ElevationSample> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].elevation, 3.0);
    }

    #[test]
    fn test_unwritable_directory_is_write_error() {
        let path = Path::new("/nonexistent-dir/full.json");
        let err = write_full_output(path, &[sample(1.0)]).expect_err("write should fail");
        assert!(matches!(err, OutputWriteError::Write { .. }));
    }
}
