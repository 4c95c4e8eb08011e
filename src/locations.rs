use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Input records come from hand-maintained or exported JSON, so accept the
/// common shapes: `[lat, lng]` pairs and `{"lat": .., "lng": ..}` /
/// `{"latitude": .., "longitude": ..}` objects, mixed freely within one file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocationRecord {
    Pair([f64; 2]),
    LatLng { lat: f64, lng: f64 },
    Long { latitude: f64, longitude: f64 },
}

impl From<LocationRecord> for Point {
    fn from(record: LocationRecord) -> Self {
        match record {
            LocationRecord::Pair([lat, lng]) => Point::new(lat, lng),
            LocationRecord::LatLng { lat, lng } => Point::new(lat, lng),
            LocationRecord::Long {
                latitude,
                longitude,
            } => Point::new(latitude, longitude),
        }
    }
}

#[derive(Debug, Error)]
pub enum InputLoadError {
    #[error("failed to read location file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("location file {path} is not a JSON array of coordinates: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("location {index} is out of range: ({latitude}, {longitude})")]
    OutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
}

fn validate(index: usize, point: &Point) -> Result<(), InputLoadError> {
    let ok = point.latitude.is_finite()
        && point.longitude.is_finite()
        && (-90.0..=90.0).contains(&point.latitude)
        && (-180.0..=180.0).contains(&point.longitude);
    if ok {
        Ok(())
    } else {
        Err(InputLoadError::OutOfRange {
            index,
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

/// Load the full coordinate sequence from a JSON file. Order is preserved;
/// every coordinate is validated before any network call happens.
pub fn load_locations(path: &Path) -> Result<Vec<Point>, InputLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| InputLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<LocationRecord> =
        serde_json::from_str(&contents).map_err(|source| InputLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let points: Vec<Point> = records.into_iter().map(Point::from).collect();

    for (index, point) in points.iter().enumerate() {
        validate(index, point)?;
    }

    debug!("Loaded {} locations from {}", points.len(), path.display());

    Ok(points)
}
