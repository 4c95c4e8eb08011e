//! elevation-fetch - batch elevation lookups against the Google Maps
//! Elevation API
//!
//! Reads an ordered list of coordinates from a JSON file, queries the API in
//! fixed-size chunks, and writes the full result records plus an
//! elevations-only sequence, both positionally aligned with the input.

pub mod batch;
pub mod commands;
pub mod elevation;
pub mod locations;
pub mod output;

pub use batch::{DEFAULT_CHUNK_SIZE, ElevationFetchError, fetch_elevations};
pub use elevation::{ElevationProvider, ElevationSample, GoogleElevationClient, LatLng};
pub use locations::{InputLoadError, Point, load_locations};
pub use output::OutputWriteError;
