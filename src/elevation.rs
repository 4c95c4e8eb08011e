use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::locations::Point;

/// Google's Elevation API rejects requests with more than 512 locations.
pub const MAX_LOCATIONS_PER_REQUEST: usize = 512;

static ELEVATION_URL: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// One elevation record, matching the Elevation API result object. `location`
/// is the coordinate as echoed back by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub elevation: f64,
    pub location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Elevation lookup capability. One call resolves one chunk of locations and
/// returns the records in request order; batching across chunks lives in
/// [`crate::batch`], not here. Implemented by [`GoogleElevationClient`] and by
/// fakes in tests.
#[async_trait]
pub trait ElevationProvider: Send + Sync {
    async fn lookup(&self, locations: &[Point]) -> Result<Vec<ElevationSample>>;
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationSample>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Encode a location list for the `locations` query parameter.
///
/// Builds both the pipe-joined form (`lat,lng|lat,lng|...`) and the encoded
/// polyline form (`enc:<polyline>`, precision 5) and returns the shorter one.
/// A full 512-location chunk only fits within the API's URL length limit as a
/// polyline, while short lists stay human-readable pipe-joined.
fn encode_locations(locations: &[Point]) -> Result<String> {
    let piped = locations
        .iter()
        .map(|p| format!("{},{}", p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join("|");

    let coords = locations
        .iter()
        .map(|p| geo_types::Coord::from((p.longitude, p.latitude)));
    let encoded = polyline::encode_coordinates(coords, 5)
        .map_err(|e| anyhow!("Failed to polyline-encode locations: {}", e))?;
    let enc = format!("enc:{}", encoded);

    if enc.len() < piped.len() {
        Ok(enc)
    } else {
        Ok(piped)
    }
}

#[derive(Clone)]
pub struct GoogleElevationClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl GoogleElevationClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("elevation-fetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: ELEVATION_URL.to_string(),
            api_key,
            max_retries: 3,
        })
    }

    /// Point the client at a different endpoint, for local test servers.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Single request attempt. `Ok(Err(..))` is a retryable failure,
    /// `Err(..)` is a permanent one.
    async fn attempt(&self, locations_param: &str) -> Result<Result<Vec<ElevationSample>, anyhow::Error>> {
        let params = [("locations", locations_param), ("key", self.api_key.as_str())];

        let response = match self.client.get(&self.base_url).query(&params).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Err(anyhow!("Elevation request failed: {}", e))),
        };

        let status = response.status();
        if !status.is_success() {
            let err = anyhow!("Elevation request failed with HTTP status: {}", status);
            if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Ok(Err(err));
            }
            return Err(err);
        }

        let body: ElevationResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse elevation response: {}", e))?;

        match body.status.as_str() {
            "OK" => Ok(Ok(body.results)),
            "OVER_QUERY_LIMIT" => Ok(Err(anyhow!("Elevation API over query limit"))),
            other => Err(anyhow!(
                "Elevation API returned status {}: {}",
                other,
                body.error_message.as_deref().unwrap_or("no error message")
            )),
        }
    }
}

#[async_trait]
impl ElevationProvider for GoogleElevationClient {
    async fn lookup(&self, locations: &[Point]) -> Result<Vec<ElevationSample>> {
        if locations.is_empty() {
            return Ok(Vec::new());
        }
        if locations.len() > MAX_LOCATIONS_PER_REQUEST {
            return Err(anyhow!(
                "Too many locations for one elevation request: {} (limit {})",
                locations.len(),
                MAX_LOCATIONS_PER_REQUEST
            ));
        }

        let locations_param = encode_locations(locations)?;
        debug!(
            "Requesting elevations for {} locations ({} byte query)",
            locations.len(),
            locations_param.len()
        );

        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            match self.attempt(&locations_param).await? {
                Ok(results) => return Ok(results),
                Err(e) => {
                    if attempt < self.max_retries {
                        warn!(
                            "Elevation request failed, retrying (attempt {}/{}): {}",
                            attempt, self.max_retries, e
                        );
                        tokio::time::sleep(std::time::Duration::from_secs(2u64.pow(attempt - 1)))
                            .await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("All elevation request attempts failed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single_location_stays_piped() {
        let encoded = encode_locations(&[Point::new(38.5, -120.2)]).unwrap();
        assert_eq!(encoded, "38.5,-120.2");
    }

    #[test]
    fn test_encode_large_list_uses_polyline() {
        let locations: Vec<Point> = (0..512)
            .map(|i| Point::new(39.0 + (i as f64) * 0.0001, -104.0 - (i as f64) * 0.0001))
            .collect();

        let encoded = encode_locations(&locations).unwrap();
        assert!(encoded.starts_with("enc:"), "expected polyline: {encoded}");
        // 512 pipe-joined locations would blow the URL length limit
        assert!(encoded.len() < 8192);
    }

    #[test]
    fn test_encode_known_polyline_vector() {
        // Classic polyline test vector from the format documentation
        let locations = vec![
            Point::new(38.5, -120.2),
            Point::new(40.7, -120.95),
            Point::new(43.252, -126.453),
        ];
        let coords = locations
            .iter()
            .map(|p| geo_types::Coord::from((p.longitude, p.latitude)));
        let encoded = polyline::encode_coordinates(coords, 5).unwrap();
        assert_eq!(encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_parse_elevation_response() {
        let json = r#"{
            "results": [
                {
                    "elevation": 1608.637939453125,
                    "location": {"lat": 39.7391536, "lng": -104.9847034},
                    "resolution": 4.771975994110107
                }
            ],
            "status": "OK"
        }"#;

        let response: ElevationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.results.len(), 1);
        assert!((response.results[0].elevation - 1608.64).abs() < 0.01);
        assert_eq!(response.results[0].location.lat, 39.7391536);
    }

    #[test]
    fn test_parse_error_response_without_results() {
        let json = r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#;

        let response: ElevationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "REQUEST_DENIED");
        assert!(response.results.is_empty());
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
    }

    #[test]
    fn test_sample_serialization_roundtrip_omits_missing_resolution() {
        let sample = ElevationSample {
            elevation: 12.5,
            location: LatLng { lat: 1.0, lng: 2.0 },
            resolution: None,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("resolution"));
    }
}
