use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use shared::GeoPoint;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing provider returned no route")]
    NoRoute,
}

/// External shortest-path provider, treated as a black box returning a
/// cycling polyline for an ordered set of waypoints. The core never retries
/// it and inherits its timeout.
pub trait RouteProvider: Send + Sync {
    fn shortest_path(
        &self,
        waypoints: &[GeoPoint],
    ) -> impl Future<Output = Result<Vec<GeoPoint>, ProviderError>> + Send;
}

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "bike".to_string(),
            timeout_secs: 10,
        }
    }
}

/// OSRM HTTP adapter for shortest cycling paths.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RouteProvider for OsrmClient {
    async fn shortest_path(&self, waypoints: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        let coords = waypoints
            .iter()
            .map(|point| format!("{},{}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url, self.config.profile, coords
        );

        let body: OsrmRouteResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let route = body.routes.into_iter().next().ok_or(ProviderError::NoRoute)?;
        tracing::debug!(
            "routing provider returned {} points for {} waypoints",
            route.geometry.coordinates.len(),
            waypoints.len()
        );

        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| GeoPoint { lat, lng })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

// GeoJSON LineString: coordinates are [lng, lat] pairs
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}
