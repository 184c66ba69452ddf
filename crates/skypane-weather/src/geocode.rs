//! Geocoding: place names for coordinates and coordinates for place names.
//!
//! Reverse lookups use Nominatim (OpenStreetMap); forward lookups use the
//! Open-Meteo geocoding API. Neither requires an API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{GeoResult, WeatherError};

/// Shown when no address detail could be resolved for the current position.
pub const FALLBACK_AREA: &str = "Your Area";

/// Turns coordinates into an area name and free text into coordinates.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Most specific area name for a position. Never fails; falls back to [`FALLBACK_AREA`].
    async fn resolve_area(&self, latitude: f64, longitude: f64) -> String;

    /// Best match for a free-text query, or `None` when nothing matches.
    async fn resolve_coordinates(&self, query: &str) -> Result<Option<GeoResult>, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    suburb: Option<String>,
    locality: Option<String>,
    neighbourhood: Option<String>,
    village: Option<String>,
    town: Option<String>,
    municipality: Option<String>,
    city: Option<String>,
}

impl NominatimAddress {
    /// Prefer the smallest named area; a city is only used when nothing finer exists.
    fn most_specific(self) -> Option<String> {
        [
            self.suburb,
            self.locality,
            self.neighbourhood,
            self.village,
            self.town,
            self.municipality,
            self.city,
        ]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

impl From<SearchHit> for GeoResult {
    fn from(hit: SearchHit) -> Self {
        let label = match hit.country.filter(|c| !c.is_empty()) {
            Some(country) => format!("{}, {}", hit.name, country),
            None => hit.name,
        };
        GeoResult {
            label,
            lat: hit.latitude,
            lon: hit.longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    search_url: String,
    reverse_url: String,
}

impl GeocodeClient {
    pub fn new(client: Client, search_url: &str, reverse_url: &str) -> Self {
        Self {
            client,
            search_url: search_url.to_string(),
            reverse_url: reverse_url.to_string(),
        }
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let response = match self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "18".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        body.address.and_then(NominatimAddress::most_specific)
    }
}

#[async_trait]
impl LocationResolver for GeocodeClient {
    #[instrument(skip(self), level = "info")]
    async fn resolve_area(&self, latitude: f64, longitude: f64) -> String {
        match self.reverse(latitude, longitude).await {
            Some(area) => {
                tracing::info!("Reverse geocoded to: {}", area);
                area
            }
            None => FALLBACK_AREA.to_string(),
        }
    }

    #[instrument(skip(self), level = "info")]
    async fn resolve_coordinates(&self, query: &str) -> Result<Option<GeoResult>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("geocoding response: {}", e)))?;

        let result = body.results.into_iter().next().map(GeoResult::from);
        match &result {
            Some(geo) => tracing::debug!(
                "Geocoded {:?} to {} ({}, {})",
                query,
                geo.label,
                geo.lat,
                geo.lon
            ),
            None => tracing::debug!("No geocoding match for {:?}", query),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeocodeClient {
        GeocodeClient::new(
            Client::new(),
            &format!("{}/v1/search", server.uri()),
            &format!("{}/reverse", server.uri()),
        )
    }

    #[test]
    fn test_most_specific_prefers_suburb() {
        let address = NominatimAddress {
            suburb: Some("Gardens".into()),
            town: Some("Somewhere".into()),
            city: Some("Cape Town".into()),
            ..Default::default()
        };
        assert_eq!(address.most_specific().as_deref(), Some("Gardens"));
    }

    #[test]
    fn test_most_specific_skips_blank_fields() {
        let address = NominatimAddress {
            suburb: Some("  ".into()),
            village: Some("Greyton".into()),
            ..Default::default()
        };
        assert_eq!(address.most_specific().as_deref(), Some("Greyton"));
    }

    #[test]
    fn test_most_specific_empty_address() {
        assert_eq!(NominatimAddress::default().most_specific(), None);
    }

    #[tokio::test]
    async fn test_resolve_area_city_only() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .and(query_param("addressdetails", "1"))
            .and(query_param("zoom", "18"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": { "city": "Durban", "country": "South Africa" }
            })))
            .mount(&server)
            .await;

        let area = client_for(&server).resolve_area(-29.85, 31.02).await;
        assert_eq!(area, "Durban");
    }

    #[tokio::test]
    async fn test_resolve_area_empty_address_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "address": {} })),
            )
            .mount(&server)
            .await;

        let area = client_for(&server).resolve_area(0.0, 0.0).await;
        assert_eq!(area, "Your Area");
    }

    #[tokio::test]
    async fn test_resolve_area_server_error_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let area = client_for(&server).resolve_area(10.0, 10.0).await;
        assert_eq!(area, FALLBACK_AREA);
    }

    #[tokio::test]
    async fn test_resolve_area_garbage_body_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let area = client_for(&server).resolve_area(10.0, 10.0).await;
        assert_eq!(area, FALLBACK_AREA);
    }

    #[tokio::test]
    async fn test_resolve_coordinates_first_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Cape Town"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "name": "Cape Town",
                        "latitude": -33.92,
                        "longitude": 18.42,
                        "country": "South Africa",
                        "admin1": "Western Cape"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let geo = client_for(&server)
            .resolve_coordinates("  Cape Town ")
            .await
            .unwrap()
            .expect("a match");

        assert_eq!(geo.label, "Cape Town, South Africa");
        assert_eq!(geo.lat, -33.92);
        assert_eq!(geo.lon, 18.42);
    }

    #[tokio::test]
    async fn test_resolve_coordinates_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.5
            })))
            .mount(&server)
            .await;

        let geo = client_for(&server).resolve_coordinates("Atlantis").await.unwrap();
        assert!(geo.is_none());
    }

    #[tokio::test]
    async fn test_resolve_coordinates_blank_query_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let geo = client_for(&server).resolve_coordinates("   ").await.unwrap();
        assert!(geo.is_none());
    }

    #[tokio::test]
    async fn test_resolve_coordinates_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).resolve_coordinates("Paris").await;
        assert!(matches!(result, Err(WeatherError::Status(503))));
    }
}
