//! Network work behind a dashboard request.

use std::sync::Arc;

use skypane_core::{ErrorKind, FetchOrigin};
use skypane_weather::{Geolocator, LocationResolver, Units, WeatherSource, WeatherSnapshot};

use crate::error_mapping::{location_error_kind, weather_error_kind};

/// The external services a fetch may use.
#[derive(Clone)]
pub struct Services {
    /// `None` when this machine has no way to determine its position.
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub resolver: Arc<dyn LocationResolver>,
    pub weather: Arc<dyn WeatherSource>,
}

impl Services {
    pub fn geolocation_available(&self) -> bool {
        self.geolocator.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    /// Locate the user, name their area, fetch its weather.
    CurrentLocation,
    /// Geocode `query`, fetch weather for the best match.
    Search { query: String },
}

impl FetchKind {
    pub fn origin(&self) -> FetchOrigin {
        match self {
            FetchKind::CurrentLocation => FetchOrigin::CurrentLocation,
            FetchKind::Search { .. } => FetchOrigin::Search,
        }
    }
}

/// A fetch the dashboard wants performed. `token` identifies it when the outcome returns.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub token: u64,
    pub kind: FetchKind,
    pub units: Units,
}

/// A successfully loaded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub label: String,
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub token: u64,
    pub kind: FetchKind,
    pub result: Result<Loaded, ErrorKind>,
}

/// Run `request` against `services`. All failures are folded into the outcome.
pub async fn execute(request: FetchRequest, services: &Services) -> FetchOutcome {
    let result = match &request.kind {
        FetchKind::CurrentLocation => load_current_location(services, request.units).await,
        FetchKind::Search { query } => load_search(services, query, request.units).await,
    };

    FetchOutcome {
        token: request.token,
        kind: request.kind,
        result,
    }
}

async fn load_current_location(services: &Services, units: Units) -> Result<Loaded, ErrorKind> {
    let geolocator = services
        .geolocator
        .as_ref()
        .ok_or(ErrorKind::GeolocationUnavailable)?;

    let position = geolocator
        .current_position()
        .await
        .map_err(|e| location_error_kind(&e))?;

    let label = services
        .resolver
        .resolve_area(position.latitude, position.longitude)
        .await;

    let snapshot = services
        .weather
        .fetch_current_and_forecast(position.latitude, position.longitude, units)
        .await
        .map_err(|e| weather_error_kind(&e, FetchOrigin::CurrentLocation))?;

    Ok(Loaded { label, snapshot })
}

async fn load_search(services: &Services, query: &str, units: Units) -> Result<Loaded, ErrorKind> {
    let geo = services
        .resolver
        .resolve_coordinates(query)
        .await
        .map_err(|e| weather_error_kind(&e, FetchOrigin::Search))?
        .ok_or(ErrorKind::LocationNotFound)?;

    let snapshot = services
        .weather
        .fetch_current_and_forecast(geo.lat, geo.lon, units)
        .await
        .map_err(|e| weather_error_kind(&e, FetchOrigin::Search))?;

    Ok(Loaded {
        label: geo.short_label().to_string(),
        snapshot,
    })
}
