//! Maps service errors to the user-facing `ErrorKind`.
//! Details are logged here; only the kind travels on to the screen.

use skypane_core::{ErrorKind, FetchOrigin};
use skypane_weather::{LocationError, WeatherError};

/// Any failure to obtain a position reads as a refusal. "Not supported" is reserved
/// for having no geolocator at all.
pub fn location_error_kind(error: &LocationError) -> ErrorKind {
    match error {
        LocationError::PermissionDenied => tracing::info!("Geolocation refused"),
        LocationError::ServiceUnavailable(reason) => {
            tracing::warn!("Geolocation service unavailable: {}", reason)
        }
    }
    ErrorKind::PermissionDenied
}

pub fn weather_error_kind(error: &WeatherError, origin: FetchOrigin) -> ErrorKind {
    tracing::warn!("Fetch failed ({:?}): {}", origin, error);
    ErrorKind::FetchFailed(origin)
}
