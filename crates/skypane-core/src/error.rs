//! User-facing error taxonomy for the dashboard.
//!
//! Every failure that reaches the screen is one of these kinds. Service crates keep their
//! own detailed error types; the dashboard maps them down to an `ErrorKind` at the
//! boundary and only ever displays `user_message()`.

use thiserror::Error;

/// Which flow a fetch failure happened in. The two flows report different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Geolocation-driven refresh of the user's own area.
    CurrentLocation,
    /// Free-text search or a saved-location selection.
    Search,
}

/// Errors surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("geolocation unavailable")]
    GeolocationUnavailable,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location not found")]
    LocationNotFound,

    #[error("fetch failed ({0:?})")]
    FetchFailed(FetchOrigin),
}

impl ErrorKind {
    /// Returns the short message shown inline on the dashboard.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::GeolocationUnavailable => "Geolocation not supported",
            ErrorKind::PermissionDenied => "Location permission denied",
            ErrorKind::LocationNotFound => "Location not found",
            ErrorKind::FetchFailed(FetchOrigin::CurrentLocation) => {
                "Unable to load weather for your area"
            }
            ErrorKind::FetchFailed(FetchOrigin::Search) => "Search failed",
        }
    }
}
