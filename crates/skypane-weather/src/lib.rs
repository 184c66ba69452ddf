//! Weather and location services for Skypane
//!
//! Forecasts come from Open-Meteo, place names from Nominatim (reverse) and the
//! Open-Meteo geocoding API (forward). The current position comes from a pluggable
//! [`Geolocator`].

pub mod codes;
pub mod geocode;
pub mod http;
pub mod location;
pub mod provider;
pub mod types;

pub use codes::{weather_code_to_emoji, weather_code_to_text};
pub use geocode::{GeocodeClient, LocationResolver, FALLBACK_AREA};
pub use http::build_client;
pub use location::{DisabledGeolocator, FixedGeolocator, Geolocator, IpGeolocator};
pub use provider::{WeatherProvider, WeatherSource};
pub use types::*;
