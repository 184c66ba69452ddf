//! Durable key-value persistence for Skypane.
//!
//! Four independent entries live in the store: units preference, theme preference,
//! saved locations and the weather cache. Reads never fail; anything absent or
//! malformed comes back as the default.

pub mod persistence;
pub mod prefs;
pub mod saved;
pub mod store;

pub use persistence::{Persistence, WeatherCache, WeatherCacheEntry};
pub use prefs::{Preferences, Theme};
pub use saved::SavedLocations;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
