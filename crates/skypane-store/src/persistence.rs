//! Typed accessors over the key-value store.
//!
//! Each entry is read and written independently. Loads fall back to a default when the
//! entry is absent or fails to parse; saves log and swallow write failures so a broken
//! disk never takes the dashboard down.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use skypane_weather::{Units, WeatherSnapshot};

use crate::prefs::{Preferences, Theme};
use crate::store::KeyValueStore;

pub const UNITS_KEY: &str = "skypane.units";
pub const THEME_KEY: &str = "skypane.theme";
pub const LOCATIONS_KEY: &str = "skypane.locations";
pub const WEATHER_KEY: &str = "skypane.weather";

/// A cached snapshot and when it was stored (epoch millis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCacheEntry {
    pub data: WeatherSnapshot,
    pub timestamp: i64,
}

/// Cached snapshots keyed by location label.
pub type WeatherCache = BTreeMap<String, WeatherCacheEntry>;

pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load_units(&self) -> Units {
        self.store
            .get(UNITS_KEY)
            .and_then(|v| Units::parse(&v))
            .unwrap_or_default()
    }

    pub fn save_units(&self, units: Units) {
        self.write(UNITS_KEY, units.as_str());
    }

    pub fn load_theme(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) {
        self.write(THEME_KEY, theme.as_str());
    }

    pub fn load_preferences(&self) -> Preferences {
        Preferences {
            units: self.load_units(),
            theme: self.load_theme(),
        }
    }

    pub fn save_preferences(&self, prefs: &Preferences) {
        self.save_units(prefs.units);
        self.save_theme(prefs.theme);
    }

    pub fn load_locations(&self) -> Vec<String> {
        self.read_json(LOCATIONS_KEY).unwrap_or_default()
    }

    pub fn save_locations(&self, labels: &[String]) {
        self.write_json(LOCATIONS_KEY, &labels);
    }

    pub fn load_weather_cache(&self) -> WeatherCache {
        self.read_json(WEATHER_KEY).unwrap_or_default()
    }

    /// Store `snapshot` under `label`, replacing any older entry for that label.
    pub fn save_weather_cache(&self, label: &str, snapshot: &WeatherSnapshot) {
        self.save_weather_cache_at(label, snapshot, Utc::now().timestamp_millis());
    }

    fn save_weather_cache_at(&self, label: &str, snapshot: &WeatherSnapshot, timestamp: i64) {
        let mut cache = self.load_weather_cache();
        cache.insert(
            label.to_string(),
            WeatherCacheEntry {
                data: snapshot.clone(),
                timestamp,
            },
        );
        self.write_json(WEATHER_KEY, &cache);
    }

    /// Cached entry for `label`, matched exactly or else ignoring case.
    ///
    /// Returns the label the entry was stored under alongside it.
    pub fn cached_weather(&self, label: &str) -> Option<(String, WeatherCacheEntry)> {
        let mut cache = self.load_weather_cache();
        if let Some(entry) = cache.remove(label) {
            return Some((label.to_string(), entry));
        }
        let key = cache
            .keys()
            .find(|key| key.to_lowercase() == label.to_lowercase())?
            .clone();
        cache.remove_entry(&key)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Discarding malformed {} entry: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write(key, &json),
            Err(e) => tracing::warn!("Failed to serialize {} entry: {}", key, e),
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {} entry: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use chrono::{NaiveDate, NaiveDateTime};
    use skypane_weather::{CurrentConditions, DailyPoint, HourlyPoint};

    fn persistence_with(entries: &[(&str, &str)]) -> Persistence {
        Persistence::new(Box::new(MemoryStore::with_entries(
            entries.iter().map(|(k, v)| (*k, *v)),
        )))
    }

    fn snapshot(temperature: f64) -> WeatherSnapshot {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        WeatherSnapshot {
            units: Units::Metric,
            current: CurrentConditions {
                temperature,
                humidity_percent: 70,
                wind_speed: 9.5,
                weather_code: 1,
            },
            hourly: (0..12)
                .map(|h| HourlyPoint {
                    time: start + chrono::Duration::hours(h),
                    temperature,
                    weather_code: 1,
                })
                .collect(),
            daily: (0..7)
                .map(|d| DailyPoint {
                    date: start.date() + chrono::Duration::days(d),
                    min: temperature - 5.0,
                    max: temperature + 5.0,
                    weather_code: 1,
                })
                .collect(),
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let p = persistence_with(&[]);
        assert_eq!(p.load_units(), Units::Metric);
        assert_eq!(p.load_theme(), Theme::Dark);
        assert!(p.load_locations().is_empty());
        assert!(p.load_weather_cache().is_empty());
    }

    #[test]
    fn test_defaults_when_malformed() {
        let p = persistence_with(&[
            (UNITS_KEY, "kelvin"),
            (THEME_KEY, "\"light\""),
            (LOCATIONS_KEY, "[\"unterminated"),
            (WEATHER_KEY, "[1, 2, 3]"),
        ]);
        assert_eq!(p.load_units(), Units::Metric);
        assert_eq!(p.load_theme(), Theme::Dark);
        assert!(p.load_locations().is_empty());
        assert!(p.load_weather_cache().is_empty());
    }

    #[test]
    fn test_locations_of_wrong_type_are_default() {
        let p = persistence_with(&[(LOCATIONS_KEY, "[1, 2]")]);
        assert!(p.load_locations().is_empty());
    }

    #[test]
    fn test_units_round_trip() {
        let p = persistence_with(&[]);
        p.save_units(Units::Imperial);
        assert_eq!(p.load_units(), Units::Imperial);
        p.save_units(Units::Metric);
        assert_eq!(p.load_units(), Units::Metric);
    }

    #[test]
    fn test_theme_round_trip() {
        let p = persistence_with(&[]);
        p.save_theme(Theme::Light);
        assert_eq!(p.load_theme(), Theme::Light);
    }

    #[test]
    fn test_preferences_round_trip() {
        let p = persistence_with(&[]);
        let prefs = Preferences {
            units: Units::Imperial,
            theme: Theme::Light,
        };
        p.save_preferences(&prefs);
        assert_eq!(p.load_preferences(), prefs);
    }

    #[test]
    fn test_locations_round_trip() {
        let p = persistence_with(&[]);
        let labels = vec!["Cape Town".to_string(), "Zürich".to_string()];
        p.save_locations(&labels);
        assert_eq!(p.load_locations(), labels);
    }

    #[test]
    fn test_weather_cache_round_trip() {
        let p = persistence_with(&[]);
        p.save_weather_cache_at("Cape Town", &snapshot(21.0), 1_700_000_000_000);

        let (label, entry) = p.cached_weather("Cape Town").unwrap();
        assert_eq!(label, "Cape Town");
        assert_eq!(entry.data, snapshot(21.0));
        assert_eq!(entry.timestamp, 1_700_000_000_000);
        assert!(p.cached_weather("Durban").is_none());
    }

    #[test]
    fn test_weather_cache_lookup_ignores_case() {
        let p = persistence_with(&[]);
        p.save_weather_cache("Cape Town", &snapshot(21.0));
        p.save_weather_cache("cape town", &snapshot(9.0));
        p.save_weather_cache("São Paulo", &snapshot(30.0));

        let (label, entry) = p.cached_weather("cape town").unwrap();
        assert_eq!(label, "cape town");
        assert_eq!(entry.data.current.temperature, 9.0);

        let (label, entry) = p.cached_weather("SÃO PAULO").unwrap();
        assert_eq!(label, "São Paulo");
        assert_eq!(entry.data.current.temperature, 30.0);
    }

    #[test]
    fn test_weather_cache_overwrites_by_label() {
        let p = persistence_with(&[]);
        p.save_weather_cache("Cape Town", &snapshot(21.0));
        p.save_weather_cache("Durban", &snapshot(27.0));
        p.save_weather_cache("Cape Town", &snapshot(18.0));

        let cache = p.load_weather_cache();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache["Cape Town"].data.current.temperature, 18.0);
        assert!(cache["Cape Town"].timestamp > 0);
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let p = Persistence::new(Box::new(BrokenStore));
        p.save_units(Units::Imperial);
        p.save_locations(&["A".to_string()]);
        p.save_weather_cache("A", &snapshot(1.0));
        assert_eq!(p.load_units(), Units::Metric);
    }

    #[test]
    fn test_hourly_times_survive_cache() {
        let p = persistence_with(&[]);
        let snap = snapshot(5.0);
        p.save_weather_cache("X", &snap);
        let (_, cached) = p.cached_weather("X").unwrap();
        let first: NaiveDateTime = cached.data.hourly[0].time;
        assert_eq!(first, snap.hourly[0].time);
    }
}
