use skypane_core::ErrorKind;
use skypane_store::{Persistence, Preferences, SavedLocations};

use crate::fetch::{FetchKind, FetchOutcome, FetchRequest};
use crate::state::{DataSource, Tab, ViewStatus, PLACEHOLDER_LABEL};

/// State and actions of the single dashboard screen.
pub struct Dashboard {
    persistence: Persistence,
    prefs: Preferences,
    saved: SavedLocations,
    location_label: String,
    status: ViewStatus,
    tab: Tab,
    geolocation_available: bool,
    last_token: u64,
}

impl Dashboard {
    /// Load preferences and saved locations from `persistence`.
    pub fn new(persistence: Persistence, geolocation_available: bool) -> Self {
        let prefs = persistence.load_preferences();
        let saved = SavedLocations::from_labels(persistence.load_locations());
        tracing::debug!(
            "Loaded preferences {:?} and {} saved locations",
            prefs,
            saved.len()
        );

        Self {
            persistence,
            prefs,
            saved,
            location_label: PLACEHOLDER_LABEL.to_string(),
            status: ViewStatus::Idle,
            tab: Tab::default(),
            geolocation_available,
            last_token: 0,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn saved(&self) -> &SavedLocations {
        &self.saved
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.status.error().map(|kind| kind.user_message())
    }

    /// Initial load for the user's own position.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        self.refresh_current_location()
    }

    /// Search for free text. Blank input is ignored.
    pub fn search(&mut self, query: &str) -> Option<FetchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.issue(FetchKind::Search {
            query: query.to_string(),
        }))
    }

    /// Re-run the search flow for a saved label.
    pub fn select_saved(&mut self, label: &str) -> Option<FetchRequest> {
        self.search(label)
    }

    /// Flip metric/imperial, persist, and refetch the current position in the new units.
    pub fn toggle_units(&mut self) -> Option<FetchRequest> {
        self.prefs.units = self.prefs.units.toggled();
        self.persistence.save_units(self.prefs.units);
        tracing::info!("Units set to {}", self.prefs.units.as_str());
        self.refresh_current_location()
    }

    /// Flip dark/light and persist. Presentation only; nothing is refetched.
    pub fn toggle_theme(&mut self) {
        self.prefs.theme = self.prefs.theme.toggled();
        self.persistence.save_theme(self.prefs.theme);
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Pin the current location label. Returns false if nothing changed.
    pub fn save_current(&mut self) -> bool {
        if self.location_label.is_empty() || self.location_label == PLACEHOLDER_LABEL {
            return false;
        }
        let label = self.location_label.clone();
        let changed = self.saved.save(&label);
        self.persistence.save_locations(self.saved.labels());
        changed
    }

    /// Unpin `label` (exact match). Returns false if it was not saved.
    pub fn remove_saved(&mut self, label: &str) -> bool {
        let changed = self.saved.remove(label);
        self.persistence.save_locations(self.saved.labels());
        changed
    }

    /// Apply a finished fetch. Outcomes of superseded requests are dropped.
    ///
    /// Returns true if the screen changed.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.token != self.last_token {
            tracing::debug!(
                "Dropping stale outcome {} (latest is {})",
                outcome.token,
                self.last_token
            );
            return false;
        }

        match outcome.result {
            Ok(loaded) => {
                self.persistence
                    .save_weather_cache(&loaded.label, &loaded.snapshot);
                self.location_label = loaded.label;
                self.status = ViewStatus::Loaded {
                    snapshot: loaded.snapshot,
                    source: DataSource::Live,
                };
            }
            Err(kind) => {
                if !self.show_cached(&outcome.kind, kind) {
                    self.status = ViewStatus::Failed(kind);
                }
            }
        }
        true
    }

    /// Serve a failed search from the offline cache when an entry exists for the query.
    fn show_cached(&mut self, kind: &FetchKind, error: ErrorKind) -> bool {
        if error != ErrorKind::FetchFailed(kind.origin()) {
            return false;
        }
        let FetchKind::Search { query } = kind else {
            return false;
        };

        match self.persistence.cached_weather(query) {
            Some((label, entry)) => {
                tracing::info!("Showing cached weather for {}", label);
                self.location_label = label;
                self.status = ViewStatus::Loaded {
                    snapshot: entry.data,
                    source: DataSource::Cached {
                        timestamp: entry.timestamp,
                    },
                };
                true
            }
            None => false,
        }
    }

    fn refresh_current_location(&mut self) -> Option<FetchRequest> {
        if !self.geolocation_available {
            // Supersede anything still in flight so it cannot overwrite this error.
            self.last_token += 1;
            self.status = ViewStatus::Failed(ErrorKind::GeolocationUnavailable);
            return None;
        }
        Some(self.issue(FetchKind::CurrentLocation))
    }

    fn issue(&mut self, kind: FetchKind) -> FetchRequest {
        self.last_token += 1;
        self.status = ViewStatus::Loading;
        tracing::debug!("Issuing request {}: {:?}", self.last_token, kind);
        FetchRequest {
            token: self.last_token,
            kind,
            units: self.prefs.units,
        }
    }
}
