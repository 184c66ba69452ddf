use skypane_core::ErrorKind;
use skypane_weather::WeatherSnapshot;

/// Label shown until the first location resolves.
pub const PLACEHOLDER_LABEL: &str = "Detecting location…";

/// Which forecast strip is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Hourly,
    #[default]
    Daily,
}

impl Tab {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Where the displayed snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Served from the offline cache; `timestamp` is epoch millis of when it was stored.
    Cached { timestamp: i64 },
}

/// What the weather card is showing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded {
        snapshot: WeatherSnapshot,
        source: DataSource,
    },
    Failed(ErrorKind),
}

impl ViewStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            ViewStatus::Loaded { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            ViewStatus::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}
