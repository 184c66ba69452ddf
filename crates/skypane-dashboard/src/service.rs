//! Background fetching: network work runs on the tokio runtime, results come back via mpsc.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::fetch::{execute, FetchOutcome, FetchRequest, Services};

/// Messages sent from spawned fetches back to the front end.
#[derive(Debug)]
pub enum DashboardMessage {
    FetchDone(FetchOutcome),
}

/// Run `request` in the background. Sends `FetchDone` on the channel when complete.
///
/// Must be called from within a tokio runtime.
pub fn spawn_fetch(
    tx: &UnboundedSender<DashboardMessage>,
    services: Arc<Services>,
    request: FetchRequest,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let token = request.token;
        let outcome = execute(request, &services).await;
        if tx.send(DashboardMessage::FetchDone(outcome)).is_err() {
            tracing::debug!("Receiver gone, dropping outcome {}", token);
        }
    });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::fetch::FetchKind;
    use async_trait::async_trait;
    use skypane_core::ErrorKind;
    use skypane_weather::{
        GeoResult, LocationResolver, Units, WeatherError, WeatherSnapshot, WeatherSource,
    };
    use tokio::sync::mpsc;

    struct NoMatches;

    #[async_trait]
    impl LocationResolver for NoMatches {
        async fn resolve_area(&self, _latitude: f64, _longitude: f64) -> String {
            "Nowhere".to_string()
        }

        async fn resolve_coordinates(
            &self,
            _query: &str,
        ) -> Result<Option<GeoResult>, WeatherError> {
            Ok(None)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl WeatherSource for Unreachable {
        async fn fetch_current_and_forecast(
            &self,
            _latitude: f64,
            _longitude: f64,
            _units: Units,
        ) -> Result<WeatherSnapshot, WeatherError> {
            Err(WeatherError::Status(503))
        }
    }

    #[tokio::test]
    async fn test_spawn_fetch_sends_outcome() {
        let services = Arc::new(Services {
            geolocator: None,
            resolver: Arc::new(NoMatches),
            weather: Arc::new(Unreachable),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_fetch(
            &tx,
            services,
            FetchRequest {
                token: 7,
                kind: FetchKind::Search {
                    query: "Atlantis".into(),
                },
                units: Units::Metric,
            },
        );

        let DashboardMessage::FetchDone(outcome) = rx.recv().await.unwrap();
        assert_eq!(outcome.token, 7);
        assert_eq!(outcome.result, Err(ErrorKind::LocationNotFound));
    }

    #[tokio::test]
    async fn test_spawn_fetch_without_geolocator() {
        let services = Arc::new(Services {
            geolocator: None,
            resolver: Arc::new(NoMatches),
            weather: Arc::new(Unreachable),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_fetch(
            &tx,
            services,
            FetchRequest {
                token: 1,
                kind: FetchKind::CurrentLocation,
                units: Units::Metric,
            },
        );

        let DashboardMessage::FetchDone(outcome) = rx.recv().await.unwrap();
        assert_eq!(outcome.result, Err(ErrorKind::GeolocationUnavailable));
    }
}
