//! Open-Meteo forecast client.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{
    CurrentConditions, DailyPoint, HourlyPoint, Units, WeatherError, WeatherSnapshot,
};

/// Minimum number of hourly points the dashboard needs.
pub const MIN_HOURLY_POINTS: usize = 12;
/// Minimum number of daily points the dashboard needs.
pub const MIN_DAILY_POINTS: usize = 7;

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Retrieves current conditions and forecasts for a position.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current_and_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: ApiCurrent,
    hourly: ApiHourly,
    daily: ApiDaily,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct ApiHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct ApiDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl ForecastResponse {
    fn into_snapshot(self, units: Units) -> Result<WeatherSnapshot, WeatherError> {
        let hourly = self.hourly;
        if hourly.temperature_2m.len() != hourly.time.len()
            || hourly.weather_code.len() != hourly.time.len()
        {
            return Err(WeatherError::Parse("hourly series lengths differ".into()));
        }

        let hourly = hourly
            .time
            .iter()
            .zip(hourly.temperature_2m)
            .zip(hourly.weather_code)
            .map(|((time, temperature), weather_code)| {
                let time = NaiveDateTime::parse_from_str(time, HOURLY_TIME_FORMAT)
                    .map_err(|e| WeatherError::Parse(format!("hourly time {:?}: {}", time, e)))?;
                Ok(HourlyPoint {
                    time,
                    temperature,
                    weather_code,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        let daily = self.daily;
        if daily.weather_code.len() != daily.time.len()
            || daily.temperature_2m_max.len() != daily.time.len()
            || daily.temperature_2m_min.len() != daily.time.len()
        {
            return Err(WeatherError::Parse("daily series lengths differ".into()));
        }

        let daily = daily
            .time
            .iter()
            .zip(daily.weather_code)
            .zip(daily.temperature_2m_max.into_iter().zip(daily.temperature_2m_min))
            .map(|((date, weather_code), (max, min))| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|e| WeatherError::Parse(format!("daily date {:?}: {}", date, e)))?;
                Ok(DailyPoint {
                    date,
                    min,
                    max,
                    weather_code,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        if hourly.len() < MIN_HOURLY_POINTS {
            return Err(WeatherError::Parse(format!(
                "expected at least {} hourly points, got {}",
                MIN_HOURLY_POINTS,
                hourly.len()
            )));
        }
        if daily.len() < MIN_DAILY_POINTS {
            return Err(WeatherError::Parse(format!(
                "expected at least {} daily points, got {}",
                MIN_DAILY_POINTS,
                daily.len()
            )));
        }

        Ok(WeatherSnapshot {
            units,
            current: CurrentConditions {
                temperature: self.current.temperature_2m,
                humidity_percent: self.current.relative_humidity_2m.round().clamp(0.0, 100.0)
                    as u8,
                wind_speed: self.current.wind_speed_10m,
                weather_code: self.current.weather_code,
            },
            hourly,
            daily,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn query(latitude: f64, longitude: f64, units: Units) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code".to_string(),
            ),
            ("hourly", "temperature_2m,weather_code".to_string()),
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", "auto".to_string()),
            ("forecast_days", MIN_DAILY_POINTS.to_string()),
        ];
        if units == Units::Imperial {
            query.push(("temperature_unit", "fahrenheit".to_string()));
            query.push(("wind_speed_unit", "mph".to_string()));
        }
        query
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch_current_and_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query(latitude, longitude, units))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("forecast response: {}", e)))?;

        let snapshot = body.into_snapshot(units)?;
        tracing::debug!(
            "Fetched forecast: {} hourly, {} daily points",
            snapshot.hourly.len(),
            snapshot.daily.len()
        );
        Ok(snapshot)
    }
}
