use std::time::Duration;

use reqwest::Client;

use crate::types::WeatherError;

/// Build the HTTP client shared by the geocoding, forecast and geolocation services.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, WeatherError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
