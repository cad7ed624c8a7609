use crate::api::WeatherProvider;
use crate::config::CollectorConfig;
use crate::error::Result;
use crate::models::{Coordinates, Row};
use crate::processors::flattener::{flatten_json, is_empty_document};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::Proxy;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    lat: f64,
    lon: f64,
}

/// Blocking client for the OpenWeather geocoding and One Call day summary APIs.
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    geocoding_url: String,
    weather_url: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn from_config(config: &CollectorConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if config.use_proxy {
            if let Some(proxy_url) = config.proxy_url.as_deref() {
                debug!(proxy = proxy_url, "Routing requests through proxy");
                builder = builder.proxy(Proxy::all(proxy_url)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            geocoding_url: config.geocoding_url.clone(),
            weather_url: config.weather_url.clone(),
            units: config.units.clone(),
        })
    }

    /// GET `url` and decode the body, `None` for error statuses and empty bodies.
    ///
    /// Errors are stripped of the request URL, which carries the API key.
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Option<Value>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%status, url, body = %body.trim(), "Lookup answered with an error status");
            return Ok(None);
        }

        let value: Value = response.json().map_err(reqwest::Error::without_url)?;
        if is_empty_document(&value) {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

impl WeatherProvider for OpenWeatherClient {
    fn resolve_coordinates(&self, city: &str) -> Result<Option<Coordinates>> {
        debug!(city, "Resolving coordinates");
        let query = [("q", city.to_string()), ("limit", "1".to_string())];

        match self.get_json(&self.geocoding_url, &query)? {
            Some(value) => parse_geocoding(value),
            None => Ok(None),
        }
    }

    fn fetch_daily_summary(&self, coordinates: Coordinates, date: NaiveDate) -> Result<Option<Row>> {
        let date = date.format("%Y-%m-%d").to_string();
        debug!(%coordinates, date = %date, "Fetching day summary");
        let query = [
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
            ("date", date),
            ("units", self.units.clone()),
        ];

        Ok(self
            .get_json(&self.weather_url, &query)?
            .and_then(|value| parse_day_summary(&value)))
    }
}

/// First match of a geocoding answer.
pub fn parse_geocoding(value: Value) -> Result<Option<Coordinates>> {
    let matches: Vec<GeocodingMatch> = serde_json::from_value(value)?;
    matches
        .first()
        .map(|m| Coordinates::new(m.lat, m.lon))
        .transpose()
}

pub fn parse_day_summary(value: &Value) -> Option<Row> {
    let row = flatten_json(value);
    (!row.is_empty()).then_some(row)
}
