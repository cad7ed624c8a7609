//! Pipeline configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `WEATHER_*` environment variables. The CLI applies its own flags on top of
//! the loaded value before validation.

use chrono::NaiveDate;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::DateRange;
use crate::utils::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_proxy"))]
pub struct CollectorConfig {
    #[validate(length(min = 1))]
    pub cities: Vec<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub output_file: PathBuf,

    #[validate(length(min = 1, message = "set WEATHER_API_KEY or api_key in the config file"))]
    pub api_key: String,

    pub use_proxy: bool,

    pub proxy_url: Option<String>,

    pub request_delay_ms: u64,

    pub units: String,

    pub geocoding_url: String,

    pub weather_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AggregatorConfig {
    pub input_dir: PathBuf,

    #[validate(length(min = 1))]
    pub input_pattern: String,

    pub aggregated_file: PathBuf,
}

impl CollectorConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = layered(path)?.build()?.try_deserialize()?;
        Ok(config)
    }

    /// The configured days, rejecting an end date before the start date.
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn request_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_delay_ms)
    }
}

impl AggregatorConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = layered(path)?.build()?.try_deserialize()?;
        Ok(config)
    }
}

fn layered(path: Option<&Path>) -> Result<ConfigBuilder<DefaultState>> {
    let cities: Vec<String> = DEFAULT_CITIES.iter().map(|c| c.to_string()).collect();

    let mut builder = Config::builder()
        .set_default("cities", cities)?
        .set_default("start_date", DEFAULT_START_DATE)?
        .set_default("end_date", DEFAULT_END_DATE)?
        .set_default("output_file", DEFAULT_OUTPUT_FILE)?
        .set_default("api_key", "")?
        .set_default("use_proxy", false)?
        .set_default("request_delay_ms", DEFAULT_REQUEST_DELAY_MS)?
        .set_default("units", DEFAULT_UNITS)?
        .set_default("geocoding_url", GEOCODING_URL)?
        .set_default("weather_url", DAY_SUMMARY_URL)?
        .set_default("input_dir", DEFAULT_INPUT_DIR)?
        .set_default("input_pattern", DEFAULT_INPUT_PATTERN)?
        .set_default("aggregated_file", DEFAULT_AGGREGATED_FILE)?;

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cities"),
    ))
}

fn validate_proxy(config: &CollectorConfig) -> std::result::Result<(), ValidationError> {
    let has_url = config
        .proxy_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());

    if config.use_proxy && !has_url {
        return Err(ValidationError::new("use_proxy requires proxy_url"));
    }
    Ok(())
}
