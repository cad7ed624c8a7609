pub mod openweather;
pub mod rate_limiter;

pub use openweather::OpenWeatherClient;
pub use rate_limiter::RateLimiter;

use crate::error::Result;
use crate::models::{Coordinates, Row};
use chrono::NaiveDate;

/// Source of geocoding and daily weather data.
///
/// `Ok(None)` means the provider answered but had nothing for the request;
/// callers skip and carry on. `Err` is reserved for failures that should end
/// the run.
pub trait WeatherProvider {
    fn resolve_coordinates(&self, city: &str) -> Result<Option<Coordinates>>;

    /// Daily summary for one location and day, already flattened.
    fn fetch_daily_summary(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Option<Row>>;
}

impl<T: WeatherProvider + ?Sized> WeatherProvider for &T {
    fn resolve_coordinates(&self, city: &str) -> Result<Option<Coordinates>> {
        (**self).resolve_coordinates(city)
    }

    fn fetch_daily_summary(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Option<Row>> {
        (**self).fetch_daily_summary(coordinates, date)
    }
}
