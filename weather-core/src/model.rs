use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LookupError;

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Display pattern shared by history timestamps and observation times.
/// Renders as e.g. `2024-01-15 13:05 PM` (24-hour clock plus meridiem).
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M %p";

/// A city/country pair supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub city_name: String,
    pub country_code: String,
}

impl Query {
    pub fn new(city_name: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into().trim().to_string(),
            country_code: country_code.into().trim().to_string(),
        }
    }

    /// Both fields must be present before anything goes over the wire.
    pub fn validate(&self) -> Result<(), LookupError> {
        if self.city_name.trim().is_empty() || self.country_code.trim().is_empty() {
            return Err(LookupError::Validation);
        }
        Ok(())
    }

    /// Value of the provider's `q` parameter.
    pub fn provider_query(&self) -> String {
        format!("{},{}", self.city_name, self.country_code)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city_name, self.country_code)
    }
}

/// Normalized result of a successful lookup.
///
/// Temperatures are kept in Kelvin exactly as the provider sent them;
/// `temp_min_k <= temp_max_k` is not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub condition_main: String,
    pub condition_description: String,
    pub temp_min_k: f64,
    pub temp_max_k: f64,
    pub humidity_pct: i64,
    pub observed_at_epoch_seconds: i64,
}

impl WeatherSnapshot {
    pub fn temp_min_c(&self) -> f64 {
        kelvin_to_celsius(self.temp_min_k)
    }

    pub fn temp_max_c(&self) -> f64 {
        kelvin_to_celsius(self.temp_max_k)
    }

    /// `"7.00°C ~ 17.00°C"`
    pub fn temperature_range_display(&self) -> String {
        format!("{:.2}°C ~ {:.2}°C", self.temp_min_c(), self.temp_max_c())
    }

    /// `"Singapore, SG"`
    pub fn location_display(&self) -> String {
        format!("{}, {}", self.location_name, self.country_code)
    }

    /// Observation time in the local time zone.
    pub fn observed_at_display(&self) -> Result<String, LookupError> {
        format_epoch_local(self.observed_at_epoch_seconds)
    }
}

/// A persisted record of one past query plus when it was searched.
///
/// Serialized flat as `{cityName, countryCode, time}`. Entries are never
/// edited in place; the store only adds or drops whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub query: Query,
    #[serde(rename = "time")]
    pub searched_at: String,
}

impl HistoryEntry {
    pub fn new(query: Query, searched_at: impl Into<String>) -> Self {
        Self { query, searched_at: searched_at.into() }
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn format_display_time<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    dt.format(DISPLAY_TIME_FORMAT).to_string()
}

pub fn format_epoch_local(epoch_seconds: i64) -> Result<String, LookupError> {
    let dt = Local.timestamp_opt(epoch_seconds, 0).earliest().ok_or_else(|| {
        LookupError::MalformedResponse(format!("timestamp {epoch_seconds} is out of range"))
    })?;
    Ok(format_display_time(&dt))
}
