use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// Sunrise/sunset as reported by a provider. OpenWeather sends epoch
/// seconds; WeatherAPI sends a local clock string ("06:45 AM") that only
/// becomes an epoch once combined with the observation date (reconciler's
/// job, not the normalizer's).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SunTime {
    Epoch(i64),
    Clock(String),
}

/// One provider's current conditions after unit/schema normalization:
/// temperatures in °F, wind in mph, pressure in hPa, visibility in meters,
/// timestamps in epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReading {
    pub source: ProviderId,
    pub temp_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_mph: f64,
    pub wind_deg: u16,
    pub visibility_m: f64,
    pub cloud_pct: u8,
    pub condition_code: u16,
    pub description: String,
    pub icon: String,
    pub observed_at: i64,
    pub sunrise: Option<SunTime>,
    pub sunset: Option<SunTime>,
    pub utc_offset_secs: i32,
    pub place: String,
    pub region: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Condition in the numeric taxonomy plus the human-facing strings that
/// accompany it on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u16,
    pub label: String,
    pub description: String,
    pub icon: String,
}

/// The single reconciled weather record all downstream consumers read.
///
/// When both providers answered, numeric fields are the arithmetic mean of
/// the two readings (humidity and pressure rounded to integers after
/// averaging). `neighbourhood` and `region_override` start empty and are
/// filled by the location enricher for coordinate queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalWeather {
    pub temp_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_mph: f64,
    pub wind_deg: u16,
    pub visibility_m: f64,
    pub cloud_pct: u8,
    pub condition: Condition,
    pub observed_at: i64,
    /// Epoch seconds; 0 when the provider string could not be resolved.
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
    pub utc_offset_secs: i32,
    pub place: String,
    pub region: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub neighbourhood: Option<String>,
    pub region_override: Option<String>,
}

impl CanonicalWeather {
    /// Name shown as the headline location: enriched neighbourhood when one
    /// was accepted, otherwise the provider place name.
    pub fn display_place(&self) -> &str {
        self.neighbourhood.as_deref().unwrap_or(&self.place)
    }
}

/// One hourly/3-hourly forecast entry, already normalized to imperial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub epoch: i64,
    pub temp_f: f64,
    pub humidity_pct: u8,
    pub wind_mph: f64,
    pub condition_code: u16,
    pub description: String,
    pub icon: String,
}

/// One day of the 5-day outlook. Min/max are true extrema over every point
/// of the day; condition/humidity/wind come from the representative point
/// closest to local noon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySample {
    pub date: NaiveDate,
    pub temp_max_f: f64,
    pub temp_min_f: f64,
    pub condition: Condition,
    pub humidity_pct: u8,
    pub wind_mph: f64,
}

/// An autocomplete hit from the place search. Ephemeral UI state, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl LocationSuggestion {
    /// "Name, Region, Country" with the region dropped when it repeats the
    /// name, and empty parts skipped.
    pub fn format_display_name(name: &str, region: &str, country: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !name.is_empty() {
            parts.push(name);
        }
        if !region.is_empty() && region != name {
            parts.push(region);
        }
        if !country.is_empty() {
            parts.push(country);
        }
        parts.join(", ")
    }

    /// Query string to feed back into a weather lookup when the user picks
    /// this suggestion.
    pub fn search_query(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}
