use crate::{Config, model::ProviderReading};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// Where to look up the weather: a free-text place name, or coordinates
/// from geolocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Name(String),
    Coords { lat: f64, lon: f64 },
}

impl Place {
    /// Query string both providers accept ("City, Country" or "lat,lon").
    pub fn query(&self) -> String {
        match self {
            Place::Name(name) => name.clone(),
            Place::Coords { lat, lon } => format!("{lat},{lon}"),
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query())
    }
}

/// A source of current conditions. Each implementation owns its transport
/// call and normalizes its own response shape into a `ProviderReading`
/// (imperial units, epoch timestamps) before handing it back.
#[async_trait]
pub trait CurrentSource: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn current(&self, place: &Place) -> anyhow::Result<ProviderReading>;
}

/// Construct a current-conditions source from config and explicit ProviderId.
pub fn source_from_config(
    id: ProviderId,
    config: &Config,
) -> Option<Box<dyn CurrentSource>> {
    let api_key = config.provider_api_key(id)?;
    let lang = config.language().to_owned();

    let boxed: Box<dyn CurrentSource> = match id {
        ProviderId::OpenWeather => {
            Box::new(openweather::OpenWeatherProvider::new(api_key.to_owned(), lang))
        }
        ProviderId::WeatherApi => {
            Box::new(weatherapi::WeatherApiProvider::new(api_key.to_owned(), lang))
        }
    };

    Some(boxed)
}

/// Fallback UTC offset when a provider does not report one: one hour per
/// 15 degrees of longitude. An approximation, never authoritative.
pub(crate) fn estimate_utc_offset(longitude: f64) -> i32 {
    (longitude / 15.0).round() as i32 * 3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn place_query_strings() {
        assert_eq!(Place::Name("San Juan".into()).query(), "San Juan");
        assert_eq!(
            Place::Coords { lat: 18.47, lon: -66.11 }.query(),
            "18.47,-66.11"
        );
    }

    #[test]
    fn source_from_config_none_without_api_key() {
        let cfg = Config::default();
        assert!(source_from_config(ProviderId::OpenWeather, &cfg).is_none());
    }

    #[test]
    fn source_from_config_builds_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());

        let source = source_from_config(ProviderId::WeatherApi, &cfg);
        assert!(source.is_some());
        assert_eq!(source.unwrap().id(), ProviderId::WeatherApi);
    }

    #[test]
    fn utc_offset_estimate_from_longitude() {
        // San Juan, PR: -66.1° → UTC-4 approximation (-66.1/15 ≈ -4.4 → -4)
        assert_eq!(estimate_utc_offset(-66.1), -4 * 3600);
        assert_eq!(estimate_utc_offset(0.0), 0);
        assert_eq!(estimate_utc_offset(142.0), 9 * 3600);
        // Rounds toward the nearer meridian, not truncates.
        assert_eq!(estimate_utc_offset(-7.6), -3600);
    }
}
