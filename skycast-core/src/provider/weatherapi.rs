use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    conditions,
    model::{ForecastPoint, LocationSuggestion, ProviderReading, SunTime},
    provider::estimate_utc_offset,
};

use super::{CurrentSource, Place, ProviderId};

const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
const SEARCH_URL: &str = "https://api.weatherapi.com/v1/search.json";

/// WeatherAPI: the text-bearing source. It has no numeric condition
/// taxonomy (its own codes are unrelated), so the normalizer derives one
/// from the localized description text. It is also the only source for the
/// 5-day forecast series and the place-name autocomplete.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    lang: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, lang: String) -> Self {
        Self {
            api_key,
            lang,
            http: Client::new(),
        }
    }

    async fn fetch_forecast_days(&self, place: &Place, days: u8) -> Result<WaForecastResponse> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", place.query().as_str()),
                ("days", days.to_string().as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read WeatherAPI forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")
    }

    /// 5-day hourly forecast series, thinned to 3-hourly points. The day
    /// sampler reduces this to one entry per calendar date.
    pub async fn forecast(&self, place: &Place) -> Result<Vec<ForecastPoint>> {
        let parsed = self.fetch_forecast_days(place, 5).await?;
        Ok(normalize_forecast(parsed))
    }

    /// Free-text place autocomplete. Queries shorter than 2 characters
    /// return nothing without touching the network.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>> {
        let query = query.trim();
        if query.len() < 2 {
            return Ok(Vec::new());
        }

        let res = self
            .http
            .get(SEARCH_URL)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (search)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read WeatherAPI search response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI search request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: Vec<WaSearchItem> =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI search JSON")?;

        Ok(parsed.into_iter().map(normalize_suggestion).collect())
    }
}

#[async_trait]
impl CurrentSource for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn current(&self, place: &Place) -> Result<ProviderReading> {
        // A one-day forecast call, not current.json: it is the only shape
        // that carries the astro block with sunrise/sunset.
        let parsed = self.fetch_forecast_days(place, 1).await?;
        Ok(normalize_current(parsed))
    }
}

/// Shape the raw response into canonical units: °F and mph are native
/// fields, `pressure_mb` is already hPa, visibility converts km → m. The
/// UTC offset is estimated from longitude (the payload has none), and
/// sunrise/sunset stay as local clock strings for the reconciler to
/// resolve.
fn normalize_current(raw: WaForecastResponse) -> ProviderReading {
    let loc = raw.location;
    let cur = raw.current;
    let astro = raw
        .forecast
        .forecastday
        .into_iter()
        .next()
        .map(|d| d.astro);

    let region = Some(loc.region).filter(|r| !r.is_empty());

    ProviderReading {
        source: ProviderId::WeatherApi,
        temp_f: cur.temp_f,
        feels_like_f: cur.feelslike_f,
        humidity_pct: cur.humidity,
        pressure_hpa: cur.pressure_mb,
        wind_mph: cur.wind_mph,
        wind_deg: cur.wind_degree.unwrap_or(0.0).rem_euclid(360.0) as u16,
        visibility_m: cur.vis_km * 1000.0,
        cloud_pct: cur.cloud,
        condition_code: conditions::code_from_description(&cur.condition.text),
        description: cur.condition.text,
        icon: absolute_icon_url(&cur.condition.icon),
        observed_at: cur
            .last_updated_epoch
            .or(loc.localtime_epoch)
            .unwrap_or(0),
        sunrise: astro.as_ref().and_then(|a| a.sunrise.clone()).map(SunTime::Clock),
        sunset: astro.as_ref().and_then(|a| a.sunset.clone()).map(SunTime::Clock),
        utc_offset_secs: estimate_utc_offset(loc.lon),
        place: loc.name,
        region,
        country: loc.country,
        latitude: loc.lat,
        longitude: loc.lon,
    }
}

/// Flatten the per-day hour arrays into one ordered series, keeping every
/// third hour (3-hourly resolution is plenty for the day sampler).
fn normalize_forecast(raw: WaForecastResponse) -> Vec<ForecastPoint> {
    raw.forecast
        .forecastday
        .into_iter()
        .flat_map(|day| {
            day.hour
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| idx % 3 == 0)
                .map(|(_, hour)| ForecastPoint {
                    epoch: hour.time_epoch,
                    temp_f: hour.temp_f,
                    humidity_pct: hour.humidity,
                    wind_mph: hour.wind_mph,
                    condition_code: conditions::code_from_description(&hour.condition.text),
                    description: hour.condition.text,
                    icon: absolute_icon_url(&hour.condition.icon),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn normalize_suggestion(item: WaSearchItem) -> LocationSuggestion {
    let display_name =
        LocationSuggestion::format_display_name(&item.name, &item.region, &item.country);

    LocationSuggestion {
        id: item.id,
        name: item.name,
        region: item.region,
        country: item.country,
        latitude: item.lat,
        longitude: item.lon,
        display_name,
    }
}

/// WeatherAPI icon refs come protocol-relative ("//cdn.weatherapi.com/...").
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_f: f64,
    feelslike_f: f64,
    humidity: u8,
    pressure_mb: f64,
    wind_mph: f64,
    wind_degree: Option<f64>,
    vis_km: f64,
    #[serde(default)]
    cloud: u8,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct WaAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time_epoch: i64,
    temp_f: f64,
    humidity: u8,
    wind_mph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    #[serde(default)]
    astro: WaAstro,
    #[serde(default)]
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize, Default)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    #[serde(default)]
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaSearchItem {
    id: i64,
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "location": {
            "name": "San Juan",
            "region": "San Juan",
            "country": "Puerto Rico",
            "lat": 18.47,
            "lon": -66.12,
            "localtime_epoch": 1700001000
        },
        "current": {
            "last_updated_epoch": 1700000100,
            "temp_f": 88.0,
            "feelslike_f": 95.2,
            "humidity": 70,
            "pressure_mb": 1013.0,
            "wind_mph": 14.8,
            "wind_degree": 95,
            "vis_km": 10.0,
            "cloud": 50,
            "condition": {
                "text": "Parcialmente nublado",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png"
            }
        },
        "forecast": {
            "forecastday": [
                {
                    "astro": {"sunrise": "06:31 AM", "sunset": "05:56 PM"},
                    "hour": [
                        {"time_epoch": 1699963200, "temp_f": 79.0, "humidity": 80, "wind_mph": 9.0,
                         "condition": {"text": "Clear", "icon": ""}},
                        {"time_epoch": 1699966800, "temp_f": 78.5, "humidity": 81, "wind_mph": 8.5,
                         "condition": {"text": "Clear", "icon": ""}},
                        {"time_epoch": 1699970400, "temp_f": 78.1, "humidity": 82, "wind_mph": 8.2,
                         "condition": {"text": "Clear", "icon": ""}},
                        {"time_epoch": 1699974000, "temp_f": 77.9, "humidity": 83, "wind_mph": 8.0,
                         "condition": {"text": "Partly cloudy", "icon": ""}}
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn normalizes_current_fixture() {
        let raw: WaForecastResponse = serde_json::from_str(FIXTURE).unwrap();
        let reading = normalize_current(raw);

        assert_eq!(reading.source, ProviderId::WeatherApi);
        assert_eq!(reading.temp_f, 88.0);
        assert_eq!(reading.feels_like_f, 95.2);
        assert_eq!(reading.humidity_pct, 70);
        assert_eq!(reading.pressure_hpa, 1013.0);
        assert_eq!(reading.wind_mph, 14.8);
        assert_eq!(reading.wind_deg, 95);
        // km → m conversion.
        assert_eq!(reading.visibility_m, 10000.0);
        assert_eq!(reading.cloud_pct, 50);
        // Spanish description mapped onto the numeric taxonomy.
        assert_eq!(reading.condition_code, 801);
        assert_eq!(reading.description, "Parcialmente nublado");
        assert!(reading.icon.starts_with("https://cdn.weatherapi.com/"));
        assert_eq!(reading.observed_at, 1700000100);
        assert_eq!(reading.sunrise, Some(SunTime::Clock("06:31 AM".into())));
        assert_eq!(reading.sunset, Some(SunTime::Clock("05:56 PM".into())));
        // Estimated from longitude: -66.12 / 15 ≈ -4.4 → UTC-4.
        assert_eq!(reading.utc_offset_secs, -4 * 3600);
        assert_eq!(reading.place, "San Juan");
        assert_eq!(reading.region.as_deref(), Some("San Juan"));
        assert_eq!(reading.country, "Puerto Rico");
    }

    #[test]
    fn forecast_thins_to_every_third_hour() {
        let raw: WaForecastResponse = serde_json::from_str(FIXTURE).unwrap();
        let points = normalize_forecast(raw);

        // 4 hourly entries → indices 0 and 3 survive.
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].epoch, 1699963200);
        assert_eq!(points[1].epoch, 1699974000);
        assert_eq!(points[1].condition_code, 801);
    }

    #[test]
    fn falls_back_to_localtime_epoch() {
        let raw: WaForecastResponse = serde_json::from_str(FIXTURE).unwrap();
        let mut raw = raw;
        raw.current.last_updated_epoch = None;
        let reading = normalize_current(raw);
        assert_eq!(reading.observed_at, 1700001000);
    }

    #[test]
    fn suggestion_carries_display_name() {
        let item: WaSearchItem = serde_json::from_str(
            r#"{"id": 315, "name": "Ponce", "region": "Ponce", "country": "Puerto Rico",
                "lat": 18.01, "lon": -66.61}"#,
        )
        .unwrap();

        let s = normalize_suggestion(item);
        assert_eq!(s.display_name, "Ponce, Puerto Rico");
        assert_eq!(s.search_query(), "Ponce, Puerto Rico");
    }

    #[test]
    fn icon_url_already_absolute_is_untouched() {
        assert_eq!(absolute_icon_url("https://x/y.png"), "https://x/y.png");
        assert_eq!(
            absolute_icon_url("//cdn.weatherapi.com/a.png"),
            "https://cdn.weatherapi.com/a.png"
        );
    }
}
