use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{ProviderReading, SunTime};

use super::{CurrentSource, Place, ProviderId};

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeather: the code-bearing source. Its responses carry a native
/// numeric condition id and a real UTC offset, so the reconciler prefers it
/// for those fields.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, lang: String) -> Self {
        Self {
            api_key,
            lang,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, place: &Place) -> Result<ProviderReading> {
        let mut query = vec![
            ("appid".to_string(), self.api_key.clone()),
            ("units".to_string(), "imperial".to_string()),
            ("lang".to_string(), self.lang.clone()),
        ];
        match place {
            Place::Name(name) => query.push(("q".to_string(), name.clone())),
            Place::Coords { lat, lon } => {
                query.push(("lat".to_string(), lat.to_string()));
                query.push(("lon".to_string(), lon.to_string()));
            }
        }

        let res = self
            .http
            .get(CURRENT_URL)
            .query(&query)
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(normalize_current(parsed))
    }
}

#[async_trait]
impl CurrentSource for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current(&self, place: &Place) -> Result<ProviderReading> {
        self.fetch_current(place).await
    }
}

/// Shape the raw response into canonical units. Requested with
/// `units=imperial`, so temperatures are already °F and wind is mph;
/// visibility is already meters and the UTC offset is native.
fn normalize_current(raw: OwCurrentResponse) -> ProviderReading {
    let (code, description, icon_id) = match raw.weather.into_iter().next() {
        // An empty weather array degrades to "clear", never panics.
        None => (800, "Unknown".to_string(), "01d".to_string()),
        Some(w) => (w.id, w.description, w.icon),
    };

    ProviderReading {
        source: ProviderId::OpenWeather,
        temp_f: raw.main.temp,
        feels_like_f: raw.main.feels_like,
        humidity_pct: raw.main.humidity,
        pressure_hpa: raw.main.pressure,
        wind_mph: raw.wind.speed,
        wind_deg: raw.wind.deg.unwrap_or(0.0).rem_euclid(360.0) as u16,
        visibility_m: raw.visibility.unwrap_or(0.0),
        cloud_pct: raw.clouds.map(|c| c.all).unwrap_or(0),
        condition_code: code,
        description,
        icon: format!("https://openweathermap.org/img/wn/{icon_id}@2x.png"),
        observed_at: raw.dt,
        sunrise: raw.sys.sunrise.map(SunTime::Epoch),
        sunset: raw.sys.sunset.map(SunTime::Epoch),
        utc_offset_secs: raw.timezone,
        place: raw.name,
        region: None,
        country: raw.sys.country.unwrap_or_default(),
        latitude: raw.coord.lat,
        longitude: raw.coord.lon,
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    visibility: Option<f64>,
    wind: OwWind,
    clouds: Option<OwClouds>,
    dt: i64,
    sys: OwSys,
    timezone: i32,
    name: String,
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
        "coord": {"lon": -66.1057, "lat": 18.4663},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 87.6, "feels_like": 94.1, "pressure": 1014, "humidity": 66},
        "visibility": 10000,
        "wind": {"speed": 16.1, "deg": 100},
        "clouds": {"all": 75},
        "dt": 1700000000,
        "sys": {"country": "PR", "sunrise": 1699959600, "sunset": 1700000400},
        "timezone": -14400,
        "name": "San Juan"
    }"#;

    #[test]
    fn normalizes_current_fixture() {
        let raw: OwCurrentResponse = serde_json::from_str(FIXTURE).unwrap();
        let reading = normalize_current(raw);

        assert_eq!(reading.source, ProviderId::OpenWeather);
        assert_eq!(reading.temp_f, 87.6);
        assert_eq!(reading.feels_like_f, 94.1);
        assert_eq!(reading.humidity_pct, 66);
        assert_eq!(reading.pressure_hpa, 1014.0);
        assert_eq!(reading.wind_mph, 16.1);
        assert_eq!(reading.wind_deg, 100);
        assert_eq!(reading.visibility_m, 10000.0);
        assert_eq!(reading.cloud_pct, 75);
        assert_eq!(reading.condition_code, 803);
        assert_eq!(reading.description, "broken clouds");
        assert_eq!(
            reading.icon,
            "https://openweathermap.org/img/wn/04d@2x.png"
        );
        assert_eq!(reading.observed_at, 1700000000);
        assert_eq!(reading.sunrise, Some(SunTime::Epoch(1699959600)));
        assert_eq!(reading.sunset, Some(SunTime::Epoch(1700000400)));
        assert_eq!(reading.utc_offset_secs, -14400);
        assert_eq!(reading.place, "San Juan");
        assert_eq!(reading.region, None);
        assert_eq!(reading.country, "PR");
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let minimal = r#"{
            "coord": {"lon": 0.0, "lat": 0.0},
            "weather": [],
            "main": {"temp": 70.0, "feels_like": 70.0, "pressure": 1013, "humidity": 50},
            "wind": {"speed": 5.0},
            "dt": 1700000000,
            "sys": {},
            "timezone": 0,
            "name": "Null Island"
        }"#;

        let raw: OwCurrentResponse = serde_json::from_str(minimal).unwrap();
        let reading = normalize_current(raw);

        assert_eq!(reading.condition_code, 800);
        assert_eq!(reading.wind_deg, 0);
        assert_eq!(reading.visibility_m, 0.0);
        assert_eq!(reading.cloud_pct, 0);
        assert_eq!(reading.sunrise, None);
        assert_eq!(reading.country, "");
    }
}
