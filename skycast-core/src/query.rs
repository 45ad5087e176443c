//! Query orchestration.
//!
//! One dashboard query fans out to both providers (and, for coordinate
//! queries, the reverse geocoder) concurrently, joins the settled results,
//! reconciles, samples the forecast, and applies location enrichment. A
//! failed source degrades to "unavailable" instead of aborting the query;
//! only losing every source is fatal.
//!
//! Query lifecycle is an explicit state machine rather than a pile of
//! loading/error flags: idle → loading → success or error, with retries
//! re-entering loading.

use crate::{
    ambient::{self, AmbientState},
    config::Config,
    error::WeatherError,
    forecast,
    geocode,
    model::{CanonicalWeather, DaySample, LocationSuggestion, ProviderReading},
    provider::{CurrentSource, Place, ProviderId, source_from_config},
    provider::weatherapi::WeatherApiProvider,
    reconcile,
};
use chrono::Utc;

/// Everything a rendered dashboard needs for one settled query.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub weather: CanonicalWeather,
    pub outlook: Vec<DaySample>,
    pub ambient: AmbientState,
}

/// Lifecycle of one user query.
#[derive(Debug, Clone, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Success(DashboardData),
    Error(String),
}

/// Immutable-result state machine over [`QueryState`]. Submission moves to
/// loading, settlement moves to success or error, and a retry is just
/// another submission.
#[derive(Debug, Default)]
pub struct Session {
    state: QueryState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// A query was submitted (or retried).
    pub fn begin(&mut self) {
        self.state = QueryState::Loading;
    }

    /// Every fan-out call has settled.
    pub fn settle(&mut self, outcome: Result<DashboardData, WeatherError>) {
        self.state = match outcome {
            Ok(data) => QueryState::Success(data),
            Err(e) => QueryState::Error(e.to_string()),
        };
    }
}

/// The fetch engine behind a session: holds whichever providers are
/// configured and runs the fan-out for each query.
#[derive(Debug)]
pub struct WeatherQuery {
    openweather: Option<Box<dyn CurrentSource>>,
    weatherapi: Option<WeatherApiProvider>,
    lang: String,
}

impl WeatherQuery {
    /// Build from config. Requires at least one configured provider.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let openweather = source_from_config(ProviderId::OpenWeather, config);
        let weatherapi = config
            .provider_api_key(ProviderId::WeatherApi)
            .map(|key| WeatherApiProvider::new(key.to_owned(), config.language().to_owned()));

        if openweather.is_none() && weatherapi.is_none() {
            return Err(WeatherError::NoProviders);
        }

        Ok(Self {
            openweather,
            weatherapi,
            lang: config.language().to_owned(),
        })
    }

    /// Run one full dashboard query: current conditions from both sources,
    /// the 5-day outlook, and — for coordinate queries — neighbourhood
    /// enrichment.
    pub async fn run(&self, place: &Place) -> Result<DashboardData, WeatherError> {
        let (wa, ow, points) = tokio::join!(
            settle_current(self.weatherapi_source(), place),
            settle_current(self.openweather.as_deref(), place),
            self.fetch_outlook(place),
        );

        let mut weather = reconcile::reconcile(wa, ow)?;
        let outlook = forecast::daily_outlook(&points);

        if let Place::Coords { lat, lon } = *place {
            enrich(&mut weather, lat, lon, &self.lang).await;
        }

        let is_night = ambient::is_night_at(weather.utc_offset_secs, Utc::now());
        let ambient = AmbientState::from_code(Some(weather.condition.code), is_night);

        Ok(DashboardData {
            weather,
            outlook,
            ambient,
        })
    }

    /// The forecast series comes from WeatherAPI alone; a failure (or a
    /// missing key) degrades to an empty outlook rather than failing the
    /// whole query.
    async fn fetch_outlook(&self, place: &Place) -> Vec<crate::model::ForecastPoint> {
        let Some(provider) = &self.weatherapi else {
            return Vec::new();
        };

        match provider.forecast(place).await {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!(%place, "forecast unavailable: {e:#}");
                Vec::new()
            }
        }
    }

    /// Place autocomplete, for callers implementing type-ahead. The
    /// debounce window and last-request-wins rule are the interactive
    /// caller's responsibility; this call is stateless.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, WeatherError> {
        let provider = self
            .weatherapi
            .as_ref()
            .ok_or(WeatherError::NotConfigured(ProviderId::WeatherApi))?;

        provider.search(query).await.map_err(WeatherError::from)
    }

    fn weatherapi_source(&self) -> Option<&dyn CurrentSource> {
        self.weatherapi
            .as_ref()
            .map(|p| p as &dyn CurrentSource)
    }
}

/// Resolve one provider call to "reading or unavailable". Transport
/// failures are logged and swallowed here so the reconciler sees a plain
/// `Option`.
async fn settle_current(
    source: Option<&dyn CurrentSource>,
    place: &Place,
) -> Option<ProviderReading> {
    let source = source?;

    match source.current(place).await {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!(provider = %source.id(), %place, "source unavailable: {e:#}");
            None
        }
    }
}

/// Apply geocoder overrides: a neighbourhood only when it differs from the
/// provider place name, and a region only when a neighbourhood was
/// accepted. Lookup failure leaves the record untouched.
async fn enrich(weather: &mut CanonicalWeather, lat: f64, lon: f64, lang: &str) {
    let Some(addr) = geocode::lookup(lat, lon, lang).await else {
        return;
    };

    if let Some(hood) = addr.best_neighbourhood() {
        if hood != weather.place {
            weather.neighbourhood = Some(hood.to_string());
        }
    }

    if let Some(city) = addr.best_city() {
        if city != weather.place && weather.neighbourhood.is_some() {
            weather.region_override = Some(city.to_string());
        }
    }
}
