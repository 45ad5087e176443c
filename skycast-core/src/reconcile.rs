//! Multi-source reconciliation.
//!
//! Takes up to two normalized readings and produces the one canonical
//! record the rest of the app consumes. With both sources present the
//! numeric fields are averaged; the condition code comes from the source
//! with a native numeric taxonomy (OpenWeather) while the localized
//! description, icon and location fields come from the other (WeatherAPI).
//! A single surviving source passes through verbatim. No sources is a hard
//! failure, never a zero-filled record.

use chrono::{DateTime, NaiveTime};

use crate::{
    conditions,
    error::WeatherError,
    model::{CanonicalWeather, Condition, ProviderReading, SunTime},
};

/// Merge the two provider readings into the canonical record.
///
/// `weatherapi` supplies display text and location detail, `openweather`
/// supplies the condition code and the authoritative UTC offset. Either
/// side may be absent (its call failed); both absent is `NoData`.
pub fn reconcile(
    weatherapi: Option<ProviderReading>,
    openweather: Option<ProviderReading>,
) -> Result<CanonicalWeather, WeatherError> {
    match (weatherapi, openweather) {
        (Some(wa), Some(ow)) => Ok(merge(wa, ow)),
        (Some(single), None) | (None, Some(single)) => Ok(from_single(single)),
        (None, None) => Err(WeatherError::NoData),
    }
}

fn merge(wa: ProviderReading, ow: ProviderReading) -> CanonicalWeather {
    let humidity = mean_rounded(wa.humidity_pct.into(), ow.humidity_pct.into()) as u8;
    let pressure = mean_rounded(wa.pressure_hpa, ow.pressure_hpa) as u32;

    let condition = Condition {
        // Code-bearing source wins the ambient-state-relevant code...
        code: ow.condition_code,
        label: conditions::label_for(ow.condition_code).to_string(),
        // ...the richer localized text drives on-screen copy.
        description: wa.description,
        icon: wa.icon,
    };

    CanonicalWeather {
        temp_f: (wa.temp_f + ow.temp_f) / 2.0,
        feels_like_f: (wa.feels_like_f + ow.feels_like_f) / 2.0,
        humidity_pct: humidity,
        pressure_hpa: pressure,
        wind_mph: (wa.wind_mph + ow.wind_mph) / 2.0,
        wind_deg: wa.wind_deg,
        visibility_m: wa.visibility_m,
        cloud_pct: wa.cloud_pct,
        condition,
        observed_at: wa.observed_at,
        sunrise_epoch: resolve_sun_time(wa.sunrise.as_ref(), wa.observed_at),
        sunset_epoch: resolve_sun_time(wa.sunset.as_ref(), wa.observed_at),
        // OpenWeather's offset is native; WeatherAPI's is a longitude guess.
        utc_offset_secs: ow.utc_offset_secs,
        place: wa.place,
        region: wa.region,
        country: wa.country,
        latitude: wa.latitude,
        longitude: wa.longitude,
        neighbourhood: None,
        region_override: None,
    }
}

fn from_single(r: ProviderReading) -> CanonicalWeather {
    let condition = Condition {
        code: r.condition_code,
        label: conditions::label_for(r.condition_code).to_string(),
        description: r.description,
        icon: r.icon,
    };

    CanonicalWeather {
        temp_f: r.temp_f,
        feels_like_f: r.feels_like_f,
        humidity_pct: r.humidity_pct,
        pressure_hpa: r.pressure_hpa.round() as u32,
        wind_mph: r.wind_mph,
        wind_deg: r.wind_deg,
        visibility_m: r.visibility_m,
        cloud_pct: r.cloud_pct,
        condition,
        observed_at: r.observed_at,
        sunrise_epoch: resolve_sun_time(r.sunrise.as_ref(), r.observed_at),
        sunset_epoch: resolve_sun_time(r.sunset.as_ref(), r.observed_at),
        utc_offset_secs: r.utc_offset_secs,
        place: r.place,
        region: r.region,
        country: r.country,
        latitude: r.latitude,
        longitude: r.longitude,
        neighbourhood: None,
        region_override: None,
    }
}

fn mean_rounded(a: f64, b: f64) -> f64 {
    ((a + b) / 2.0).round()
}

/// Resolve a provider sun time to epoch seconds. Clock strings ("06:31 AM")
/// are anchored to the UTC calendar date of the observation timestamp. An
/// unparseable string degrades to 0 rather than failing the record.
fn resolve_sun_time(sun: Option<&SunTime>, observed_at: i64) -> i64 {
    match sun {
        None => 0,
        Some(SunTime::Epoch(ts)) => *ts,
        Some(SunTime::Clock(text)) => {
            let date = DateTime::from_timestamp(observed_at, 0).map(|dt| dt.date_naive());
            let time = NaiveTime::parse_from_str(text.trim(), "%I:%M %p");

            match (date, time) {
                (Some(d), Ok(t)) => d.and_time(t).and_utc().timestamp(),
                _ => {
                    tracing::warn!(clock = %text, "unparseable sun time, degrading to 0");
                    0
                }
            }
        }
    }
}
