//! Location enrichment via reverse geocoding.
//!
//! Nominatim (OpenStreetMap) refines a coordinate-derived place name with
//! neighbourhood-level detail. A specificity filter rejects names that are
//! really street- or sector-level address fragments, too granular to show
//! as a neighbourhood. Every failure path degrades silently to "no
//! enrichment"; the provider place name is always a usable fallback.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "skycast/0.1.0";
// General zoom level: principal neighbourhoods, not street addresses.
const ZOOM: u8 = 12;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<AddressDetails>,
}

/// The slice of Nominatim's address object the enricher consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressDetails {
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub quarter: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl AddressDetails {
    /// Best neighbourhood-level name: first of neighbourhood, suburb,
    /// quarter that survives the specificity filter. `None` when nothing
    /// displayable remains.
    pub fn best_neighbourhood(&self) -> Option<&str> {
        [&self.neighbourhood, &self.suburb, &self.quarter]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !is_too_specific(name))
    }

    /// Best city-level name: city, town, municipality — no filtering here.
    pub fn best_city(&self) -> Option<&str> {
        [&self.city, &self.town, &self.municipality]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .next()
    }
}

/// Reverse geocode coordinates. `None` covers every failure: transport,
/// non-2xx status, parse error, or an answer with no address block. Callers
/// treat that as "no enrichment available", never as a query failure.
pub async fn lookup(lat: f64, lon: f64, lang: &str) -> Option<AddressDetails> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("failed to build geocoding client: {e}");
            return None;
        }
    };

    let response = match client
        .get(NOMINATIM_URL)
        .query(&[
            ("lat", lat.to_string().as_str()),
            ("lon", lon.to_string().as_str()),
            ("format", "json"),
            ("addressdetails", "1"),
            ("accept-language", lang),
            ("zoom", ZOOM.to_string().as_str()),
        ])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("reverse geocode request failed: {e}");
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("reverse geocode returned status {}", response.status());
        return None;
    }

    let body: ReverseResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("reverse geocode parse error: {e}");
            return None;
        }
    };

    body.address
}

/// Does this name look like an address fragment rather than a
/// neighbourhood? Streets, numbered sectors, highway and kilometer
/// markers, bare numbers, and urbanization/barrio prefixes all indicate a
/// label below neighbourhood granularity.
pub fn is_too_specific(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return true;
    }

    if lower.starts_with("calle")
        || lower.starts_with("avenida")
        || lower.starts_with("carretera")
        || lower.starts_with("urb.")
        || lower.starts_with("bo.")
    {
        return true;
    }

    // "sector 5", "km 12", "pr-52": a keyword followed by digits.
    if prefix_then_digit(&lower, "sector")
        || prefix_then_digit(&lower, "km")
        || prefix_then_digit(&lower, "pr-")
    {
        return true;
    }

    lower.chars().all(|c| c.is_ascii_digit())
}

fn prefix_then_digit(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .map(|rest| rest.trim_start().starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
}
