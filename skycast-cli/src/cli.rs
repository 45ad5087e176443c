use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use skycast_core::{
    Config, DashboardData, ParticleKind, Place, ProviderId, QueryState, Session, WeatherQuery,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Reconciled dual-provider weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Show current reconciled conditions for a place.
    Show {
        /// Place name, e.g. "San Juan" or "Madrid, Spain".
        place: Option<String>,

        /// Coordinates instead of a name, e.g. --coords 18.47,-66.12.
        /// Enables neighbourhood enrichment.
        #[arg(long, value_name = "LAT,LON", conflicts_with = "place")]
        coords: Option<String>,
    },

    /// Show the 5-day outlook for a place.
    Forecast {
        /// Place name.
        place: Option<String>,

        /// Coordinates instead of a name.
        #[arg(long, value_name = "LAT,LON", conflicts_with = "place")]
        coords: Option<String>,
    },

    /// Look up place suggestions for a partial name.
    Search {
        /// At least 2 characters of a place name.
        query: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { place, coords } => {
                let place = resolve_place(place, coords)?;
                let data = run_query(&place).await?;
                print_current(&data);
                Ok(())
            }
            Command::Forecast { place, coords } => {
                let place = resolve_place(place, coords)?;
                let data = run_query(&place).await?;
                print_outlook(&data);
                Ok(())
            }
            Command::Search { query } => search(&query).await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!(
        "Saved credentials for '{id}' to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn resolve_place(place: Option<String>, coords: Option<String>) -> anyhow::Result<Place> {
    if let Some(raw) = coords {
        return parse_coords(&raw);
    }

    match place {
        Some(name) if !name.trim().is_empty() => Ok(Place::Name(name)),
        _ => Err(anyhow!(
            "No place given. Pass a place name (e.g. `skycast show \"San Juan\"`) \
             or coordinates via --coords LAT,LON."
        )),
    }
}

fn parse_coords(raw: &str) -> anyhow::Result<Place> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Coordinates must look like LAT,LON (e.g. 18.47,-66.12)"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("Invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("Invalid longitude '{}'", lon.trim()))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("Coordinates out of range: latitude ±90, longitude ±180");
    }

    Ok(Place::Coords { lat, lon })
}

/// Drive the query state machine through one submission and render nothing
/// but the settled outcome.
async fn run_query(place: &Place) -> anyhow::Result<DashboardData> {
    let config = Config::load()?;
    let query = WeatherQuery::from_config(&config)?;

    let mut session = Session::new();
    session.begin();
    session.settle(query.run(place).await);

    match session.state() {
        QueryState::Success(data) => Ok(data.clone()),
        QueryState::Error(message) => Err(anyhow!("{message}")),
        // One submission always settles; these states cannot be observed here.
        QueryState::Idle | QueryState::Loading => unreachable!("query did not settle"),
    }
}

fn print_current(data: &DashboardData) {
    let w = &data.weather;

    let mut location = w.display_place().to_string();
    if let Some(region) = w.region_override.as_deref().or(w.region.as_deref()) {
        if region != location {
            location = format!("{location}, {region}");
        }
    }
    if !w.country.is_empty() {
        location = format!("{location}, {}", w.country);
    }

    println!("{location}");
    println!(
        "  {}  {:.0}°F (feels like {:.0}°F)",
        render::capitalize_first(&w.condition.description),
        w.temp_f,
        w.feels_like_f
    );
    println!(
        "  Humidity {}%   Pressure {} hPa   Visibility {:.1} km",
        w.humidity_pct,
        w.pressure_hpa,
        w.visibility_m / 1000.0
    );
    println!(
        "  Wind {:.1} mph {}   Clouds {}%",
        w.wind_mph,
        render::wind_direction(w.wind_deg),
        w.cloud_pct
    );
    println!(
        "  Sunrise {}   Sunset {}",
        render::local_time(w.sunrise_epoch, w.utc_offset_secs),
        render::local_time(w.sunset_epoch, w.utc_offset_secs)
    );

    let particles = match data.ambient.particles() {
        ParticleKind::Rain => " (rain animation)",
        ParticleKind::Snow => " (snow animation)",
        ParticleKind::None => "",
    };
    println!("  Ambient: {}{particles}", data.ambient);

    if !data.outlook.is_empty() {
        println!();
        print_outlook(data);
    }
}

fn print_outlook(data: &DashboardData) {
    if data.outlook.is_empty() {
        println!("No forecast available.");
        return;
    }

    println!("5-day outlook:");
    for day in &data.outlook {
        println!(
            "  {}  {:>3.0}° / {:>3.0}°  {:<24} 💧{}%  💨{:.1} mph",
            render::day_heading(day.date),
            day.temp_max_f,
            day.temp_min_f,
            render::capitalize_first(&day.condition.description),
            day.humidity_pct,
            day.wind_mph
        );
    }
}

async fn search(query: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let engine = WeatherQuery::from_config(&config)?;

    let hits = engine.search(query).await?;
    if hits.is_empty() {
        println!("No places found for '{query}'.");
        return Ok(());
    }

    for hit in hits {
        println!(
            "  {}  ({:.2}, {:.2})",
            hit.display_name, hit.latitude, hit.longitude
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_pairs() {
        let place = parse_coords("18.47,-66.12").unwrap();
        assert_eq!(place, Place::Coords { lat: 18.47, lon: -66.12 });

        let place = parse_coords(" 40.4 , -3.7 ").unwrap();
        assert_eq!(place, Place::Coords { lat: 40.4, lon: -3.7 });
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(parse_coords("18.47").is_err());
        assert!(parse_coords("abc,def").is_err());
        assert!(parse_coords("95.0,10.0").is_err());
        assert!(parse_coords("10.0,200.0").is_err());
    }

    #[test]
    fn resolve_place_requires_name_or_coords() {
        assert!(resolve_place(None, None).is_err());
        assert!(resolve_place(Some("  ".into()), None).is_err());

        let place = resolve_place(Some("Ponce".into()), None).unwrap();
        assert_eq!(place, Place::Name("Ponce".into()));

        let place = resolve_place(None, Some("1.0,2.0".into())).unwrap();
        assert_eq!(place, Place::Coords { lat: 1.0, lon: 2.0 });
    }
}
