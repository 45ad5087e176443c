//! Ambient presentation state.
//!
//! Maps the numeric condition code and local day/night into one of a fixed
//! set of presentation themes. Each theme carries a static background image
//! reference and a particle-animation kind for the renderer; the rendering
//! loop itself lives with the UI, not here.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientState {
    Storm,
    Rain,
    Snow,
    Mist,
    Cloudy,
    ClearDay,
    ClearNight,
    Default,
}

/// Which particle system the renderer should run for a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    None,
    Rain,
    Snow,
}

impl AmbientState {
    /// Classify a condition code. `None` or 0 means "no data yet" and maps
    /// to the default theme. Codes 801/802 (light cloud cover) render as
    /// clear: visually indistinguishable from a clear sky.
    pub fn from_code(code: Option<u16>, is_night: bool) -> Self {
        let Some(code) = code.filter(|&c| c != 0) else {
            return AmbientState::Default;
        };

        match code {
            200..=299 => AmbientState::Storm,
            300..=399 | 500..=599 => AmbientState::Rain,
            600..=699 => AmbientState::Snow,
            701 | 721 | 741 => AmbientState::Mist,
            // Remaining atmosphere codes (smoke, dust, ash...) read as cloud.
            700..=799 => AmbientState::Cloudy,
            800..=802 => {
                if is_night {
                    AmbientState::ClearNight
                } else {
                    AmbientState::ClearDay
                }
            }
            803.. => AmbientState::Cloudy,
            _ => AmbientState::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmbientState::Storm => "storm",
            AmbientState::Rain => "rain",
            AmbientState::Snow => "snow",
            AmbientState::Mist => "mist",
            AmbientState::Cloudy => "cloudy",
            AmbientState::ClearDay => "clear-day",
            AmbientState::ClearNight => "clear-night",
            AmbientState::Default => "default",
        }
    }

    /// Static background scene for the theme.
    pub fn background(&self) -> &'static str {
        match self {
            AmbientState::Storm => {
                "https://images.unsplash.com/photo-1605727216801-e27ce1d0cc28?w=1920&q=80&fit=crop"
            }
            AmbientState::Rain => {
                "https://images.unsplash.com/photo-1519692933481-e162a57d6721?w=1920&q=80&fit=crop"
            }
            AmbientState::Snow => {
                "https://images.unsplash.com/photo-1491002052546-bf38f186af56?w=1920&q=80&fit=crop"
            }
            AmbientState::Mist => {
                "https://images.unsplash.com/photo-1487621167305-5d248087c724?w=1920&q=80&fit=crop"
            }
            AmbientState::Cloudy => {
                "https://images.unsplash.com/photo-1534088568595-a066f410bcda?w=1920&q=80&fit=crop"
            }
            AmbientState::ClearNight => {
                "https://images.unsplash.com/photo-1465101162946-4377e57745c3?w=1920&q=80&fit=crop"
            }
            AmbientState::ClearDay | AmbientState::Default => {
                "https://images.unsplash.com/photo-1566228015668-4c45dbc4e2f5?w=1920&q=80&fit=crop"
            }
        }
    }

    /// Rain and storm themes run the rain particle system, snow runs the
    /// snow one; everything else is a static scene.
    pub fn particles(&self) -> ParticleKind {
        match self {
            AmbientState::Rain | AmbientState::Storm => ParticleKind::Rain,
            AmbientState::Snow => ParticleKind::Snow,
            _ => ParticleKind::None,
        }
    }
}

impl std::fmt::Display for AmbientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Night at the place is 18:00–05:59 on its local clock, derived from the
/// record's UTC offset.
pub fn is_night_at(utc_offset_secs: i32, now: DateTime<Utc>) -> bool {
    let local = now + Duration::seconds(i64::from(utc_offset_secs));
    let hour = local.hour();
    hour >= 18 || hour < 6
}
