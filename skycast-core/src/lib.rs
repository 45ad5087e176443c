//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Provider transport and per-provider unit/schema normalization
//! - The reconciliation core: condition-code mapping, multi-source merge,
//!   forecast day sampling, location enrichment, ambient-state derivation
//! - Query orchestration with an explicit idle/loading/success/error
//!   state machine
//!
//! It is used by `skycast-cli`, but can also be reused by other frontends.

pub mod ambient;
pub mod conditions;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod query;
pub mod reconcile;

pub use ambient::{AmbientState, ParticleKind};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::{
    CanonicalWeather, Condition, DaySample, ForecastPoint, LocationSuggestion, ProviderReading,
    SunTime,
};
pub use provider::{CurrentSource, Place, ProviderId};
pub use query::{DashboardData, QueryState, Session, WeatherQuery};
