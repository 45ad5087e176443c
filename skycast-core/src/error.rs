use crate::provider::ProviderId;

/// Failure taxonomy for a dashboard query.
///
/// A single provider failing is not an error at this level: the reconciler
/// degrades to the surviving source. Only total unavailability surfaces to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Both providers were unavailable for this query. The caller must not
    /// fabricate a record; this is the user-visible "could not get weather"
    /// case.
    #[error("no weather data available: every provider failed or returned nothing")]
    NoData,

    /// No API key on disk for the provider.
    #[error(
        "no API key configured for provider '{0}'.\n\
         Hint: run `skycast configure {0}` and enter your API key."
    )]
    NotConfigured(ProviderId),

    /// No provider is configured at all, so a query cannot even start.
    #[error(
        "no weather providers configured.\n\
         Hint: run `skycast configure openweather` or `skycast configure weatherapi` first."
    )]
    NoProviders,

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}
