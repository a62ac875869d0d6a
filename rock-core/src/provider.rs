use crate::{
    Config, FetchError, ForecastRequest, WeatherSnapshot,
    provider::{darksky::DarkSkyProvider, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod darksky;
pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    DarkSky,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DarkSky => "darksky",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::DarkSky, ProviderId::OpenMeteo]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::DarkSky)
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
            "darksky" | "pirateweather" => Ok(ProviderId::DarkSky),
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: darksky, openmeteo."
            )),
        }
    }
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Human-readable service name, shown on the info screen.
    fn display_name(&self) -> &str;

    async fn fetch(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn ForecastProvider>> {
    if id.requires_api_key() && config.provider_api_key(id).is_none() {
        return Err(anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `weather-rock configure {id}` and enter your API key."
        ));
    }

    let base_url = config.provider_base_url(id).map(str::to_owned);

    let boxed: Box<dyn ForecastProvider> = match id {
        ProviderId::DarkSky => Box::new(DarkSkyProvider::new(base_url)),
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new(base_url)),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
///
/// The id comes back too, for building the matching [`ForecastRequest`].
pub fn default_provider_from_config(
    config: &Config,
) -> anyhow::Result<(ProviderId, Box<dyn ForecastProvider>)> {
    let id = config.default_provider_id()?;
    Ok((id, provider_from_config(id, config)?))
}
