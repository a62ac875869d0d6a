use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    ForecastRequest, Lang, Units, provider::ProviderId, refresh::RefreshTimer,
    scheduler::Thresholds,
};

/// Configuration for a single provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's public endpoint, e.g. a self-hosted mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Default for Location {
    fn default() -> Self {
        // Asheville, NC
        Self {
            lat: 35.5951,
            lon: -82.5515,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Minimum time between forecast fetches.
    pub forecast_interval_secs: u64,
    /// Delay before retrying after a network failure.
    pub retry_interval_secs: u64,
    pub calendar_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            forecast_interval_secs: 300,
            retry_interval_secs: 60,
            calendar_interval_secs: 900,
        }
    }
}

impl RefreshConfig {
    pub fn forecast_timer(&self) -> RefreshTimer {
        RefreshTimer::new(
            Duration::from_secs(self.forecast_interval_secs),
            Duration::from_secs(self.retry_interval_secs),
        )
    }

    pub fn calendar_timer(&self) -> RefreshTimer {
        RefreshTimer::new(
            Duration::from_secs(self.calendar_interval_secs),
            Duration::from_secs(self.retry_interval_secs),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub tick_ms: u64,
    /// Time in Hourly/Info before the screen starts following minute parity.
    pub rotate_after_secs: u64,
    /// Time in Hourly/Info before the info screen is forced.
    pub info_after_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            rotate_after_secs: 60,
            info_after_secs: 900,
        }
    }
}

impl ScheduleConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::from_durations(
            self.tick(),
            Duration::from_secs(self.rotate_after_secs),
            Duration::from_secs(self.info_after_secs),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fullscreen: bool,
    /// Icon edge in pixels; derived from the screen width when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<u32>,
    pub framebuffer: PathBuf,
    pub screenshot_path: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fullscreen: true,
            icon_size: None,
            framebuffer: PathBuf::from("/dev/fb0"),
            screenshot_path: PathBuf::from("screenshot.ppm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub calendar_id: String,
    pub max_events: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            calendar_id: "primary".to_string(),
            max_events: 3,
        }
    }
}

impl CalendarConfig {
    pub const MIN_EVENTS: usize = 3;
    pub const MAX_EVENTS: usize = 5;

    /// Number of agenda slots, kept within what the screen can show.
    pub fn slots(&self) -> usize {
        self.max_events.clamp(Self::MIN_EVENTS, Self::MAX_EVENTS)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, e.g. "darksky" or "openmeteo".
    pub default_provider: Option<String>,

    #[serde(default)]
    pub units: Units,

    #[serde(default)]
    pub lang: Lang,

    /// Example TOML:
    /// [providers.darksky]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub location: Location,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No default provider configured.\n\
                 Hint: run `weather-rock configure <provider>` (e.g. `weather-rock configure openmeteo`) first."
            )
        })?;

        ProviderId::try_from(s.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from the platform path, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-rock", "weather-rock")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and set the default provider if unset.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .or_default()
            .api_key = Some(api_key);

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }

    /// The request the forecast provider receives on every refresh.
    pub fn forecast_request(&self, provider_id: ProviderId) -> ForecastRequest {
        ForecastRequest {
            api_key: self.provider_api_key(provider_id).map(str::to_owned),
            lat: self.location.lat,
            lon: self.location.lon,
            units: self.units,
            lang: self.lang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_id_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_provider_id().unwrap_err();

        assert!(err.to_string().contains("No default provider configured"));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::DarkSky, "DS_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::DarkSky);

        let key = cfg.provider_api_key(ProviderId::DarkSky);
        assert_eq!(key, Some("DS_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::DarkSky));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenMeteo, "unused".into());
        cfg.upsert_provider_api_key(ProviderId::DarkSky, "DS_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::OpenMeteo);

        cfg.set_default_provider(ProviderId::DarkSky);
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::DarkSky);
    }

    #[test]
    fn keyless_provider_is_always_configured() {
        let cfg = Config::default();
        assert!(cfg.is_provider_configured(ProviderId::OpenMeteo));
        assert!(!cfg.is_provider_configured(ProviderId::DarkSky));
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            default_provider = "darksky"
            units = "si"
            lang = "es"

            [providers.darksky]
            api_key = "abc"

            [location]
            lat = 40.4
            lon = -3.7

            [schedule]
            tick_ms = 200
            "#,
        )
        .unwrap();

        assert_eq!(cfg.units, Units::Si);
        assert_eq!(cfg.lang, Lang::Es);
        assert_eq!(cfg.refresh, RefreshConfig::default());
        assert!(cfg.display.fullscreen);
        assert_eq!(cfg.calendar.slots(), 3);

        let t = cfg.schedule.thresholds();
        assert_eq!(t.rotate_after, 300);
        assert_eq!(t.info_after, 4500);

        let req = cfg.forecast_request(ProviderId::DarkSky);
        assert_eq!(req.api_key.as_deref(), Some("abc"));
        assert_eq!(req.lat, 40.4);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("weather-rock-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::DarkSky, "KEY".into());
        cfg.calendar.enabled = true;
        cfg.calendar.max_events = 9;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider_api_key(ProviderId::DarkSky), Some("KEY"));
        assert!(loaded.calendar.enabled);
        assert_eq!(loaded.calendar.slots(), CalendarConfig::MAX_EVENTS);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_from_reports_path_on_parse_error() {
        let dir = std::env::temp_dir().join(format!("weather-rock-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "units = 7").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        fs::remove_dir_all(&dir).ok();
    }
}
