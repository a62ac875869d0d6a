use std::path::Path;

use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, Password, Select, Text};
use rock_core::{Config, Lang, ProviderId, Units};

/// What `configure` can set up: a forecast provider or the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Provider(ProviderId),
    Calendar,
}

impl TryFrom<&str> for Target {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("calendar") {
            return Ok(Target::Calendar);
        }
        ProviderId::try_from(value)
            .map(Target::Provider)
            .map_err(|err| err.context("Use a provider name or `calendar`"))
    }
}

pub fn configure(mut config: Config, target: Target, path: Option<&Path>) -> Result<()> {
    match target {
        Target::Provider(id) => configure_provider(&mut config, id)?,
        Target::Calendar => configure_calendar(&mut config)?,
    }

    let saved = match path {
        Some(p) => {
            config.save_to(p)?;
            p.to_path_buf()
        }
        None => config.save()?,
    };
    println!("Configuration saved to {}", saved.display());
    Ok(())
}

fn configure_provider(config: &mut Config, id: ProviderId) -> Result<()> {
    println!("Configuring forecast provider: {id}");

    if id.requires_api_key() {
        let key = Password::new("API key:")
            .without_confirmation()
            .prompt()
            .context("Reading API key")?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("An API key is required for '{id}'");
        }
        config.upsert_provider_api_key(id, key.to_string());
    }

    let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
        .with_default(true)
        .prompt()?;
    if make_default {
        config.set_default_provider(id);
    }

    if Confirm::new("Update location, units and language?")
        .with_default(false)
        .prompt()?
    {
        configure_locale(config)?;
    }
    Ok(())
}

fn configure_locale(config: &mut Config) -> Result<()> {
    config.location.lat = CustomType::<f64>::new("Latitude:")
        .with_default(config.location.lat)
        .with_error_message("Enter a decimal latitude, e.g. 35.5951")
        .prompt()?;
    config.location.lon = CustomType::<f64>::new("Longitude:")
        .with_default(config.location.lon)
        .with_error_message("Enter a decimal longitude, e.g. -82.5515")
        .prompt()?;

    let units = Units::all().to_vec();
    let start = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", units).with_starting_cursor(start).prompt()?;

    let langs = Lang::all().to_vec();
    let start = langs.iter().position(|l| *l == config.lang).unwrap_or(0);
    config.lang = Select::new("Language:", langs).with_starting_cursor(start).prompt()?;
    Ok(())
}

fn configure_calendar(config: &mut Config) -> Result<()> {
    println!("Configuring Google Calendar (read-only API key access)");

    let key = Password::new("Google API key:")
        .without_confirmation()
        .prompt()
        .context("Reading API key")?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("An API key is required for the calendar");
    }

    let calendar_id = Text::new("Calendar id:")
        .with_default(&config.calendar.calendar_id)
        .with_help_message("A public calendar id, e.g. en.usa#holiday@group.v.calendar.google.com")
        .prompt()?;

    config.calendar.enabled = true;
    config.calendar.api_key = Some(key.to_string());
    config.calendar.calendar_id = calendar_id.trim().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names() {
        assert_eq!(Target::try_from("Calendar").unwrap(), Target::Calendar);
        assert_eq!(
            Target::try_from("open-meteo").unwrap(),
            Target::Provider(ProviderId::OpenMeteo)
        );
        assert!(Target::try_from("ical").is_err());
    }
}
