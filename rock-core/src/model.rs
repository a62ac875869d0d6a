use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FetchError, Lang, Units};

/// Minimum number of hourly entries a snapshot must carry.
pub const MIN_HOURLY: usize = 4;
/// Minimum number of daily entries a snapshot must carry.
pub const MIN_DAILY: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub api_key: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub units: Units,
    pub lang: Lang,
}

/// Condition categories used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCode {
    ClearDay,
    ClearNight,
    Rain,
    Snow,
    Sleet,
    Wind,
    Fog,
    Cloudy,
    PartlyCloudyDay,
    PartlyCloudyNight,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for IconCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(IconCode::from_name(&name))
    }
}

impl IconCode {
    /// Parses a Dark Sky icon name, falling back to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "clear-day" => IconCode::ClearDay,
            "clear-night" => IconCode::ClearNight,
            "rain" => IconCode::Rain,
            "snow" => IconCode::Snow,
            "sleet" => IconCode::Sleet,
            "wind" => IconCode::Wind,
            "fog" => IconCode::Fog,
            "cloudy" => IconCode::Cloudy,
            "partly-cloudy-day" => IconCode::PartlyCloudyDay,
            "partly-cloudy-night" => IconCode::PartlyCloudyNight,
            _ => IconCode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconCode::ClearDay => "clear-day",
            IconCode::ClearNight => "clear-night",
            IconCode::Rain => "rain",
            IconCode::Snow => "snow",
            IconCode::Sleet => "sleet",
            IconCode::Wind => "wind",
            IconCode::Fog => "fog",
            IconCode::Cloudy => "cloudy",
            IconCode::PartlyCloudyDay => "partly-cloudy-day",
            IconCode::PartlyCloudyNight => "partly-cloudy-night",
            IconCode::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub time: DateTime<Utc>,
    pub summary: String,
    pub icon: IconCode,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity, 0.0..=1.0.
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_bearing: Option<f64>,
    /// 0.0..=1.0.
    pub precip_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub precip_probability: f64,
    pub icon: IconCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub time: DateTime<Utc>,
    pub temperature_high: f64,
    pub temperature_low: f64,
    pub precip_probability: f64,
    pub icon: IconCode,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// One successful forecast fetch. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
    pub summary: String,
    pub current: Current,
    hourly: Vec<HourlyPoint>,
    daily: Vec<DailyPoint>,
}

impl WeatherSnapshot {
    pub fn new(
        provider: &'static str,
        fetched_at: DateTime<Utc>,
        current: Current,
        hourly: Vec<HourlyPoint>,
        daily: Vec<DailyPoint>,
    ) -> Result<Self, FetchError> {
        if hourly.len() < MIN_HOURLY {
            return Err(FetchError::missing(provider, "hourly"));
        }
        if daily.len() < MIN_DAILY {
            return Err(FetchError::missing(provider, "daily"));
        }

        Ok(Self {
            provider: provider.to_string(),
            fetched_at,
            summary: current.summary.clone(),
            current,
            hourly,
            daily,
        })
    }

    pub fn hourly(&self) -> &[HourlyPoint] {
        &self.hourly
    }

    pub fn daily(&self) -> &[DailyPoint] {
        &self.daily
    }

    pub fn today(&self) -> &DailyPoint {
        &self.daily[0]
    }

    pub fn tomorrow(&self) -> &DailyPoint {
        &self.daily[1]
    }
}

/// An upcoming event, already labelled for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date_label: String,
    /// "HH:MM", or empty for all-day events.
    pub time_label: String,
    pub description: String,
    pub when: EventDay,
}

/// Which day an event falls on, relative to the day it was fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventDay {
    Today,
    Tomorrow,
    #[default]
    Later,
}

/// Fixed number of event slots shown on screen. Unused slots are blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agenda {
    slots: Vec<CalendarEvent>,
}

impl Agenda {
    pub fn empty(max_events: usize) -> Self {
        Self {
            slots: vec![CalendarEvent::default(); max_events],
        }
    }

    /// Builds an agenda from events in start order, keeping at most `max_events`.
    pub fn from_events(max_events: usize, events: Vec<CalendarEvent>) -> Self {
        let mut agenda = Self::empty(max_events);
        for (slot, event) in agenda.slots.iter_mut().zip(events) {
            *slot = event;
        }
        agenda
    }

    pub fn slots(&self) -> &[CalendarEvent] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(|e| e.description.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// A snapshot for 2026-10-14 with sunrise 06:00 and sunset 18:00 UTC.
    pub fn snapshot() -> WeatherSnapshot {
        let day0 = Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap();
        let now = day0 + Duration::hours(12);

        let current = Current {
            time: now,
            summary: "Partly Cloudy".into(),
            icon: IconCode::PartlyCloudyDay,
            temperature: 71.6,
            apparent_temperature: 70.2,
            humidity: 0.64,
            wind_speed: 5.4,
            wind_bearing: Some(22.0),
            precip_probability: 0.1,
        };

        let hourly = (0..6)
            .map(|h| HourlyPoint {
                time: now + Duration::hours(h),
                temperature: 70.0 + h as f64,
                precip_probability: 0.05,
                icon: IconCode::PartlyCloudyDay,
            })
            .collect();

        let daily = (0..4)
            .map(|d| {
                let base = day0 + Duration::days(d);
                DailyPoint {
                    time: base,
                    temperature_high: 75.0,
                    temperature_low: 55.0,
                    precip_probability: 0.2,
                    icon: IconCode::Cloudy,
                    sunrise: base + Duration::hours(6),
                    sunset: base + Duration::hours(18),
                }
            })
            .collect();

        WeatherSnapshot::new("darksky", now, current, hourly, daily).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_names() {
        assert_eq!(IconCode::from_name("partly-cloudy-night"), IconCode::PartlyCloudyNight);
        assert_eq!(IconCode::from_name("hail"), IconCode::Unknown);
        let parsed: IconCode = serde_json::from_str("\"tornado\"").unwrap();
        assert_eq!(parsed, IconCode::Unknown);
    }

    #[test]
    fn snapshot_requires_enough_entries() {
        let snap = fixtures::snapshot();
        let short_hourly = snap.hourly()[..3].to_vec();
        let err = WeatherSnapshot::new(
            "darksky",
            snap.fetched_at,
            snap.current.clone(),
            short_hourly,
            snap.daily().to_vec(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "darksky response is missing `hourly`");

        let err = WeatherSnapshot::new(
            "darksky",
            snap.fetched_at,
            snap.current.clone(),
            snap.hourly().to_vec(),
            snap.daily()[..1].to_vec(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("`daily`"));
    }

    #[test]
    fn agenda_pads_and_truncates() {
        let ev = |d: &str| CalendarEvent {
            description: d.into(),
            ..Default::default()
        };
        let agenda = Agenda::from_events(3, vec![ev("a")]);
        assert_eq!(agenda.capacity(), 3);
        assert_eq!(agenda.slots()[0].description, "a");
        assert!(agenda.slots()[2].description.is_empty());

        let agenda = Agenda::from_events(2, vec![ev("a"), ev("b"), ev("c")]);
        assert_eq!(agenda.slots().len(), 2);
        assert_eq!(agenda.slots()[1].description, "b");

        assert!(Agenda::empty(4).is_blank());
    }
}
