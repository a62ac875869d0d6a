use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    FetchError, ForecastRequest, Units, WeatherSnapshot,
    error::{decode, send_for_body},
    model::{Current, DailyPoint, HourlyPoint, IconCode},
    units::WindSpeedUnit,
};

use super::ForecastProvider;

const SERVICE: &str = "openmeteo";
const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
    weather_code,is_day,wind_speed_10m,wind_direction_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,weather_code,is_day";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
    precipitation_probability_max,sunrise,sunset";

/// Client for the keyless Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http: Client::new(),
        }
    }
}

/// Open-Meteo's `temperature_unit` and `wind_speed_unit` values for a unit system.
fn unit_names(units: Units) -> (&'static str, &'static str) {
    let temperature = if units.is_fahrenheit() {
        "fahrenheit"
    } else {
        "celsius"
    };
    let wind = match units.wind_speed_unit() {
        WindSpeedUnit::MetersPerSecond => "ms",
        WindSpeedUnit::KilometersPerHour => "kmh",
        WindSpeedUnit::MilesPerHour => "mph",
    };
    (temperature, wind)
}

fn query(request: &ForecastRequest) -> Vec<(&'static str, String)> {
    let (temperature_unit, wind_speed_unit) = unit_names(request.units);

    vec![
        ("latitude", request.lat.to_string()),
        ("longitude", request.lon.to_string()),
        ("current", CURRENT_FIELDS.to_string()),
        ("hourly", HOURLY_FIELDS.to_string()),
        ("daily", DAILY_FIELDS.to_string()),
        ("timeformat", "unixtime".to_string()),
        ("timezone", "auto".to_string()),
        ("forecast_days", "5".to_string()),
        ("temperature_unit", temperature_unit.to_string()),
        ("wind_speed_unit", wind_speed_unit.to_string()),
    ]
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    fn display_name(&self) -> &str {
        "Open-Meteo"
    }

    async fn fetch(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let body = send_for_body(SERVICE, self.http.get(url).query(&query(request))).await?;
        parse_forecast(&body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: Option<i64>,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<u8>,
    is_day: Option<u8>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<i64>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<i64>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<i64>,
    #[serde(default)]
    sunset: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: Option<OmCurrent>,
    hourly: Option<OmHourly>,
    daily: Option<OmDaily>,
}

/// Icon and English summary for a WMO weather interpretation code.
pub fn describe_wmo(code: u8, is_day: bool) -> (IconCode, &'static str) {
    let clear = if is_day {
        IconCode::ClearDay
    } else {
        IconCode::ClearNight
    };
    let partly = if is_day {
        IconCode::PartlyCloudyDay
    } else {
        IconCode::PartlyCloudyNight
    };

    match code {
        0 => (clear, "Clear"),
        1 => (clear, "Mainly Clear"),
        2 => (partly, "Partly Cloudy"),
        3 => (IconCode::Cloudy, "Overcast"),
        45 | 48 => (IconCode::Fog, "Fog"),
        51 | 53 | 55 => (IconCode::Rain, "Drizzle"),
        56 | 57 => (IconCode::Sleet, "Freezing Drizzle"),
        61 | 63 | 65 => (IconCode::Rain, "Rain"),
        66 | 67 => (IconCode::Sleet, "Freezing Rain"),
        71 | 73 | 75 | 77 => (IconCode::Snow, "Snow"),
        80..=82 => (IconCode::Rain, "Rain Showers"),
        85 | 86 => (IconCode::Snow, "Snow Showers"),
        95 | 96 | 99 => (IconCode::Rain, "Thunderstorm"),
        _ => (IconCode::Unknown, "Unknown"),
    }
}

fn ts(secs: i64, field: &'static str) -> Result<DateTime<Utc>, FetchError> {
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| FetchError::missing(SERVICE, field))
}

fn at<T: Copy>(values: &[Option<T>], i: usize, field: &'static str) -> Result<T, FetchError> {
    values
        .get(i)
        .copied()
        .flatten()
        .ok_or_else(|| FetchError::missing(SERVICE, field))
}

fn percent(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0) / 100.0
}

/// Decodes an Open-Meteo forecast body (requested with `timeformat=unixtime`).
pub fn parse_forecast(body: &str, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, FetchError> {
    let parsed: OmForecastResponse = decode(SERVICE, body)?;

    let c = parsed
        .current
        .ok_or_else(|| FetchError::missing(SERVICE, "current"))?;
    let now = ts(
        c.time.ok_or_else(|| FetchError::missing(SERVICE, "current.time"))?,
        "current.time",
    )?;
    let (icon, summary) = describe_wmo(
        c.weather_code
            .ok_or_else(|| FetchError::missing(SERVICE, "current.weather_code"))?,
        c.is_day.unwrap_or(1) == 1,
    );
    let temperature = c
        .temperature_2m
        .ok_or_else(|| FetchError::missing(SERVICE, "current.temperature_2m"))?;

    let h = parsed
        .hourly
        .ok_or_else(|| FetchError::missing(SERVICE, "hourly"))?;

    let mut hourly = Vec::with_capacity(h.time.len());
    for (i, &secs) in h.time.iter().enumerate() {
        let time = ts(secs, "hourly.time")?;
        // Hourly data starts at local midnight; skip hours that are already over.
        if time + chrono::Duration::hours(1) <= now {
            continue;
        }
        let code = at(&h.weather_code, i, "hourly.weather_code")?;
        let is_day = h.is_day.get(i).copied().flatten().unwrap_or(1) == 1;
        hourly.push(HourlyPoint {
            time,
            temperature: at(&h.temperature_2m, i, "hourly.temperature_2m")?,
            precip_probability: percent(h.precipitation_probability.get(i).copied().flatten()),
            icon: describe_wmo(code, is_day).0,
        });
    }

    let d = parsed
        .daily
        .ok_or_else(|| FetchError::missing(SERVICE, "daily"))?;

    let mut daily = Vec::with_capacity(d.time.len());
    for (i, &secs) in d.time.iter().enumerate() {
        let sunrise = d
            .sunrise
            .get(i)
            .copied()
            .ok_or_else(|| FetchError::missing(SERVICE, "daily.sunrise"))?;
        let sunset = d
            .sunset
            .get(i)
            .copied()
            .ok_or_else(|| FetchError::missing(SERVICE, "daily.sunset"))?;
        daily.push(DailyPoint {
            time: ts(secs, "daily.time")?,
            temperature_high: at(&d.temperature_2m_max, i, "daily.temperature_2m_max")?,
            temperature_low: at(&d.temperature_2m_min, i, "daily.temperature_2m_min")?,
            precip_probability: percent(d.precipitation_probability_max.get(i).copied().flatten()),
            icon: describe_wmo(at(&d.weather_code, i, "daily.weather_code")?, true).0,
            sunrise: ts(sunrise, "daily.sunrise")?,
            sunset: ts(sunset, "daily.sunset")?,
        });
    }

    let current = Current {
        time: now,
        summary: summary.to_string(),
        icon,
        temperature,
        apparent_temperature: c.apparent_temperature.unwrap_or(temperature),
        humidity: percent(c.relative_humidity_2m),
        wind_speed: c
            .wind_speed_10m
            .ok_or_else(|| FetchError::missing(SERVICE, "current.wind_speed_10m"))?,
        wind_bearing: c.wind_direction_10m,
        precip_probability: hourly.first().map_or(0.0, |p| p.precip_probability),
    };

    WeatherSnapshot::new(SERVICE, fetched_at, current, hourly, daily)
}
