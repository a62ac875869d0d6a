use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    FetchError, ForecastRequest, WeatherSnapshot,
    error::{decode, send_for_body},
    model::{Current, DailyPoint, HourlyPoint, IconCode},
};

use super::ForecastProvider;

const SERVICE: &str = "darksky";
/// Pirate Weather serves the Dark Sky response format.
const DEFAULT_BASE_URL: &str = "https://api.pirateweather.net";

/// Client for Dark-Sky-compatible `/forecast/{key}/{lat},{lon}` endpoints.
#[derive(Debug, Clone)]
pub struct DarkSkyProvider {
    base_url: String,
    http: Client,
}

impl DarkSkyProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http: Client::new(),
        }
    }

    fn forecast_url(&self, request: &ForecastRequest) -> Result<String, FetchError> {
        let key = request
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::missing(SERVICE, "api_key"))?;
        Ok(format!(
            "{}/forecast/{}/{},{}",
            self.base_url, key, request.lat, request.lon
        ))
    }
}

#[async_trait]
impl ForecastProvider for DarkSkyProvider {
    fn display_name(&self) -> &str {
        "Dark Sky"
    }

    async fn fetch(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, FetchError> {
        let url = self.forecast_url(request)?;

        let body = send_for_body(
            SERVICE,
            self.http.get(url).query(&[
                ("exclude", "minutely"),
                ("units", request.units.as_str()),
                ("lang", request.lang.as_str()),
            ]),
        )
        .await?;

        parse_forecast(&body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DsCurrently {
    time: Option<i64>,
    summary: Option<String>,
    icon: Option<String>,
    temperature: Option<f64>,
    apparent_temperature: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_bearing: Option<f64>,
    precip_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DsDataPoint {
    time: Option<i64>,
    icon: Option<String>,
    temperature: Option<f64>,
    temperature_high: Option<f64>,
    temperature_low: Option<f64>,
    precip_probability: Option<f64>,
    sunrise_time: Option<i64>,
    sunset_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DsBlock {
    #[serde(default)]
    data: Vec<DsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct DsForecastResponse {
    currently: Option<DsCurrently>,
    hourly: Option<DsBlock>,
    daily: Option<DsBlock>,
}

fn ts(value: Option<i64>, field: &'static str) -> Result<DateTime<Utc>, FetchError> {
    value
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| FetchError::missing(SERVICE, field))
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, FetchError> {
    value.ok_or_else(|| FetchError::missing(SERVICE, field))
}

fn icon(name: Option<&str>) -> IconCode {
    name.map(IconCode::from_name).unwrap_or_default()
}

/// Decodes a Dark Sky forecast body into a snapshot.
pub fn parse_forecast(body: &str, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, FetchError> {
    let parsed: DsForecastResponse = decode(SERVICE, body)?;

    let c = required(parsed.currently, "currently")?;
    let current = Current {
        time: ts(c.time, "currently.time")?,
        summary: c.summary.unwrap_or_default(),
        icon: icon(c.icon.as_deref()),
        temperature: required(c.temperature, "currently.temperature")?,
        apparent_temperature: c
            .apparent_temperature
            .or(c.temperature)
            .unwrap_or_default(),
        humidity: required(c.humidity, "currently.humidity")?,
        wind_speed: required(c.wind_speed, "currently.windSpeed")?,
        wind_bearing: c.wind_bearing,
        precip_probability: c.precip_probability.unwrap_or(0.0),
    };

    let hourly = required(parsed.hourly, "hourly")?
        .data
        .into_iter()
        .map(|p| {
            Ok(HourlyPoint {
                time: ts(p.time, "hourly.time")?,
                temperature: required(p.temperature, "hourly.temperature")?,
                precip_probability: p.precip_probability.unwrap_or(0.0),
                icon: icon(p.icon.as_deref()),
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    let daily = required(parsed.daily, "daily")?
        .data
        .into_iter()
        .map(|p| {
            Ok(DailyPoint {
                time: ts(p.time, "daily.time")?,
                temperature_high: required(p.temperature_high, "daily.temperatureHigh")?,
                temperature_low: required(p.temperature_low, "daily.temperatureLow")?,
                precip_probability: p.precip_probability.unwrap_or(0.0),
                icon: icon(p.icon.as_deref()),
                sunrise: ts(p.sunrise_time, "daily.sunriseTime")?,
                sunset: ts(p.sunset_time, "daily.sunsetTime")?,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    WeatherSnapshot::new(SERVICE, fetched_at, current, hourly, daily)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchErrorKind, Lang, Units};
    use chrono::TimeZone;

    fn hour(t: i64) -> String {
        format!(
            r#"{{"time":{t},"icon":"rain","temperature":60.5,"precipProbability":0.4}}"#
        )
    }

    fn day(t: i64) -> String {
        format!(
            r#"{{"time":{t},"icon":"cloudy","temperatureHigh":70.1,"temperatureLow":50.9,
                "precipProbability":0.3,"sunriseTime":{},"sunsetTime":{}}}"#,
            t + 6 * 3600,
            t + 18 * 3600
        )
    }

    fn body(hours: usize, days: usize) -> String {
        let base = 1_791_936_000; // 2026-10-14T00:00:00Z
        let hourly: Vec<String> = (0..hours as i64).map(|h| hour(base + h * 3600)).collect();
        let daily: Vec<String> = (0..days as i64).map(|d| day(base + d * 86_400)).collect();
        format!(
            r#"{{"latitude":1.0,"longitude":2.0,
                "currently":{{"time":{base},"summary":"Drizzle","icon":"rain","temperature":61.2,
                    "apparentTemperature":60.0,"humidity":0.81,"windSpeed":7.2,"windBearing":200,
                    "precipProbability":0.55}},
                "hourly":{{"summary":"Rain","data":[{}]}},
                "daily":{{"data":[{}]}}}}"#,
            hourly.join(","),
            daily.join(",")
        )
    }

    #[test]
    fn parses_full_forecast() {
        let now = Utc::now();
        let snap = parse_forecast(&body(8, 4), now).unwrap();
        assert_eq!(snap.summary, "Drizzle");
        assert_eq!(snap.current.icon, IconCode::Rain);
        assert_eq!(snap.current.wind_bearing, Some(200.0));
        assert_eq!(snap.hourly().len(), 8);
        assert_eq!(snap.daily().len(), 4);
        assert_eq!(
            snap.today().sunrise,
            Utc.with_ymd_and_hms(2026, 10, 14, 6, 0, 0).unwrap()
        );
        assert_eq!(snap.fetched_at, now);
    }

    #[test]
    fn too_few_hours_is_attribute_missing() {
        let err = parse_forecast(&body(3, 4), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::AttributeMissing);
    }

    #[test]
    fn missing_sun_times_is_attribute_missing() {
        let b = body(4, 2).replace("\"sunsetTime\"", "\"sunsetTimeX\"");
        let err = parse_forecast(&b, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("daily.sunsetTime"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = parse_forecast("<html>502</html>", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Decode);
    }

    #[test]
    fn url_needs_key() {
        let p = DarkSkyProvider::new(Some("http://localhost:9000/".into()));
        let mut req = ForecastRequest {
            api_key: None,
            lat: 35.5,
            lon: -82.5,
            units: Units::Us,
            lang: Lang::En,
        };
        assert!(p.forecast_url(&req).is_err());
        req.api_key = Some("abc".into());
        assert_eq!(
            p.forecast_url(&req).unwrap(),
            "http://localhost:9000/forecast/abc/35.5,-82.5"
        );
    }
}
