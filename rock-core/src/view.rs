//! Everything drawn on screen, already formatted as text.
//!
//! Building the model is separate from drawing so each string can be checked
//! without a display.

use chrono::{DateTime, TimeZone, Timelike, Utc};

use crate::{
    Agenda, CalendarEvent, Lang, Units, WeatherSnapshot,
    advice::take_umbrella,
    daylight::{Daylight, SunLabels, SunTimes, daylight, sun_labels},
    i18n::Phrase,
    model::IconCode,
    units::deg_to_compass,
};

/// Number of forecast rows in the right column of the weather and hourly screens.
pub const ROWS: usize = 4;

/// One right-column subwindow on the weather screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub label: String,
    pub high: String,
    pub low: String,
    pub precip: String,
    pub icon: IconCode,
}

/// One right-column subwindow on the hourly screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    pub label: String,
    pub temperature: String,
    pub precip: String,
    pub icon: IconCode,
}

/// Lines of the info screen, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLines {
    pub powered_by: String,
    pub sunrise: String,
    pub sunset: String,
    pub day_length: String,
    pub countdown: String,
    pub checked_label: String,
    pub checked_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenModel {
    pub clock: String,
    pub seconds: String,
    pub date: String,
    pub temperature: String,
    pub temperature_letter: char,
    pub summary: String,
    pub humidity_label: &'static str,
    pub humidity: String,
    pub wind_label: &'static str,
    pub wind: String,
    pub umbrella: String,
    pub days: Vec<DayRow>,
    pub hours: Vec<HourRow>,
    pub info: InfoLines,
    pub agenda: Vec<CalendarEvent>,
    pub daylight: Daylight,
}

impl ScreenModel {
    pub fn build<Tz>(
        snapshot: &WeatherSnapshot,
        agenda: &Agenda,
        now: &DateTime<Tz>,
        last_checked: DateTime<Utc>,
        units: Units,
        lang: Lang,
        provider_name: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let tz = now.timezone();
        let current = &snapshot.current;
        let daylight = daylight(&SunTimes::from_snapshot(snapshot), now.with_timezone(&Utc));
        let SunLabels { sunrise, sunset } = sun_labels(snapshot, now, lang);

        let umbrella = if take_umbrella(snapshot, now) {
            Phrase::TakeUmbrella
        } else {
            Phrase::NoUmbrella
        };

        let days = snapshot
            .daily()
            .iter()
            .take(ROWS)
            .enumerate()
            .map(|(i, day)| DayRow {
                label: if i == 0 {
                    lang.text(Phrase::TodayRow).to_string()
                } else {
                    lang.day_label(&day.time.with_timezone(&tz)).to_string()
                },
                high: round(day.temperature_high),
                low: round(day.temperature_low),
                precip: percent(day.precip_probability),
                icon: day.icon,
            })
            .collect();

        let hours = snapshot
            .hourly()
            .iter()
            .take(ROWS)
            .map(|hour| HourRow {
                label: hour_label(hour.time.with_timezone(&tz).hour()),
                temperature: round(hour.temperature),
                precip: percent(hour.precip_probability),
                icon: hour.icon,
            })
            .collect();

        let info = InfoLines {
            powered_by: format!("{} {provider_name}", lang.text(Phrase::PoweredBy)),
            sunrise: format!("{}: {sunrise}", lang.text(Phrase::Sunrise)),
            sunset: format!("{}: {sunset}", lang.text(Phrase::Sunset)),
            day_length: daylight.day_length_text(lang),
            countdown: daylight.countdown_text(lang),
            checked_label: lang.text(Phrase::CheckedAt).to_string(),
            checked_at: lang.format_date(
                &last_checked.with_timezone(&tz),
                "%H:%M:%S %Z on %a. %d %b %Y",
            ),
        };

        Self {
            clock: now.format("%H:%M").to_string(),
            seconds: now.format("%S").to_string(),
            date: lang.long_date(now),
            temperature: round(current.temperature),
            temperature_letter: units.temperature_letter(),
            summary: snapshot.summary.clone(),
            humidity_label: lang.text(Phrase::Humidity),
            humidity: percent(current.humidity),
            wind_label: lang.text(Phrase::Wind),
            wind: wind_text(current.wind_bearing, current.wind_speed, units),
            umbrella: lang.text(umbrella).to_string(),
            days,
            hours,
            info,
            agenda: agenda.slots().to_vec(),
            daylight,
        }
    }
}

fn round(value: f64) -> String {
    format!("{}", value.round() as i64)
}

/// A 0..1 probability as a whole percentage, "64%".
pub fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

/// "NNE @ 5 mph", or just "5 mph" when the bearing is unknown.
pub fn wind_text(bearing: Option<f64>, speed: f64, units: Units) -> String {
    let abbr = units.wind_speed_unit().abbreviation();
    let speed = speed.round() as i64;
    match bearing {
        Some(deg) => format!("{} @ {speed} {abbr}", deg_to_compass(deg)),
        None => format!("{speed} {abbr}"),
    }
}

/// Twelve-hour label such as "3 p.m." for a 0..24 hour.
pub fn hour_label(hour24: u32) -> String {
    let suffix = if hour24 <= 11 { "a.m." } else { "p.m." };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12} {suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    fn model(lang: Lang) -> ScreenModel {
        let snap = fixtures::snapshot();
        let agenda = Agenda::from_events(
            3,
            vec![CalendarEvent {
                date_label: "TODAY".into(),
                time_label: "19:00".into(),
                description: "Dinner".into(),
                ..Default::default()
            }],
        );
        ScreenModel::build(&snap, &agenda, &snap.fetched_at, snap.fetched_at, Units::Us, lang, "Dark Sky")
    }

    #[test]
    fn hour_labels() {
        assert_eq!(hour_label(0), "12 a.m.");
        assert_eq!(hour_label(11), "11 a.m.");
        assert_eq!(hour_label(12), "12 p.m.");
        assert_eq!(hour_label(15), "3 p.m.");
    }

    #[test]
    fn wind_and_percent() {
        assert_eq!(wind_text(Some(22.0), 5.4, Units::Us), "NNE @ 5 mph");
        assert_eq!(wind_text(None, 3.6, Units::Si), "4 mps");
        assert_eq!(percent(0.64), "64%");
    }

    #[test]
    fn header_and_conditions() {
        let m = model(Lang::En);
        assert_eq!(m.clock, "12:00");
        assert_eq!(m.seconds, "00");
        assert_eq!(m.date, "Wednesday, 14 October");
        assert_eq!(m.temperature, "72");
        assert_eq!(m.temperature_letter, 'F');
        assert_eq!(m.summary, "Partly Cloudy");
        assert_eq!(m.humidity, "64%");
        assert_eq!(m.wind, "NNE @ 5 mph");
        assert_eq!(m.umbrella, "No umbrella needed today.");
    }

    #[test]
    fn forecast_rows() {
        let m = model(Lang::En);
        let labels: Vec<_> = m.days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Today", "THU", "FRI", "SAT"]);
        assert_eq!(m.days[0].high, "75");
        assert_eq!(m.days[0].precip, "20%");

        let hours: Vec<_> = m.hours.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(hours, ["12 p.m.", "1 p.m.", "2 p.m.", "3 p.m."]);
        assert_eq!(m.hours[1].temperature, "71");
    }

    #[test]
    fn info_lines() {
        let m = model(Lang::En);
        assert_eq!(m.info.powered_by, "A weather rock powered by Dark Sky");
        assert_eq!(m.info.sunrise, "Sunrise: 06:00 AM today");
        assert_eq!(m.info.sunset, "Sunset: 06:00 PM tonight");
        assert_eq!(m.info.day_length, "Daylight: 12 hrs 00 min");
        assert_eq!(m.info.countdown, "Sunset in 6 hrs 00 min");
        assert!(m.info.checked_at.starts_with("12:00:00"));
        assert!(m.info.checked_at.ends_with("Wed. 14 Oct 2026"));
    }

    #[test]
    fn spanish_labels_and_agenda() {
        let m = model(Lang::Es);
        assert_eq!(m.days[0].label, "Hoy");
        assert_eq!(m.days[1].label, "JUE");
        assert_eq!(m.date, "Miércoles, 14 Octubre");
        assert_eq!(m.agenda.len(), 3);
        assert_eq!(m.agenda[0].description, "Dinner");
    }
}
