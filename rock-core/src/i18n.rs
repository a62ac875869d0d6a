//! UI phrases and date formatting for the supported display languages.

use chrono::{DateTime, Datelike, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Es,
}

/// Phrases drawn on screen that change with the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Today,
    Tonight,
    Tomorrow,
    TodayUpper,
    TomorrowUpper,
    TodayRow,
    Sunrise,
    Sunset,
    Daylight,
    SunriseIn,
    SunsetIn,
    PoweredBy,
    CheckedAt,
    TakeUmbrella,
    NoUmbrella,
    Humidity,
    Wind,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Es => "es",
        }
    }

    pub const fn all() -> &'static [Lang] {
        &[Lang::En, Lang::Es]
    }

    pub fn text(&self, phrase: Phrase) -> &'static str {
        use Phrase::*;
        match (self, phrase) {
            (Lang::En, Today) => "today",
            (Lang::En, Tonight) => "tonight",
            (Lang::En, Tomorrow) => "tomorrow",
            (Lang::En, TodayUpper) => "TODAY",
            (Lang::En, TomorrowUpper) => "TOMORROW",
            (Lang::En, TodayRow) => "Today",
            (Lang::En, Sunrise) => "Sunrise",
            (Lang::En, Sunset) => "Sunset",
            (Lang::En, Daylight) => "Daylight",
            (Lang::En, SunriseIn) => "Sunrise in",
            (Lang::En, SunsetIn) => "Sunset in",
            (Lang::En, PoweredBy) => "A weather rock powered by",
            (Lang::En, CheckedAt) => "Weather checked at",
            (Lang::En, TakeUmbrella) => "Grab your umbrella!",
            (Lang::En, NoUmbrella) => "No umbrella needed today.",
            (Lang::En, Humidity) => "HR:",
            (Lang::En, Wind) => "Wind:",

            (Lang::Es, Today) => "hoy",
            (Lang::Es, Tonight) => "esta noche",
            (Lang::Es, Tomorrow) => "mañana",
            (Lang::Es, TodayUpper) => "HOY",
            (Lang::Es, TomorrowUpper) => "MAÑANA",
            (Lang::Es, TodayRow) => "Hoy",
            (Lang::Es, Sunrise) => "Amanecer",
            (Lang::Es, Sunset) => "Atardecer",
            (Lang::Es, Daylight) => "Horas de sol",
            (Lang::Es, SunriseIn) => "Salida del sol en",
            (Lang::Es, SunsetIn) => "Puesta de sol en",
            (Lang::Es, PoweredBy) => "Una weather rock con datos de",
            (Lang::Es, CheckedAt) => "Tiempo consultado a las",
            (Lang::Es, TakeUmbrella) => "¡Coge el paraguas!",
            (Lang::Es, NoUmbrella) => "Hoy no hace falta paraguas.",
            (Lang::Es, Humidity) => "HR:",
            (Lang::Es, Wind) => "Viento:",
        }
    }

    pub fn weekday_short(&self, day: Weekday) -> &'static str {
        const EN: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];
        const ES: [&str; 7] = ["LUN", "MAR", "MIÉ", "JUE", "VIE", "SÁB", "DOM"];
        let idx = day.num_days_from_monday() as usize;
        match self {
            Lang::En => EN[idx],
            Lang::Es => ES[idx],
        }
    }

    fn locale(&self) -> chrono::Locale {
        match self {
            Lang::En => chrono::Locale::en_US,
            Lang::Es => chrono::Locale::es_ES,
        }
    }

    /// Formats `dt` with a strftime pattern using this language's month and day names.
    pub fn format_date<Tz>(&self, dt: &DateTime<Tz>, pattern: &str) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        dt.format_localized(pattern, self.locale()).to_string()
    }

    /// Long date such as "Wednesday, 14 October".
    pub fn long_date<Tz>(&self, dt: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        title_case(&self.format_date(dt, "%A, %d %B"))
    }

    /// Short weekday label for the day containing `dt`.
    pub fn day_label<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> &'static str {
        self.weekday_short(dt.weekday())
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Lang {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "es" => Ok(Lang::Es),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported: en, es.")),
        }
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
