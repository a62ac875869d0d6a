//! Day/night status and sunrise/sunset countdowns.

use chrono::{DateTime, TimeZone, Utc};

use crate::{Lang, WeatherSnapshot, i18n::Phrase};

/// Sun events needed to place "now" within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub next_sunrise: DateTime<Utc>,
}

impl SunTimes {
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self {
            sunrise: snapshot.today().sunrise,
            sunset: snapshot.today().sunset,
            next_sunrise: snapshot.tomorrow().sunrise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Daylight {
    pub in_daylight: bool,
    pub day_length_hours: i64,
    pub day_length_minutes: i64,
    /// Zero while the sun is up.
    pub seconds_until_sunrise: i64,
    /// Zero while the sun is down.
    pub seconds_until_sunset: i64,
}

/// Assumes `sun.sunrise < sun.sunset`.
pub fn daylight(sun: &SunTimes, now: DateTime<Utc>) -> Daylight {
    let (in_daylight, seconds_until_sunrise, seconds_until_sunset) =
        if now > sun.sunrise && now < sun.sunset {
            (true, 0, (sun.sunset - now).num_seconds())
        } else if now >= sun.sunset {
            (false, (sun.next_sunrise - now).num_seconds(), 0)
        } else {
            (false, (sun.sunrise - now).num_seconds(), 0)
        };

    let (day_length_hours, day_length_minutes) =
        split_hours_minutes((sun.sunset - sun.sunrise).num_seconds());

    Daylight {
        in_daylight,
        day_length_hours,
        day_length_minutes,
        seconds_until_sunrise,
        seconds_until_sunset,
    }
}

/// Whole hours and leftover whole minutes in `seconds`. Negative input counts as zero.
pub fn split_hours_minutes(seconds: i64) -> (i64, i64) {
    let minutes = seconds.max(0) / 60;
    (minutes / 60, minutes % 60)
}

impl Daylight {
    /// "Sunset in 5 hrs 07 min" or "Sunrise in ...", depending on the sun.
    pub fn countdown_text(&self, lang: Lang) -> String {
        let (phrase, seconds) = if self.in_daylight {
            (Phrase::SunsetIn, self.seconds_until_sunset)
        } else {
            (Phrase::SunriseIn, self.seconds_until_sunrise)
        };
        let (h, m) = split_hours_minutes(seconds);
        format!("{} {h} hrs {m:02} min", lang.text(phrase))
    }

    pub fn day_length_text(&self, lang: Lang) -> String {
        format!(
            "{}: {} hrs {:02} min",
            lang.text(Phrase::Daylight),
            self.day_length_hours,
            self.day_length_minutes
        )
    }
}

/// Display strings for the next sunrise and sunset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SunLabels {
    pub sunrise: String,
    pub sunset: String,
}

/// Before today's sunset the labels describe today ("today"/"tonight"),
/// afterwards they describe tomorrow.
pub fn sun_labels<Tz>(snapshot: &WeatherSnapshot, now: &DateTime<Tz>, lang: Lang) -> SunLabels
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let (day, rise_suffix, set_suffix) = if now.with_timezone(&Utc) < snapshot.today().sunset {
        (snapshot.today(), Phrase::Today, Phrase::Tonight)
    } else {
        (snapshot.tomorrow(), Phrase::Tomorrow, Phrase::Tomorrow)
    };

    let fmt = |t: DateTime<Utc>, suffix: Phrase| {
        format!(
            "{} {}",
            t.with_timezone(&tz).format("%I:%M %p"),
            lang.text(suffix)
        )
    };

    SunLabels {
        sunrise: fmt(day.sunrise, rise_suffix),
        sunset: fmt(day.sunset, set_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use chrono::{Duration, FixedOffset};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, h, m, 0).unwrap()
    }

    fn sun() -> SunTimes {
        SunTimes {
            sunrise: at(6, 0),
            sunset: at(18, 0),
            next_sunrise: at(6, 2) + Duration::days(1),
        }
    }

    #[test]
    fn noon_is_daylight() {
        let d = daylight(&sun(), at(12, 0));
        assert!(d.in_daylight);
        assert_eq!(d.day_length_hours, 12);
        assert_eq!(d.day_length_minutes, 0);
        assert_eq!(d.seconds_until_sunset, 21_600);
        assert_eq!(d.seconds_until_sunrise, 0);
    }

    #[test]
    fn every_minute_of_the_day_counts_to_sunset() {
        let s = sun();
        let mut t = s.sunrise + Duration::seconds(1);
        while t < s.sunset {
            let d = daylight(&s, t);
            assert!(d.in_daylight);
            assert_eq!(d.seconds_until_sunset, (s.sunset - t).num_seconds());
            t += Duration::minutes(7);
        }
    }

    #[test]
    fn evening_counts_to_tomorrows_sunrise() {
        let s = sun();
        let now = at(21, 30);
        let d = daylight(&s, now);
        assert!(!d.in_daylight);
        assert_eq!(d.seconds_until_sunset, 0);
        assert_eq!(d.seconds_until_sunrise, (s.next_sunrise - now).num_seconds());
    }

    #[test]
    fn early_morning_counts_to_todays_sunrise() {
        let d = daylight(&sun(), at(4, 15));
        assert!(!d.in_daylight);
        assert_eq!(d.seconds_until_sunrise, 105 * 60);
    }

    #[test]
    fn exactly_at_sunset_is_night() {
        let s = sun();
        let d = daylight(&s, s.sunset);
        assert!(!d.in_daylight);
        assert_eq!(d.seconds_until_sunrise, (s.next_sunrise - s.sunset).num_seconds());
    }

    #[test]
    fn day_length_adds_up() {
        for (rise, set) in [((6, 0), (18, 0)), ((7, 13), (16, 58)), ((0, 1), (23, 59))] {
            let s = SunTimes {
                sunrise: at(rise.0, rise.1),
                sunset: at(set.0, set.1),
                next_sunrise: at(rise.0, rise.1) + Duration::days(1),
            };
            let d = daylight(&s, at(12, 0));
            assert_eq!(
                d.day_length_hours * 60 + d.day_length_minutes,
                (s.sunset - s.sunrise).num_minutes()
            );
        }
    }

    #[test]
    fn texts() {
        let d = daylight(&sun(), at(12, 53));
        assert_eq!(d.countdown_text(Lang::En), "Sunset in 5 hrs 07 min");
        assert_eq!(d.day_length_text(Lang::En), "Daylight: 12 hrs 00 min");
        let night = daylight(&sun(), at(5, 0));
        assert_eq!(night.countdown_text(Lang::Es), "Salida del sol en 1 hrs 00 min");
    }

    #[test]
    fn labels_switch_to_tomorrow_after_sunset() {
        let snap = fixtures::snapshot();
        let utc = FixedOffset::east_opt(0).unwrap();

        let before = at(12, 0).with_timezone(&utc);
        let labels = sun_labels(&snap, &before, Lang::En);
        assert_eq!(labels.sunrise, "06:00 AM today");
        assert_eq!(labels.sunset, "06:00 PM tonight");

        let after = at(19, 0).with_timezone(&utc);
        let labels = sun_labels(&snap, &after, Lang::En);
        assert_eq!(labels.sunrise, "06:00 AM tomorrow");
        assert_eq!(labels.sunset, "06:00 PM tomorrow");
    }
}
