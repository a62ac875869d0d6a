use chrono::{DateTime, TimeZone};

use crate::{WeatherSnapshot, model::IconCode};

/// Chance of rain at which a daylight hour alone warrants an umbrella.
pub const RAIN_THRESHOLD: f64 = 0.25;

/// Whether to suggest an umbrella for the rest of today.
///
/// Rain showing as the current or daily icon is enough. Otherwise any hour on
/// today's local date between sunrise and sunset with a high enough chance of
/// rain counts.
pub fn take_umbrella<Tz: TimeZone>(snapshot: &WeatherSnapshot, now: &DateTime<Tz>) -> bool {
    let today = snapshot.today();
    if snapshot.current.icon == IconCode::Rain || today.icon == IconCode::Rain {
        return true;
    }

    let tz = now.timezone();
    let local_today = now.date_naive();

    snapshot.hourly().iter().any(|hour| {
        hour.time.with_timezone(&tz).date_naive() == local_today
            && hour.time >= today.sunrise
            && hour.time <= today.sunset
            && hour.precip_probability >= RAIN_THRESHOLD
    })
}
