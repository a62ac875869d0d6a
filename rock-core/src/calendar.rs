use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt::Debug;

use crate::{
    CalendarEvent, Config, FetchError, Lang,
    i18n::{Phrase, title_case},
    model::EventDay,
};

pub mod google;

use google::GoogleCalendarProvider;

#[async_trait]
pub trait CalendarProvider: Send + Sync + Debug {
    /// Up to `max_count` upcoming events, in start order.
    async fn fetch_upcoming(&self, max_count: usize) -> Result<Vec<CalendarEvent>, FetchError>;
}

/// The configured calendar, or `None` when the agenda is switched off.
pub fn calendar_from_config(config: &Config) -> anyhow::Result<Option<Box<dyn CalendarProvider>>> {
    let cal = &config.calendar;
    if !cal.enabled {
        return Ok(None);
    }

    let api_key = cal
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Calendar is enabled but no API key is configured.\n\
                 Hint: set `api_key` under [calendar] or run `weather-rock configure calendar`."
            )
        })?;

    Ok(Some(Box::new(GoogleCalendarProvider::new(
        api_key.to_string(),
        &cal.calendar_id,
        config.lang,
    )?)))
}

/// Start of an event in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    At(NaiveDateTime),
    AllDay(NaiveDate),
}

impl EventStart {
    pub fn date(&self) -> NaiveDate {
        match self {
            EventStart::At(dt) => dt.date(),
            EventStart::AllDay(d) => *d,
        }
    }
}

/// Turns a raw event into the date/time/description lines drawn on screen.
pub fn label_event(start: EventStart, summary: &str, today: NaiveDate, lang: Lang) -> CalendarEvent {
    let date = start.date();
    let tomorrow = today.checked_add_days(Days::new(1));

    let (when, date_label) = if date == today {
        (EventDay::Today, lang.text(Phrase::TodayUpper).to_string())
    } else if Some(date) == tomorrow {
        (EventDay::Tomorrow, lang.text(Phrase::TomorrowUpper).to_string())
    } else {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        (EventDay::Later, title_case(&lang.format_date(&midnight, "%A, %d %B")))
    };

    let time_label = match start {
        EventStart::At(dt) => dt.format("%H:%M").to_string(),
        EventStart::AllDay(_) => String::new(),
    };

    CalendarEvent {
        date_label,
        time_label,
        description: summary.to_string(),
        when,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn today_and_tomorrow_labels() {
        let at = EventStart::At(day(14).and_hms_opt(9, 30, 0).unwrap());
        let ev = label_event(at, "Dentist", day(14), Lang::En);
        assert_eq!(ev.date_label, "TODAY");
        assert_eq!(ev.time_label, "09:30");
        assert_eq!(ev.when, EventDay::Today);

        let ev = label_event(EventStart::AllDay(day(15)), "Holiday", day(14), Lang::Es);
        assert_eq!(ev.date_label, "MAÑANA");
        assert_eq!(ev.time_label, "");
        assert_eq!(ev.when, EventDay::Tomorrow);
    }

    #[test]
    fn calendar_needs_a_key_when_enabled() {
        let mut cfg = Config::default();
        assert!(calendar_from_config(&cfg).unwrap().is_none());

        cfg.calendar.enabled = true;
        let err = calendar_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("no API key"));

        cfg.calendar.api_key = Some("KEY".into());
        assert!(calendar_from_config(&cfg).unwrap().is_some());
    }

    #[test]
    fn later_events_get_a_long_date() {
        let ev = label_event(EventStart::AllDay(day(20)), "Trip", day(14), Lang::En);
        assert_eq!(ev.date_label, "Tuesday, 20 October");
        assert_eq!(ev.when, EventDay::Later);
        assert_eq!(ev.description, "Trip");
    }
}
