use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    CalendarEvent, FetchError, Lang,
    error::{decode, send_for_body},
};

use super::{CalendarProvider, EventStart, label_event};

const SERVICE: &str = "google-calendar";
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Reads a public Google calendar through the v3 REST API with an API key.
#[derive(Debug, Clone)]
pub struct GoogleCalendarProvider {
    api_key: String,
    events_url: Url,
    lang: Lang,
    http: Client,
}

impl GoogleCalendarProvider {
    pub fn new(api_key: String, calendar_id: &str, lang: Lang) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            events_url: events_url(calendar_id)?,
            lang,
            http: Client::new(),
        })
    }
}

/// The `events.list` endpoint for one calendar.
///
/// The id is pushed as a single path segment, so ids such as
/// `en.usa#holiday@group.v.calendar.google.com` are percent-encoded.
fn events_url(calendar_id: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(EVENTS_URL)?;
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("{EVENTS_URL} cannot take path segments"))?
        .push(calendar_id)
        .push("events");
    Ok(url)
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn fetch_upcoming(&self, max_count: usize) -> Result<Vec<CalendarEvent>, FetchError> {
        let now = Utc::now();
        let body = send_for_body(
            SERVICE,
            self.http.get(self.events_url.clone()).query(&[
                ("key", self.api_key.clone()),
                ("timeMin", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("maxResults", max_count.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]),
        )
        .await?;

        let local = now.with_timezone(&Local);
        parse_events(&body, &local, self.lang, max_count)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcStart {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GcEvent {
    summary: Option<String>,
    start: Option<GcStart>,
}

#[derive(Debug, Deserialize)]
struct GcEventList {
    #[serde(default)]
    items: Vec<GcEvent>,
}

fn event_start<Tz: TimeZone>(start: &GcStart, tz: &Tz) -> Result<EventStart, FetchError> {
    if let Some(dt) = start.date_time.as_deref() {
        let parsed = DateTime::parse_from_rfc3339(dt)
            .map_err(|_| FetchError::missing(SERVICE, "start.dateTime"))?;
        return Ok(EventStart::At(parsed.with_timezone(tz).naive_local()));
    }
    if let Some(d) = start.date.as_deref() {
        let parsed = NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| FetchError::missing(SERVICE, "start.date"))?;
        return Ok(EventStart::AllDay(parsed));
    }
    Err(FetchError::missing(SERVICE, "start"))
}

/// Decodes an `events.list` body and labels events relative to `now`.
pub fn parse_events<Tz: TimeZone>(
    body: &str,
    now: &DateTime<Tz>,
    lang: Lang,
    max_count: usize,
) -> Result<Vec<CalendarEvent>, FetchError> {
    let parsed: GcEventList = decode(SERVICE, body)?;
    let tz = now.timezone();
    let today = now.date_naive();

    parsed
        .items
        .into_iter()
        .take(max_count)
        .map(|item| {
            let start = item
                .start
                .as_ref()
                .ok_or_else(|| FetchError::missing(SERVICE, "start"))?;
            let start = event_start(start, &tz)?;
            Ok(label_event(
                start,
                item.summary.as_deref().unwrap_or_default(),
                today,
                lang,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchErrorKind, model::EventDay};
    use chrono::FixedOffset;

    const BODY: &str = r#"{
        "kind": "calendar#events",
        "items": [
            {"summary": "Standup", "start": {"dateTime": "2026-10-14T13:00:00Z"}},
            {"summary": "Trash day", "start": {"date": "2026-10-15"}},
            {"summary": "Concert", "start": {"dateTime": "2026-10-17T20:30:00-04:00"}},
            {"summary": "Extra", "start": {"date": "2026-10-18"}}
        ]
    }"#;

    fn now() -> DateTime<FixedOffset> {
        let tz = FixedOffset::west_opt(4 * 3600).unwrap();
        tz.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap()
    }

    #[test]
    fn labels_events_in_local_time() {
        let events = parse_events(BODY, &now(), Lang::En, 3).unwrap();
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].date_label, "TODAY");
        assert_eq!(events[0].time_label, "09:00");
        assert_eq!(events[0].description, "Standup");

        assert_eq!(events[1].when, EventDay::Tomorrow);
        assert_eq!(events[1].time_label, "");

        assert_eq!(events[2].date_label, "Saturday, 17 October");
        assert_eq!(events[2].time_label, "20:30");
    }

    #[test]
    fn calendar_id_stays_in_the_path() {
        let url = events_url("en.usa#holiday@group.v.calendar.google.com").unwrap();

        assert_eq!(url.fragment(), None);
        assert!(url.path().starts_with("/calendar/v3/calendars/en.usa%23holiday"));
        assert!(url.path().ends_with("group.v.calendar.google.com/events"));

        let url = events_url("primary").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }

    #[test]
    fn no_items_is_empty() {
        let events = parse_events(r#"{"kind":"calendar#events"}"#, &now(), Lang::En, 3).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn event_without_start_is_missing_attribute() {
        let err = parse_events(r#"{"items":[{"summary":"x"}]}"#, &now(), Lang::En, 3).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::AttributeMissing);
    }
}
