//! Gated refetching that never loses the last good data.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::{
    Agenda, FetchError, FetchErrorKind, ForecastRequest, WeatherSnapshot,
    calendar::CalendarProvider, provider::ForecastProvider,
};

/// Decides when the next network call is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTimer {
    interval: Duration,
    retry: Duration,
    last_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    next_due: Option<DateTime<Utc>>,
}

impl RefreshTimer {
    pub fn new(interval: std::time::Duration, retry: std::time::Duration) -> Self {
        Self {
            interval: to_chrono(interval),
            retry: to_chrono(retry),
            last_attempt: None,
            last_success: None,
            next_due: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due.is_none_or(|due| now >= due)
    }

    pub fn record_success(&mut self, now: DateTime<Utc>) {
        self.last_attempt = Some(now);
        self.last_success = Some(now);
        self.next_due = Some(now + self.interval);
    }

    /// Network trouble is retried sooner; a malformed answer waits the full interval.
    pub fn record_failure(&mut self, now: DateTime<Utc>, kind: FetchErrorKind) {
        self.last_attempt = Some(now);
        let wait = match kind {
            FetchErrorKind::Network => self.retry.min(self.interval),
            FetchErrorKind::Decode | FetchErrorKind::AttributeMissing => self.interval,
        };
        self.next_due = Some(now + wait);
    }

    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.last_attempt
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }
}

fn to_chrono(d: std::time::Duration) -> Duration {
    Duration::from_std(d).unwrap_or(Duration::MAX)
}

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The timer said it was too early to ask again.
    Skipped,
    Updated,
    /// The fetch failed; the previous data is still in use.
    Kept(FetchError),
}

/// The forecast provider, its request, and the last good snapshot.
#[derive(Debug)]
pub struct ForecastFeed {
    provider: Box<dyn ForecastProvider>,
    request: ForecastRequest,
    timer: RefreshTimer,
    snapshot: Option<WeatherSnapshot>,
}

impl ForecastFeed {
    pub fn new(provider: Box<dyn ForecastProvider>, request: ForecastRequest, timer: RefreshTimer) -> Self {
        Self {
            provider,
            request,
            timer,
            snapshot: None,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.display_name()
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    /// First fetch at startup. Unlike [`ForecastFeed::refresh`], the error is handed back.
    pub async fn prime(&mut self, now: DateTime<Utc>) -> Result<&WeatherSnapshot, FetchError> {
        match self.provider.fetch(&self.request).await {
            Ok(snapshot) => {
                self.timer.record_success(now);
                info!("Loaded forecast from {}", self.provider.display_name());
                Ok(self.snapshot.insert(snapshot))
            }
            Err(err) => {
                self.timer.record_failure(now, err.kind());
                Err(err)
            }
        }
    }

    pub async fn refresh(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        if !self.timer.is_due(now) {
            return RefreshOutcome::Skipped;
        }

        match self.provider.fetch(&self.request).await {
            Ok(snapshot) => {
                self.timer.record_success(now);
                self.snapshot = Some(snapshot);
                info!("Forecast refreshed from {}", self.provider.display_name());
                RefreshOutcome::Updated
            }
            Err(err) => {
                self.timer.record_failure(now, err.kind());
                warn!("Forecast refresh failed ({}), keeping previous data: {err}", err.kind());
                RefreshOutcome::Kept(err)
            }
        }
    }
}

/// The calendar provider and the agenda currently on screen.
#[derive(Debug)]
pub struct CalendarFeed {
    provider: Box<dyn CalendarProvider>,
    slots: usize,
    timer: RefreshTimer,
    agenda: Agenda,
}

impl CalendarFeed {
    pub fn new(provider: Box<dyn CalendarProvider>, slots: usize, timer: RefreshTimer) -> Self {
        Self {
            provider,
            slots,
            timer,
            agenda: Agenda::empty(slots),
        }
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub async fn refresh(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        if !self.timer.is_due(now) {
            return RefreshOutcome::Skipped;
        }

        match self.provider.fetch_upcoming(self.slots).await {
            Ok(events) => {
                if events.is_empty() {
                    info!("No upcoming events found");
                }
                self.timer.record_success(now);
                self.agenda = Agenda::from_events(self.slots, events);
                RefreshOutcome::Updated
            }
            Err(err) => {
                self.timer.record_failure(now, err.kind());
                warn!("Calendar refresh failed ({}), keeping previous events: {err}", err.kind());
                RefreshOutcome::Kept(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarEvent, Lang, Units, model::fixtures};
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex};

    #[derive(Debug, Default)]
    struct Scripted {
        answers: Mutex<VecDeque<Result<WeatherSnapshot, FetchError>>>,
    }

    impl Scripted {
        fn with(answers: Vec<Result<WeatherSnapshot, FetchError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
            }
        }
    }

    #[async_trait]
    impl ForecastProvider for Scripted {
        fn display_name(&self) -> &str {
            "Scripted"
        }

        async fn fetch(&self, _request: &ForecastRequest) -> Result<WeatherSnapshot, FetchError> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::missing("scripted", "answer")))
        }
    }

    #[derive(Debug)]
    struct OneEvent;

    #[async_trait]
    impl CalendarProvider for OneEvent {
        async fn fetch_upcoming(&self, _max: usize) -> Result<Vec<CalendarEvent>, FetchError> {
            Ok(vec![CalendarEvent {
                description: "Dentist".into(),
                ..Default::default()
            }])
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedCalendar {
        answers: Mutex<VecDeque<Result<Vec<CalendarEvent>, FetchError>>>,
    }

    #[async_trait]
    impl CalendarProvider for ScriptedCalendar {
        async fn fetch_upcoming(&self, _max: usize) -> Result<Vec<CalendarEvent>, FetchError> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::missing("scripted", "answer")))
        }
    }

    fn event(description: &str) -> CalendarEvent {
        CalendarEvent {
            description: description.into(),
            ..Default::default()
        }
    }

    fn request() -> ForecastRequest {
        ForecastRequest {
            api_key: None,
            lat: 0.0,
            lon: 0.0,
            units: Units::Us,
            lang: Lang::En,
        }
    }

    fn timer() -> RefreshTimer {
        RefreshTimer::new(
            std::time::Duration::from_secs(300),
            std::time::Duration::from_secs(60),
        )
    }

    fn decode_err() -> FetchError {
        crate::error::decode::<u8>("scripted", "{").unwrap_err()
    }

    fn t0() -> DateTime<Utc> {
        fixtures::snapshot().fetched_at
    }

    #[test]
    fn timer_gates_by_interval_and_kind() {
        let mut t = timer();
        let now = t0();
        assert!(t.is_due(now));

        t.record_success(now);
        assert!(!t.is_due(now + Duration::seconds(299)));
        assert!(t.is_due(now + Duration::seconds(300)));
        assert_eq!(t.last_success(), Some(now));

        let later = now + Duration::seconds(300);
        t.record_failure(later, FetchErrorKind::Network);
        assert!(t.is_due(later + Duration::seconds(60)));
        assert_eq!(t.last_success(), Some(now));
        assert_eq!(t.last_attempt(), Some(later));

        t.record_failure(later, FetchErrorKind::Decode);
        assert!(!t.is_due(later + Duration::seconds(60)));
        assert!(t.is_due(later + Duration::seconds(300)));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let first = fixtures::snapshot();
        let provider = Scripted::with(vec![Ok(first.clone()), Err(decode_err())]);
        let mut feed = ForecastFeed::new(Box::new(provider), request(), timer());

        let now = t0();
        feed.prime(now).await.unwrap();

        let outcome = feed.refresh(now + Duration::seconds(10)).await;
        assert!(matches!(outcome, RefreshOutcome::Skipped));

        let outcome = feed.refresh(now + Duration::seconds(301)).await;
        match outcome {
            RefreshOutcome::Kept(err) => assert_eq!(err.kind(), FetchErrorKind::Decode),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(feed.snapshot(), Some(&first));
    }

    #[tokio::test]
    async fn successful_refresh_replaces_snapshot() {
        let first = fixtures::snapshot();
        let mut second = first.clone();
        second.summary = "Rain".into();

        let provider = Scripted::with(vec![Ok(first), Ok(second.clone())]);
        let mut feed = ForecastFeed::new(Box::new(provider), request(), timer());

        let now = t0();
        feed.prime(now).await.unwrap();
        let outcome = feed.refresh(now + Duration::seconds(300)).await;
        assert!(matches!(outcome, RefreshOutcome::Updated));
        assert_eq!(feed.snapshot().map(|s| s.summary.as_str()), Some("Rain"));
    }

    #[tokio::test]
    async fn prime_failure_is_returned() {
        let provider = Scripted::with(vec![Err(decode_err())]);
        let mut feed = ForecastFeed::new(Box::new(provider), request(), timer());
        assert!(feed.prime(t0()).await.is_err());
        assert!(feed.snapshot().is_none());
    }

    #[tokio::test]
    async fn calendar_feed_fills_slots() {
        let mut feed = CalendarFeed::new(Box::new(OneEvent), 3, timer());
        assert!(feed.agenda().is_blank());

        let outcome = feed.refresh(t0()).await;
        assert!(matches!(outcome, RefreshOutcome::Updated));
        assert_eq!(feed.agenda().capacity(), 3);
        assert_eq!(feed.agenda().slots()[0].description, "Dentist");
    }

    #[tokio::test]
    async fn failed_calendar_refresh_keeps_previous_agenda() {
        let not_found = FetchError::Status {
            service: "scripted",
            status: reqwest::StatusCode::NOT_FOUND,
            body: String::new(),
        };
        let provider = ScriptedCalendar {
            answers: Mutex::new(
                vec![Ok(vec![event("Dentist"), event("Recital")]), Err(not_found)].into(),
            ),
        };
        let mut feed = CalendarFeed::new(Box::new(provider), 3, timer());

        let now = t0();
        assert!(matches!(feed.refresh(now).await, RefreshOutcome::Updated));

        let later = now + Duration::seconds(301);
        match feed.refresh(later).await {
            RefreshOutcome::Kept(err) => assert_eq!(err.kind(), FetchErrorKind::Network),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let slots = feed.agenda().slots();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].description, "Dentist");
        assert_eq!(slots[1].description, "Recital");
        assert!(slots[2].description.is_empty());

        // Network failures retry on the short interval.
        assert!(!feed.timer.is_due(later + Duration::seconds(59)));
        assert!(feed.timer.is_due(later + Duration::seconds(60)));
    }
}
