//! Core library for the `weather-rock` display.
//!
//! This crate defines:
//! - Configuration handling
//! - Forecast and calendar providers behind async traits
//! - Shared domain models (snapshots, events, units, languages)
//! - Daylight, mode scheduling and refresh gating
//! - The screen model and its embedded-graphics renderer
//!
//! It is used by the `weather-rock` binary, which owns the tick loop and the display.

pub mod advice;
pub mod calendar;
pub mod config;
pub mod daylight;
pub mod error;
pub mod i18n;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod render;
pub mod scheduler;
pub mod units;
pub mod view;

pub use config::{Config, ProviderConfig};
pub use error::{FetchError, FetchErrorKind};
pub use i18n::Lang;
pub use model::{Agenda, CalendarEvent, ForecastRequest, WeatherSnapshot};
pub use provider::{ForecastProvider, ProviderId};
pub use scheduler::Mode;
pub use units::Units;
