//! Which screen is shown, and when the loop changes it on its own.

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Weather,
    Hourly,
    Info,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Weather => "weather",
            Mode::Hourly => "hourly",
            Mode::Info => "info",
        }
    }

    pub const fn all() -> &'static [Mode] {
        &[Mode::Weather, Mode::Hourly, Mode::Info]
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Mode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "weather" | "d" => Ok(Mode::Weather),
            "hourly" | "h" => Ok(Mode::Hourly),
            "info" | "i" => Ok(Mode::Info),
            _ => Err(anyhow::anyhow!(
                "Unknown mode '{value}'. Supported modes: weather, hourly, info."
            )),
        }
    }
}

/// Tick counts after which the scheduler overrides the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Strictly more periodic ticks than this rotates Hourly/Weather by minute parity.
    pub rotate_after: u32,
    /// Strictly more periodic ticks than this forces Info.
    pub info_after: u32,
}

impl Thresholds {
    /// Converts wall-clock durations into tick counts for a loop paced at `tick`.
    pub fn from_durations(tick: Duration, rotate_after: Duration, info_after: Duration) -> Self {
        Self {
            rotate_after: ticks_in(rotate_after, tick),
            info_after: ticks_in(info_after, tick),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_durations(
            Duration::from_millis(100),
            Duration::from_secs(60),
            Duration::from_secs(900),
        )
    }
}

fn ticks_in(span: Duration, tick: Duration) -> u32 {
    let tick_ms = tick.as_millis().max(1);
    u32::try_from(span.as_millis() / tick_ms).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerState {
    pub mode: Mode,
    pub idle_ticks: u32,
    pub periodic_ticks: u32,
}

impl SchedulerState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            idle_ticks: 0,
            periodic_ticks: 0,
        }
    }
}

/// A manual mode switch: takes effect at once and restarts both counters.
pub fn request(_state: SchedulerState, mode: Mode) -> SchedulerState {
    SchedulerState::new(mode)
}

/// Advances the state by one tick. `minute` is the current wall-clock minute.
///
/// Weather is a resting state: it only counts idle ticks and never rotates on
/// its own. Rotation starts once Hourly or Info is shown.
pub fn tick(state: SchedulerState, thresholds: &Thresholds, minute: u32) -> SchedulerState {
    match state.mode {
        Mode::Weather => SchedulerState {
            mode: Mode::Weather,
            idle_ticks: state.idle_ticks.saturating_add(1),
            periodic_ticks: 0,
        },
        Mode::Hourly | Mode::Info => {
            let periodic_ticks = state.periodic_ticks.saturating_add(1);
            let mode = if periodic_ticks > thresholds.info_after {
                Mode::Info
            } else if periodic_ticks > thresholds.rotate_after && minute % 2 == 0 {
                Mode::Hourly
            } else if periodic_ticks > thresholds.rotate_after {
                Mode::Weather
            } else {
                state.mode
            };

            SchedulerState {
                mode,
                idle_ticks: 0,
                periodic_ticks,
            }
        }
    }
}

/// Owns the live state and logs every mode change.
#[derive(Debug, Clone)]
pub struct Scheduler {
    state: SchedulerState,
    thresholds: Thresholds,
}

impl Scheduler {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            state: SchedulerState::default(),
            thresholds,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn request(&mut self, mode: Mode) -> Mode {
        let next = request(self.state, mode);
        self.apply(next, "requested");
        next.mode
    }

    pub fn tick(&mut self, minute: u32) -> Mode {
        let next = tick(self.state, &self.thresholds, minute);
        self.apply(next, "scheduled");
        next.mode
    }

    fn apply(&mut self, next: SchedulerState, why: &str) {
        if next.mode != self.state.mode {
            info!("Switched to {} mode ({why})", next.mode);
        }
        self.state = next;
    }
}
