//! The display loop: keys, scheduling, drawing and refreshing on one thread.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Timelike, Utc};
use embedded_graphics::prelude::Size;
use log::{error, info, warn};
use rock_core::{
    Agenda, Config,
    calendar::calendar_from_config,
    provider::default_provider_from_config,
    refresh::{CalendarFeed, ForecastFeed},
    render::{Canvas, Layout, Renderer},
    scheduler::Scheduler,
    view::ScreenModel,
};
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    input::{self, KeyCommand},
    sink::{FrameSink, Framebuffer, PpmFile, write_ppm},
};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Draw the 480x320 layout even on a larger display.
    pub windowed: bool,
    /// Write frames to this PPM file instead of the framebuffer.
    pub output: Option<PathBuf>,
}

/// Forecast and calendar feeds, primed and ready to draw.
pub struct Feeds {
    pub forecast: ForecastFeed,
    pub calendar: Option<CalendarFeed>,
}

impl Feeds {
    /// Builds both feeds and fetches once. Only the forecast must succeed.
    pub async fn prime(config: &Config) -> Result<Self> {
        let (id, provider) = default_provider_from_config(config)?;
        let mut forecast = ForecastFeed::new(
            provider,
            config.forecast_request(id),
            config.refresh.forecast_timer(),
        );

        let name = forecast.provider_name().to_string();
        forecast
            .prime(Utc::now())
            .await
            .with_context(|| format!("No data from {name}"))?;

        let mut calendar = calendar_from_config(config)?.map(|provider| {
            CalendarFeed::new(provider, config.calendar.slots(), config.refresh.calendar_timer())
        });
        if let Some(feed) = calendar.as_mut() {
            feed.refresh(Utc::now()).await;
        }

        Ok(Self { forecast, calendar })
    }

    /// Builds the screen model for the current moment, if a snapshot is loaded.
    pub fn model(&self, config: &Config) -> Option<ScreenModel> {
        let snapshot = self.forecast.snapshot()?;
        let blank = Agenda::empty(0);
        let agenda = self.calendar.as_ref().map_or(&blank, |c| c.agenda());
        let last_checked = self.forecast.timer().last_success().unwrap_or(snapshot.fetched_at);

        Some(ScreenModel::build(
            snapshot,
            agenda,
            &Local::now(),
            last_checked,
            config.units,
            config.lang,
            self.forecast.provider_name(),
        ))
    }

    async fn refresh(&mut self) {
        let now = Utc::now();
        self.forecast.refresh(now).await;
        if let Some(cal) = self.calendar.as_mut() {
            cal.refresh(now).await;
        }
    }
}

fn open_sink(config: &Config, opts: &RunOptions) -> Result<(Box<dyn FrameSink>, Layout)> {
    let icon_size = config.display.icon_size;

    if let Some(path) = &opts.output {
        info!("Writing frames to {}", path.display());
        return Ok((Box::new(PpmFile::new(path.clone())), Layout::windowed(icon_size)));
    }

    let fb = Framebuffer::open(&config.display.framebuffer)?;
    let g = fb.geometry();
    info!(
        "Framebuffer size: {} x {} ({} bpp)",
        g.width, g.height, g.bits_per_pixel
    );

    let layout = if config.display.fullscreen && !opts.windowed {
        Layout::fullscreen(Size::new(g.width, g.height), icon_size)
    } else {
        Layout::windowed(icon_size)
    };
    Ok((Box::new(fb), layout))
}

fn save_screenshot(frame: Option<&Canvas>, config: &Config) {
    let Some(frame) = frame else {
        warn!("Nothing drawn yet, screenshot skipped");
        return;
    };
    let path = &config.display.screenshot_path;
    match write_ppm(frame, path) {
        Ok(()) => info!("Screen capture saved to {}", path.display()),
        Err(err) => error!("Screen capture failed: {err:#}"),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(err) => {
                warn!("Cannot listen for SIGTERM: {err}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

pub async fn run(config: Config, opts: RunOptions) -> Result<()> {
    let mut feeds = Feeds::prime(&config).await?;
    let (mut sink, layout) = open_sink(&config, &opts)?;
    let renderer = Renderer::new(layout);
    let mut scheduler = Scheduler::new(config.schedule.thresholds());
    let mut keys = input::spawn_reader();

    let mut ticker = interval(config.schedule.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut last_second = None;
    let mut frame: Option<Canvas> = None;

    info!("Display loop started in {} mode", scheduler.mode());

    'running: loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break 'running;
            }
            _ = ticker.tick() => {}
        }

        while let Ok(cmd) = keys.try_recv() {
            match cmd {
                KeyCommand::Show(mode) => {
                    scheduler.request(mode);
                    // Redraw on this tick instead of waiting for the next second.
                    last_second = None;
                }
                KeyCommand::Screenshot => save_screenshot(frame.as_ref(), &config),
                KeyCommand::Quit => break 'running,
            }
        }

        let now = Local::now();
        let mode = scheduler.tick(now.minute());

        let second = now.second();
        if last_second == Some(second) {
            continue;
        }
        last_second = Some(second);

        if let Some(model) = feeds.model(&config) {
            match renderer.frame(mode, &model) {
                Ok(canvas) => {
                    if let Err(err) = sink.present(&canvas) {
                        error!("Failed to present frame: {err:#}");
                    }
                    frame = Some(canvas);
                }
                Err(err) => error!("Failed to draw {mode} screen: {err}"),
            }
        }

        if second == 0 {
            feeds.refresh().await;
        }
    }

    info!("Display loop stopped");
    Ok(())
}
