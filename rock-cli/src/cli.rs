use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embedded_graphics::prelude::Size;
use rock_core::{Config, Mode, render::{Layout, Renderer}, view::ScreenModel};

use crate::{
    app::{self, Feeds, RunOptions},
    configure::{self, Target},
    sink,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-rock",
    version,
    about = "Weather and calendar dashboard for small framebuffer displays"
)]
pub struct Cli {
    /// Read and write this config file instead of the per-user one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the display loop.
    Run {
        /// Use the 480x320 layout even on a larger framebuffer.
        #[arg(long)]
        windowed: bool,

        /// Write every frame to this PPM file instead of the framebuffer.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Configure a forecast provider or the calendar.
    Configure {
        /// "darksky", "openmeteo" or "calendar".
        target: String,
    },

    /// Fetch once and print what the screens would show.
    Show,

    /// Fetch once and draw a single screen to a PPM file.
    Render {
        /// "weather", "hourly" or "info".
        #[arg(long, default_value = "weather")]
        mode: String,

        #[arg(long, default_value = "frame.ppm")]
        out: PathBuf,

        /// Draw the fullscreen layout at this size, e.g. 1280x720.
        #[arg(long, value_parser = parse_size)]
        size: Option<Size>,
    },
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let w = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
    let h = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
    Ok(Size::new(w, h))
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command.unwrap_or(Command::Run {
            windowed: false,
            output: None,
        }) {
            Command::Run { windowed, output } => {
                app::run(config, RunOptions { windowed, output }).await
            }
            Command::Configure { target } => {
                let target = Target::try_from(target.as_str())?;
                configure::configure(config, target, self.config.as_deref())
            }
            Command::Show => show(&config).await,
            Command::Render { mode, out, size } => {
                let mode = Mode::try_from(mode.as_str())?;
                render(&config, mode, &out, size).await
            }
        }
    }
}

async fn fetch_model(config: &Config) -> Result<ScreenModel> {
    let feeds = Feeds::prime(config).await?;
    feeds
        .model(config)
        .context("Forecast provider returned no data")
}

async fn show(config: &Config) -> Result<()> {
    let model = fetch_model(config).await?;

    println!("{}:{}  {}", model.clock, model.seconds, model.date);
    println!(
        "{}°{}  {}",
        model.temperature, model.temperature_letter, model.summary
    );
    println!(
        "{} {}  {} {}",
        model.humidity_label, model.humidity, model.wind_label, model.wind
    );
    if !model.umbrella.is_empty() {
        println!("{}", model.umbrella);
    }

    println!();
    for day in &model.days {
        println!(
            "{:<8} {:>4}° / {:>4}°  {:>4}  {}",
            day.label,
            day.high,
            day.low,
            day.precip,
            day.icon.as_str()
        );
    }

    println!();
    for hour in &model.hours {
        println!(
            "{:<8} {:>4}°  {:>4}  {}",
            hour.label,
            hour.temperature,
            hour.precip,
            hour.icon.as_str()
        );
    }

    let info = &model.info;
    println!();
    println!("{}", info.powered_by);
    println!("{}", info.sunrise);
    println!("{}", info.sunset);
    println!("{}", info.day_length);
    println!("{}", info.countdown);
    println!("{} {}", info.checked_label, info.checked_at);

    let events: Vec<_> = model
        .agenda
        .iter()
        .filter(|e| !e.description.is_empty())
        .collect();
    if !events.is_empty() {
        println!();
        for event in events {
            println!(
                "{:<10} {:<5} {}",
                event.date_label, event.time_label, event.description
            );
        }
    }

    Ok(())
}

async fn render(config: &Config, mode: Mode, out: &std::path::Path, size: Option<Size>) -> Result<()> {
    let model = fetch_model(config).await?;
    let icon_size = config.display.icon_size;
    let layout = match size {
        Some(s) => Layout::fullscreen(s, icon_size),
        None => Layout::windowed(icon_size),
    };

    let frame = Renderer::new(layout)
        .frame(mode, &model)
        .with_context(|| format!("Failed to draw the {mode} screen"))?;
    sink::write_ppm(&frame, out)?;
    println!("{mode} screen written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_argument() {
        assert_eq!(parse_size("1280x720").unwrap(), Size::new(1280, 720));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("wide x tall").is_err());
    }

    #[test]
    fn run_is_the_default_command() {
        let cli = Cli::try_parse_from(["weather-rock"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["weather-rock", "render", "--mode", "info", "--size", "800x480"])
            .unwrap();
        assert!(matches!(cli.command, Some(Command::Render { size: Some(_), .. })));
    }
}
