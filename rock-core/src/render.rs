//! Draws a [`ScreenModel`] for the active mode onto any RGB draw target.

use std::fmt::Debug;

use embedded_graphics::{pixelcolor::Rgb888, prelude::DrawTarget};
use thiserror::Error;

use crate::{scheduler::Mode, view::ScreenModel};

pub mod canvas;
pub mod fonts;
pub mod icons;
pub mod layout;
mod screens;

pub use canvas::Canvas;
pub use layout::Layout;

use fonts::FontSet;
use screens::Painter;

pub mod palette {
    use embedded_graphics::pixelcolor::Rgb888;

    pub const BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);
    pub const FOREGROUND: Rgb888 = Rgb888::new(255, 255, 255);
    pub const DIVIDER: Rgb888 = Rgb888::new(255, 255, 255);

    pub const EVENT_TODAY: Rgb888 = Rgb888::new(204, 255, 204);
    pub const EVENT_TOMORROW: Rgb888 = Rgb888::new(255, 255, 204);
    pub const EVENT_LATER: Rgb888 = Rgb888::new(230, 230, 230);
    pub const EVENT_TIME: Rgb888 = Rgb888::new(255, 204, 255);

    pub const SUN: Rgb888 = Rgb888::new(255, 200, 40);
    pub const MOON: Rgb888 = Rgb888::new(230, 230, 200);
    pub const CLOUD: Rgb888 = Rgb888::new(200, 200, 210);
    pub const STORM_CLOUD: Rgb888 = Rgb888::new(140, 140, 155);
    pub const RAIN: Rgb888 = Rgb888::new(80, 150, 255);
    pub const SNOW: Rgb888 = Rgb888::new(245, 250, 255);
    pub const FOG: Rgb888 = Rgb888::new(160, 160, 160);
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw text: {0}")]
    Text(String),

    #[error("draw target rejected the frame: {0}")]
    Target(String),
}

impl RenderError {
    pub(crate) fn target<E: Debug>(err: E) -> Self {
        RenderError::Target(format!("{err:?}"))
    }
}

/// Holds the geometry and fonts for one display and draws frames for it.
pub struct Renderer {
    layout: Layout,
    fonts: FontSet,
}

impl Renderer {
    pub fn new(layout: Layout) -> Self {
        let fonts = if layout.is_compact() {
            FontSet::compact()
        } else {
            FontSet::large()
        };
        Self { layout, fonts }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn draw<D>(&self, target: &mut D, mode: Mode, model: &ScreenModel) -> Result<(), RenderError>
    where
        D: DrawTarget<Color = Rgb888>,
        D::Error: Debug,
    {
        let mut painter = Painter::new(target, &self.fonts, &self.layout);
        match mode {
            Mode::Weather => painter.weather(model),
            Mode::Hourly => painter.hourly(model),
            Mode::Info => painter.info(model),
        }
    }

    /// Draws into a fresh [`Canvas`] the size of the layout's surface.
    pub fn frame(&self, mode: Mode, model: &ScreenModel) -> Result<Canvas, RenderError> {
        let mut canvas = Canvas::new(self.layout.surface);
        self.draw(&mut canvas, mode, model)?;
        Ok(canvas)
    }
}
