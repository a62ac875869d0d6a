//! Screen geometry expressed as fractions of the usable area.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Left edge of the right-hand forecast column.
pub const COLUMN_X: f32 = 0.72;
/// Horizontal dividers between the header and the forecast subwindows.
pub const DIVIDERS: [f32; 4] = [0.25, 0.4375, 0.625, 0.8125];
/// Height of one forecast subwindow.
pub const SUBWINDOW_SPACING: f32 = 0.1875;

pub const WINDOWED_SIZE: Size = Size::new(480, 320);
const WINDOWED_MARGIN: Size = Size::new(35, 5);

const SMALL_ICON: u32 = 64;
const LARGE_ICON: u32 = 256;
const LARGE_ICON_ABOVE: i32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Size of the surface drawn into.
    pub surface: Size,
    pub xmax: i32,
    pub ymax: i32,
    icon_size: u32,
}

impl Layout {
    pub fn windowed(icon_size: Option<u32>) -> Self {
        Self {
            surface: WINDOWED_SIZE,
            xmax: (WINDOWED_SIZE.width - WINDOWED_MARGIN.width) as i32,
            ymax: (WINDOWED_SIZE.height - WINDOWED_MARGIN.height) as i32,
            icon_size: icon_size.unwrap_or(SMALL_ICON),
        }
    }

    pub fn fullscreen(surface: Size, icon_size: Option<u32>) -> Self {
        let xmax = surface.width as i32;
        let default = if xmax <= LARGE_ICON_ABOVE { SMALL_ICON } else { LARGE_ICON };
        Self {
            surface,
            xmax,
            ymax: surface.height as i32,
            icon_size: icon_size.unwrap_or(default),
        }
    }

    pub fn x(&self, fraction: f32) -> i32 {
        (self.xmax as f32 * fraction).round() as i32
    }

    pub fn y(&self, fraction: f32) -> i32 {
        (self.ymax as f32 * fraction).round() as i32
    }

    pub fn column_x(&self) -> i32 {
        self.x(COLUMN_X)
    }

    pub fn dividers(&self) -> [i32; 4] {
        DIVIDERS.map(|f| self.y(f))
    }

    /// The `index`-th forecast subwindow, counted from the top.
    pub fn subwindow(&self, index: usize) -> Rectangle {
        let top = self.y(DIVIDERS[0] + SUBWINDOW_SPACING * index as f32);
        let bottom = self.y(DIVIDERS[0] + SUBWINDOW_SPACING * (index + 1) as f32);
        let left = self.column_x();
        Rectangle::new(
            Point::new(left, top),
            Size::new((self.xmax - left).max(0) as u32, (bottom - top).max(0) as u32),
        )
    }

    /// Icon edge length, never taller than a subwindow.
    pub fn icon_size(&self) -> u32 {
        let room = self.subwindow(0).size.height.saturating_sub(4);
        self.icon_size.min(room).max(1)
    }

    /// Small displays use the compact font set.
    pub fn is_compact(&self) -> bool {
        self.ymax < 600
    }
}
