use std::fmt::Debug;

use embedded_graphics::{
    Drawable,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, Point, Primitive, Size},
    primitives::{PrimitiveStyle, Rectangle},
};
use u8g2_fonts::{
    FontRenderer,
    types::{FontColor, HorizontalAlignment, VerticalPosition},
};

use crate::{
    model::EventDay,
    view::{DayRow, HourRow, ScreenModel},
};

use super::{FontSet, Layout, RenderError, icons::draw_icon, palette};

const MARGIN: i32 = 4;
const UMBRELLA_Y: f32 = 0.32;
const AGENDA_Y: f32 = 0.42;
const TEMPERATURE_Y: f32 = 0.013;
const WIND_Y: f32 = 0.155;
const INFO_X: f32 = 0.05;
const INFO_LINE: f32 = 0.075;

pub(crate) struct Painter<'a, D> {
    target: &'a mut D,
    fonts: &'a FontSet,
    layout: &'a Layout,
}

enum Row<'a> {
    Day(&'a DayRow),
    Hour(&'a HourRow),
}

impl<'a, D> Painter<'a, D>
where
    D: DrawTarget<Color = Rgb888>,
    D::Error: Debug,
{
    pub(crate) fn new(target: &'a mut D, fonts: &'a FontSet, layout: &'a Layout) -> Self {
        Self {
            target,
            fonts,
            layout,
        }
    }

    pub(crate) fn weather(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        self.forecast_frame(m)?;
        self.condition(&format!("{} {}", m.humidity_label, m.humidity), MARGIN)?;
        let wind_y = self.layout.y(WIND_Y);
        self.condition(&m.wind, wind_y)?;
        for (i, day) in m.days.iter().enumerate() {
            self.subwindow(i, Row::Day(day), m.temperature_letter)?;
        }
        Ok(())
    }

    pub(crate) fn hourly(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        self.forecast_frame(m)?;
        self.condition(&format!("{} {}", m.humidity_label, m.humidity), MARGIN)?;
        let wind_y = self.layout.y(WIND_Y);
        self.condition(&format!("{} {}", m.wind_label, m.wind), wind_y)?;
        for (i, hour) in m.hours.iter().enumerate() {
            self.subwindow(i, Row::Hour(hour), m.temperature_letter)?;
        }
        Ok(())
    }

    pub(crate) fn info(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        let fonts = self.fonts;
        self.clear()?;
        self.clock(m)?;

        let indented = format!("    {}", m.info.checked_at);
        let lines = [
            &m.info.powered_by,
            &m.info.sunrise,
            &m.info.sunset,
            &m.info.day_length,
            &m.info.countdown,
            &m.info.checked_label,
            &indented,
        ];
        let x = self.layout.x(INFO_X);
        for (n, line) in lines.into_iter().enumerate() {
            let y = self.layout.y(INFO_LINE * (n + 5) as f32);
            self.text(
                &fonts.info,
                line,
                Point::new(x, y),
                VerticalPosition::Top,
                HorizontalAlignment::Left,
                palette::FOREGROUND,
            )?;
        }
        Ok(())
    }

    /// Shared by the weather and hourly screens.
    fn forecast_frame(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        self.clear()?;
        self.dividers()?;
        self.clock(m)?;
        self.current_temperature(m)?;
        self.umbrella(&m.umbrella)?;
        self.agenda(m)
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.target.clear(palette::BACKGROUND).map_err(RenderError::target)
    }

    fn dividers(&mut self) -> Result<(), RenderError> {
        let left = self.layout.column_x();
        let width = (self.layout.xmax - left).max(0) as u32;
        for y in self.layout.dividers() {
            Rectangle::new(Point::new(left, y), Size::new(width, 2))
                .into_styled(PrimitiveStyle::with_fill(palette::DIVIDER))
                .draw(self.target)
                .map_err(RenderError::target)?;
        }
        Ok(())
    }

    /// "HH:MM" with small seconds, and the date underneath, centred on the left column.
    fn clock(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let center = self.layout.column_x() / 2;
        let time_w = self.width(&fonts.time, &m.clock)?;
        let secs_w = self.width(&fonts.seconds, &m.seconds)?;
        let left = center - (time_w + secs_w + 3) / 2;

        let bounds = self.text(
            &fonts.time,
            &m.clock,
            Point::new(left, MARGIN),
            VerticalPosition::Top,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;
        self.text(
            &fonts.seconds,
            &m.seconds,
            Point::new(left + time_w + 3, MARGIN),
            VerticalPosition::Top,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;

        let below = bounds.map_or(MARGIN, |b| b.top_left.y + b.size.height as i32) + MARGIN * 2;
        self.text(
            &fonts.date,
            &m.date,
            Point::new(center, below),
            VerticalPosition::Top,
            HorizontalAlignment::Center,
            palette::FOREGROUND,
        )?;
        Ok(())
    }

    fn current_temperature(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let left = self.layout.column_x() + MARGIN;
        let top = self.layout.y(TEMPERATURE_Y);
        let bounds = self.text(
            &fonts.temperature,
            &m.temperature,
            Point::new(left, top),
            VerticalPosition::Top,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;
        let after = bounds.map_or(left, |b| b.top_left.x + b.size.width as i32) + 2;
        self.text(
            &fonts.degree,
            &format!("°{}", m.temperature_letter),
            Point::new(after, top),
            VerticalPosition::Top,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;

        let bottom = self.layout.dividers()[0] - 3;
        self.text(
            &fonts.conditions,
            &m.summary,
            Point::new(left, bottom),
            VerticalPosition::Bottom,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;
        Ok(())
    }

    /// A right-aligned line in the header of the forecast column.
    fn condition(&mut self, text: &str, top: i32) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let right = self.layout.xmax - MARGIN;
        self.text(
            &fonts.conditions,
            text,
            Point::new(right, top),
            VerticalPosition::Top,
            HorizontalAlignment::Right,
            palette::FOREGROUND,
        )?;
        Ok(())
    }

    fn umbrella(&mut self, text: &str) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let at = Point::new(self.layout.column_x() / 2, self.layout.y(UMBRELLA_Y));
        self.text(
            &fonts.umbrella,
            text,
            at,
            VerticalPosition::Top,
            HorizontalAlignment::Center,
            palette::FOREGROUND,
        )?;
        Ok(())
    }

    /// Upcoming events in the left column, stopping at the bottom of the screen.
    fn agenda(&mut self, m: &ScreenModel) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let max_width = self.layout.column_x() - MARGIN * 2;
        let mut y = self.layout.y(AGENDA_Y);

        for event in m.agenda.iter().filter(|e| !e.description.is_empty()) {
            if y >= self.layout.ymax {
                break;
            }
            let date_color = match event.when {
                EventDay::Today => palette::EVENT_TODAY,
                EventDay::Tomorrow => palette::EVENT_TOMORROW,
                EventDay::Later => palette::EVENT_LATER,
            };

            let date = self.text(
                &fonts.event,
                &event.date_label,
                Point::new(MARGIN, y),
                VerticalPosition::Top,
                HorizontalAlignment::Left,
                date_color,
            )?;
            let date_right = date.map_or(MARGIN, |b| b.top_left.x + b.size.width as i32);
            self.text(
                &fonts.event,
                &event.time_label,
                Point::new(date_right + 15, y),
                VerticalPosition::Top,
                HorizontalAlignment::Left,
                palette::EVENT_TIME,
            )?;

            let line = self.line_height(&fonts.event)?;
            y += line + 2;

            let description = self.fit(&fonts.event, &event.description, max_width)?;
            self.text(
                &fonts.event,
                &description,
                Point::new(MARGIN, y),
                VerticalPosition::Top,
                HorizontalAlignment::Left,
                palette::FOREGROUND,
            )?;
            y += line + line / 2;
        }
        Ok(())
    }

    fn subwindow(&mut self, index: usize, row: Row<'_>, letter: char) -> Result<(), RenderError> {
        let fonts = self.fonts;
        let rect = self.layout.subwindow(index);
        let left = rect.top_left.x;
        let top = rect.top_left.y;
        let height = rect.size.height as i32;
        let center_y = top + height / 2;
        let right = self.layout.xmax;
        let degree = format!("°{letter}");
        let degree_w = self.width(&fonts.row_degree, &degree)?;
        let temp_right = right - degree_w - 1;

        let (label, precip, icon) = match &row {
            Row::Day(d) => (&d.label, &d.precip, d.icon),
            Row::Hour(h) => (&h.label, &h.precip, h.icon),
        };

        let label_w = self.width(&fonts.row_label, label)?;
        self.text(
            &fonts.row_label,
            label,
            Point::new(left + 2, center_y),
            VerticalPosition::Center,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;
        self.text(
            &fonts.precip,
            precip,
            Point::new(left + MARGIN, center_y + height / 3),
            VerticalPosition::Center,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;

        let temps_w = match &row {
            Row::Day(d) => {
                let high_w = self.temperature(&d.high, &degree, temp_right, top + 3, VerticalPosition::Top)?;
                let low_w = self.temperature(&d.low, &degree, temp_right, top + height - 3, VerticalPosition::Bottom)?;
                high_w.max(low_w)
            }
            Row::Hour(h) => self.temperature(&h.temperature, &degree, temp_right, center_y, VerticalPosition::Center)?,
        };

        let free_left = left + 2 + label_w + 2;
        let free_right = temp_right - temps_w - 2;
        let size = self
            .layout
            .icon_size()
            .min((free_right - free_left).max(8) as u32);
        let icon_center = Point::new((free_left + free_right) / 2, center_y);
        draw_icon(self.target, icon, icon_center, size).map_err(RenderError::target)
    }

    /// Right-aligned temperature followed by a small degree sign. Returns the number's width.
    fn temperature(
        &mut self,
        value: &str,
        degree: &str,
        right: i32,
        y: i32,
        v: VerticalPosition,
    ) -> Result<i32, RenderError> {
        let fonts = self.fonts;
        self.text(
            &fonts.row_temperature,
            value,
            Point::new(right, y),
            v,
            HorizontalAlignment::Right,
            palette::FOREGROUND,
        )?;
        self.text(
            &fonts.row_degree,
            degree,
            Point::new(right + 1, y),
            v,
            HorizontalAlignment::Left,
            palette::FOREGROUND,
        )?;
        self.width(&fonts.row_temperature, value)
    }

    fn text(
        &mut self,
        font: &FontRenderer,
        text: &str,
        at: Point,
        v: VerticalPosition,
        h: HorizontalAlignment,
        color: Rgb888,
    ) -> Result<Option<Rectangle>, RenderError> {
        if text.is_empty() {
            return Ok(None);
        }
        font.render_aligned(text, at, v, h, FontColor::Transparent(color), self.target)
            .map_err(|e| RenderError::Text(format!("{e:?}")))
    }

    fn width(&self, font: &FontRenderer, text: &str) -> Result<i32, RenderError> {
        let dims = font
            .get_rendered_dimensions(text, Point::zero(), VerticalPosition::Top)
            .map_err(|e| RenderError::Text(format!("{e:?}")))?;
        Ok(dims.bounding_box.map_or(0, |b| b.size.width as i32))
    }

    fn line_height(&self, font: &FontRenderer) -> Result<i32, RenderError> {
        let dims = font
            .get_rendered_dimensions("Ág", Point::zero(), VerticalPosition::Top)
            .map_err(|e| RenderError::Text(format!("{e:?}")))?;
        Ok(dims.bounding_box.map_or(0, |b| b.size.height as i32))
    }

    /// Drops trailing characters until `text` is at most `max_width` pixels wide.
    fn fit(&self, font: &FontRenderer, text: &str, max_width: i32) -> Result<String, RenderError> {
        let mut out = text.to_string();
        while !out.is_empty() && self.width(font, &out)? > max_width {
            out.pop();
        }
        Ok(out)
    }
}
