//! Weather icons drawn from primitives, so any size scales cleanly.

use embedded_graphics::{
    Drawable,
    pixelcolor::Rgb888,
    prelude::{DrawTarget, Point, Primitive, Size},
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle},
};

use crate::model::IconCode;

use super::palette;

/// Draws `icon` in a `size` x `size` box centred on `center`.
pub fn draw_icon<D>(target: &mut D, icon: IconCode, center: Point, size: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let s = Scale(size.max(8));
    match icon {
        IconCode::ClearDay => sun(target, center, s.px(0.22)),
        IconCode::ClearNight => moon(target, center, s.px(0.3)),
        IconCode::PartlyCloudyDay => {
            sun(target, center + s.offset(-0.16, -0.14), s.px(0.16))?;
            cloud(target, center + s.offset(0.06, 0.08), s.px(0.72), palette::CLOUD)
        }
        IconCode::PartlyCloudyNight => {
            moon(target, center + s.offset(-0.16, -0.16), s.px(0.2))?;
            cloud(target, center + s.offset(0.06, 0.08), s.px(0.72), palette::CLOUD)
        }
        IconCode::Cloudy => cloud(target, center, s.px(0.86), palette::CLOUD),
        IconCode::Rain => {
            cloud(target, center + s.offset(0.0, -0.14), s.px(0.8), palette::STORM_CLOUD)?;
            for dx in [-0.22, 0.0, 0.22] {
                streak(target, center + s.offset(dx, 0.18), &s, palette::RAIN)?;
            }
            Ok(())
        }
        IconCode::Snow => {
            cloud(target, center + s.offset(0.0, -0.14), s.px(0.8), palette::CLOUD)?;
            for (dx, dy) in [(-0.22, 0.2), (0.0, 0.32), (0.22, 0.2)] {
                flake(target, center + s.offset(dx, dy), s.px(0.09))?;
            }
            Ok(())
        }
        IconCode::Sleet => {
            cloud(target, center + s.offset(0.0, -0.14), s.px(0.8), palette::STORM_CLOUD)?;
            streak(target, center + s.offset(-0.2, 0.18), &s, palette::RAIN)?;
            flake(target, center + s.offset(0.05, 0.3), s.px(0.08))?;
            streak(target, center + s.offset(0.24, 0.18), &s, palette::RAIN)
        }
        IconCode::Wind => wind(target, center, &s),
        IconCode::Fog => fog(target, center, &s),
        IconCode::Unknown => Circle::with_center(center, s.px(0.6) as u32)
            .into_styled(PrimitiveStyle::with_stroke(palette::CLOUD, s.stroke()))
            .draw(target),
    }
}

/// Converts fractions of the icon box into pixels.
struct Scale(u32);

impl Scale {
    fn px(&self, fraction: f32) -> i32 {
        (self.0 as f32 * fraction).round() as i32
    }

    fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.px(dx), self.px(dy))
    }

    fn stroke(&self) -> u32 {
        (self.0 / 24).max(1)
    }
}

fn sun<D>(target: &mut D, center: Point, radius: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Circle::with_center(center, (radius * 2) as u32)
        .into_styled(PrimitiveStyle::with_fill(palette::SUN))
        .draw(target)?;

    let ray = PrimitiveStyle::with_stroke(palette::SUN, (radius as u32 / 5).max(1));
    for step in 0..8 {
        let angle = step as f32 * std::f32::consts::FRAC_PI_4;
        let (sin, cos) = angle.sin_cos();
        let at = |r: f32| center + Point::new((cos * r).round() as i32, (sin * r).round() as i32);
        Line::new(at(radius as f32 * 1.35), at(radius as f32 * 1.8))
            .into_styled(ray)
            .draw(target)?;
    }
    Ok(())
}

fn moon<D>(target: &mut D, center: Point, radius: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let diameter = (radius * 2) as u32;
    Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(palette::MOON))
        .draw(target)?;
    // Carve the crescent out with a background disc.
    let bite = Point::new(radius * 9 / 20, -(radius * 3 / 10));
    Circle::with_center(center + bite, diameter)
        .into_styled(PrimitiveStyle::with_fill(palette::BACKGROUND))
        .draw(target)
}

fn cloud<D>(target: &mut D, center: Point, width: i32, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = PrimitiveStyle::with_fill(color);
    let w = width as f32;
    let px = |f: f32| (w * f).round() as i32;

    let base = Rectangle::new(
        center + Point::new(-px(0.5), 0),
        Size::new(width as u32, px(0.3).max(1) as u32),
    );
    let corner = px(0.15).max(1) as u32;
    RoundedRectangle::with_equal_corners(base, Size::new(corner, corner))
        .into_styled(style)
        .draw(target)?;

    Circle::with_center(center + Point::new(-px(0.18), px(0.04)), px(0.45) as u32)
        .into_styled(style)
        .draw(target)?;
    Circle::with_center(center + Point::new(px(0.14), -px(0.02)), px(0.6) as u32)
        .into_styled(style)
        .draw(target)
}

fn streak<D>(target: &mut D, top: Point, s: &Scale, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(top, top + s.offset(-0.08, 0.22))
        .into_styled(PrimitiveStyle::with_stroke(color, s.stroke() + 1))
        .draw(target)
}

fn flake<D>(target: &mut D, center: Point, diameter: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Circle::with_center(center, diameter.max(2) as u32)
        .into_styled(PrimitiveStyle::with_fill(palette::SNOW))
        .draw(target)
}

fn wind<D>(target: &mut D, center: Point, s: &Scale) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = PrimitiveStyle::with_stroke(palette::CLOUD, s.stroke() + 1);
    for (dy, half) in [(-0.2, 0.3), (0.0, 0.4), (0.2, 0.24)] {
        let y = center.y + s.px(dy);
        let end = Point::new(center.x + s.px(half), y);
        Line::new(Point::new(center.x - s.px(0.4), y), end)
            .into_styled(style)
            .draw(target)?;
        Circle::with_center(end + Point::new(0, -s.px(0.05)), s.px(0.1) as u32)
            .into_styled(style)
            .draw(target)?;
    }
    Ok(())
}

fn fog<D>(target: &mut D, center: Point, s: &Scale) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let height = s.px(0.07).max(1) as u32;
    for (i, dy) in [-0.27, -0.09, 0.09, 0.27].into_iter().enumerate() {
        let inset = if i % 2 == 0 { 0.0 } else { 0.08 };
        let left = center + s.offset(-0.4 + inset, dy);
        let width = s.px(0.8 - inset * 2.0).max(1) as u32;
        Rectangle::new(left, Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(palette::FOG))
            .draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::Canvas;

    const ALL: [IconCode; 11] = [
        IconCode::ClearDay,
        IconCode::ClearNight,
        IconCode::Rain,
        IconCode::Snow,
        IconCode::Sleet,
        IconCode::Wind,
        IconCode::Fog,
        IconCode::Cloudy,
        IconCode::PartlyCloudyDay,
        IconCode::PartlyCloudyNight,
        IconCode::Unknown,
    ];

    #[test]
    fn every_icon_draws_inside_its_box() {
        for icon in ALL {
            let mut canvas = Canvas::new(Size::new(64, 64));
            draw_icon(&mut canvas, icon, Point::new(32, 32), 64).unwrap();
            assert!(canvas.count_not(palette::BACKGROUND) > 20, "{icon:?} drew nothing");
        }
    }

    #[test]
    fn icons_scale_with_size() {
        let mut small = Canvas::new(Size::new(256, 256));
        let mut large = Canvas::new(Size::new(256, 256));
        draw_icon(&mut small, IconCode::Cloudy, Point::new(128, 128), 64).unwrap();
        draw_icon(&mut large, IconCode::Cloudy, Point::new(128, 128), 256).unwrap();
        assert!(large.count_not(palette::BACKGROUND) > 4 * small.count_not(palette::BACKGROUND));
    }
}
