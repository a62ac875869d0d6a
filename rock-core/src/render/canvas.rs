use std::{convert::Infallible, io::Write};

use embedded_graphics::{
    Pixel,
    pixelcolor::{Rgb888, RgbColor},
    prelude::{DrawTarget, OriginDimensions, Size},
};

/// An in-memory RGB frame that screens are drawn into before being presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb888::BLACK; (size.width * size.height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.size.width && y < self.size.height {
            Some(self.pixels[(y * self.size.width + x) as usize])
        } else {
            None
        }
    }

    /// Number of pixels that differ from `background`.
    pub fn count_not(&self, background: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p != background).count()
    }

    /// Binary PPM (P6).
    pub fn write_ppm<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.size.width, self.size.height)?;
        let mut buf = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            buf.extend_from_slice(&[p.r(), p.g(), p.b()]);
        }
        out.write_all(&buf)?;
        out.flush()
    }

    /// Little-endian RGB565 for a `device`-sized buffer with `stride` bytes per line.
    pub fn to_rgb565(&self, device: Size, stride: usize) -> Vec<u8> {
        self.encode(device, stride, 2, |p| {
            let v = ((p.r() as u16 >> 3) << 11) | ((p.g() as u16 >> 2) << 5) | (p.b() as u16 >> 3);
            v.to_le_bytes().to_vec()
        })
    }

    /// Little-endian XRGB8888 (B, G, R, X in memory) for a `device`-sized buffer.
    pub fn to_xrgb8888(&self, device: Size, stride: usize) -> Vec<u8> {
        self.encode(device, stride, 4, |p| vec![p.b(), p.g(), p.r(), 0])
    }

    /// The output is exactly `stride * device.height` bytes. A canvas larger
    /// than the device is cropped at the right and bottom edges.
    fn encode(
        &self,
        device: Size,
        stride: usize,
        bytes_per_pixel: usize,
        f: impl Fn(Rgb888) -> Vec<u8>,
    ) -> Vec<u8> {
        let stride = stride.max(device.width as usize * bytes_per_pixel);
        let mut out = vec![0u8; stride * device.height as usize];

        let width = self.size.width as usize;
        let cols = width.min(device.width as usize);
        let rows = self.size.height.min(device.height) as usize;

        for (row, line) in self.pixels.chunks(width.max(1)).take(rows).enumerate() {
            let start = row * stride;
            for (col, p) in line[..cols].iter().enumerate() {
                let at = start + col * bytes_per_pixel;
                out[at..at + bytes_per_pixel].copy_from_slice(&f(*p));
            }
        }
        out
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        for Pixel(point, color) in pixels {
            if (0..w).contains(&point.x) && (0..h).contains(&point.y) {
                self.pixels[(point.y * w + point.x) as usize] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}
