//! Where rendered frames go: a Linux framebuffer device or a PPM file.

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use embedded_graphics::prelude::Size;
use rock_core::render::Canvas;

pub trait FrameSink {
    fn present(&mut self, frame: &Canvas) -> Result<()>;
}

/// Geometry of an fbdev device as reported under `/sys/class/graphics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbGeometry {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per line.
    pub stride: usize,
}

impl FbGeometry {
    pub fn from_sysfs(dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
        };

        let (width, height) = parse_virtual_size(&read("virtual_size")?)?;
        let bits_per_pixel = read("bits_per_pixel")?
            .trim()
            .parse()
            .context("Invalid bits_per_pixel")?;
        let stride = match read("stride") {
            Ok(s) => s.trim().parse().context("Invalid stride")?,
            Err(_) => width as usize * (bits_per_pixel as usize / 8),
        };

        Ok(Self {
            width,
            height,
            bits_per_pixel,
            stride,
        })
    }
}

/// Parses "1920,1080".
fn parse_virtual_size(input: &str) -> Result<(u32, u32)> {
    let (w, h) = input
        .trim()
        .split_once(',')
        .ok_or_else(|| anyhow!("Invalid virtual_size '{}'", input.trim()))?;
    Ok((
        w.trim().parse().context("Invalid framebuffer width")?,
        h.trim().parse().context("Invalid framebuffer height")?,
    ))
}

pub struct Framebuffer {
    device: PathBuf,
    file: File,
    geometry: FbGeometry,
}

impl Framebuffer {
    pub fn open(device: &Path) -> Result<Self> {
        let name = device
            .file_name()
            .ok_or_else(|| anyhow!("Invalid framebuffer path: {}", device.display()))?;
        let geometry = FbGeometry::from_sysfs(&Path::new("/sys/class/graphics").join(name))?;
        if !matches!(geometry.bits_per_pixel, 16 | 32) {
            bail!(
                "Unsupported framebuffer depth: {} bpp (expected 16 or 32)",
                geometry.bits_per_pixel
            );
        }

        let file = OpenOptions::new()
            .write(true)
            .open(device)
            .with_context(|| format!("Failed to open framebuffer {}", device.display()))?;

        Ok(Self {
            device: device.to_path_buf(),
            file,
            geometry,
        })
    }

    pub fn geometry(&self) -> FbGeometry {
        self.geometry
    }
}

impl FbGeometry {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// One full device frame; a canvas larger than the device is cropped.
    pub fn encode(&self, frame: &Canvas) -> Vec<u8> {
        match self.bits_per_pixel {
            16 => frame.to_rgb565(self.size(), self.stride),
            _ => frame.to_xrgb8888(self.size(), self.stride),
        }
    }
}

impl FrameSink for Framebuffer {
    fn present(&mut self, frame: &Canvas) -> Result<()> {
        let bytes = self.geometry.encode(frame);
        self.file.seek(SeekFrom::Start(0))?;
        self.file
            .write_all(&bytes)
            .with_context(|| format!("Failed to write framebuffer {}", self.device.display()))
    }
}

/// Rewrites one PPM file with every frame, for desktops and headless runs.
pub struct PpmFile {
    path: PathBuf,
}

impl PpmFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FrameSink for PpmFile {
    fn present(&mut self, frame: &Canvas) -> Result<()> {
        write_ppm(frame, &self.path)
    }
}

pub fn write_ppm(frame: &Canvas, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    frame
        .write_ppm(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("weather-rock-{tag}-{nanos}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn virtual_size_parsing() {
        assert_eq!(parse_virtual_size("800,480\n").unwrap(), (800, 480));
        assert!(parse_virtual_size("800x480").is_err());
    }

    #[test]
    fn geometry_from_sysfs_files() {
        let dir = temp_dir("fb");
        std::fs::write(dir.join("virtual_size"), "480,320\n").unwrap();
        std::fs::write(dir.join("bits_per_pixel"), "16\n").unwrap();

        let g = FbGeometry::from_sysfs(&dir).unwrap();
        assert_eq!((g.width, g.height, g.bits_per_pixel), (480, 320, 16));
        assert_eq!(g.stride, 960);

        std::fs::write(dir.join("stride"), "1024\n").unwrap();
        assert_eq!(FbGeometry::from_sysfs(&dir).unwrap().stride, 1024);
    }

    #[test]
    fn windowed_frame_fits_a_smaller_device() {
        let g = FbGeometry {
            width: 320,
            height: 240,
            bits_per_pixel: 16,
            stride: 640,
        };
        let frame = Canvas::new(Size::new(480, 320));
        assert_eq!(g.encode(&frame).len(), 640 * 240);
    }

    #[test]
    fn ppm_sink_writes_file() {
        let dir = temp_dir("ppm");
        let path = dir.join("frame.ppm");
        let mut sink = PpmFile::new(path.clone());
        sink.present(&Canvas::new(Size::new(3, 2))).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(bytes.len(), 11 + 3 * 2 * 3);
    }
}
