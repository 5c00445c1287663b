//! Textures/colors

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{perlin::Perlin, utils::SerdeVector, Color, Error, Point, Texture};

pub trait Textured {
    fn value(&self, u: f64, v: f64, p: &Point) -> Color;
}

/// Solid Color
#[derive(Debug, Clone)]
pub struct SolidColor {
    color_value: Color,
}
impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color_value: color }
    }
}
impl Textured for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: &Point) -> Color {
        self.color_value
    }
}

/// Checker Texture
///
/// Alternates in 3-D space, not in surface coordinates.
pub struct Checker {
    odd: Texture,
    even: Texture,
}
impl Checker {
    pub fn new(even: Texture, odd: Texture) -> Self {
        Self { odd, even }
    }

    pub fn from_solid_colors(c1: Color, c2: Color) -> Self {
        Self {
            even: Arc::new(SolidColor::new(c1)),
            odd: Arc::new(SolidColor::new(c2)),
        }
    }
}
impl Textured for Checker {
    fn value(&self, u: f64, v: f64, p: &Point) -> Color {
        let sines = (10.0 * p[0]).sin() * (10.0 * p[1]).sin() * (10.0 * p[2]).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// How a noise texture turns the noise field into a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseStyle {
    /// Grey level equal to the smoothed noise
    Smooth,
    /// Sine stripes along z perturbed by turbulence
    Marble,
}

/// Noise Texture
#[derive(Clone)]
pub struct Noise {
    noise: &'static Perlin,
    scale: f64,
    style: NoiseStyle,
}
impl Noise {
    pub fn new(scale: f64) -> Self {
        Self {
            noise: Perlin::shared(),
            scale,
            style: NoiseStyle::Smooth,
        }
    }

    pub fn marble(scale: f64) -> Self {
        Self {
            style: NoiseStyle::Marble,
            ..Self::new(scale)
        }
    }
}
impl Textured for Noise {
    fn value(&self, _u: f64, _v: f64, p: &Point) -> Color {
        let scaled = self.scale * *p;
        let grey = match self.style {
            NoiseStyle::Smooth => self.noise.noise(&scaled),
            NoiseStyle::Marble => {
                0.5 * (1.0 + (scaled[2] + 10.0 * self.noise.turbulence(&scaled, None)).sin())
            }
        };
        Color::repeat(grey)
    }
}

/// Nearest-pixel lookup into a decoded image
///
/// Rows are stored top to bottom, so `v = 1` is the first row.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    data: Arc<[u8]>,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
}
impl ImageTexture {
    /// Wrap an already decoded buffer of `width * height * bytes_per_pixel` bytes
    ///
    /// The first three channels of each pixel are read as RGB.
    pub fn new(
        data: impl Into<Arc<[u8]>>,
        width: usize,
        height: usize,
        bytes_per_pixel: usize,
    ) -> crate::Result<Self> {
        let data = data.into();
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(bytes_per_pixel))
            .ok_or(Error::ImageTooLarge {
                width,
                height,
                bytes_per_pixel,
            })?;
        if width == 0 || height == 0 || bytes_per_pixel < 3 || data.len() != expected {
            return Err(Error::InvalidImage {
                width,
                height,
                bytes_per_pixel,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            bytes_per_pixel,
        })
    }

    /// Decode an image file into an RGB texture
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| Error::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = img.dimensions();
        log::debug!("loaded texture {path:?} ({width}x{height})");
        Self::new(img.into_raw(), width as usize, height as usize, 3)
    }
}
impl Textured for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: &Point) -> Color {
        let i = ((u * self.width as f64) as isize).clamp(0, self.width as isize - 1) as usize;
        let j = (((1.0 - v) * self.height as f64) as isize).clamp(0, self.height as isize - 1)
            as usize;

        let idx = self.bytes_per_pixel * (i + self.width * j);
        let scale = 1.0 / 255.0;
        Color::new(
            scale * self.data[idx] as f64,
            scale * self.data[idx + 1] as f64,
            scale * self.data[idx + 2] as f64,
        )
    }
}

/// Config for textures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureConfig {
    Solid { color: SerdeVector },
    Checker { even: Box<TextureConfig>, odd: Box<TextureConfig> },
    Noise { scale: f64 },
    Marble { scale: f64 },
    Image { path: PathBuf },
}
impl TextureConfig {
    pub fn build(&self) -> crate::Result<Texture> {
        Ok(match self {
            TextureConfig::Solid { color } => Arc::new(SolidColor::new((*color).into())),
            TextureConfig::Checker { even, odd } => Arc::new(Checker::new(even.build()?, odd.build()?)),
            TextureConfig::Noise { scale } => Arc::new(Noise::new(*scale)),
            TextureConfig::Marble { scale } => Arc::new(Noise::marble(*scale)),
            TextureConfig::Image { path } => Arc::new(ImageTexture::open(path)?),
        })
    }
}
