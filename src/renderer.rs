//! Radiance estimation and the parallel row driver

use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{cameras::Camera, objects::Hittable, utils, Color, Ray};

/// Smallest ray parameter accepted, keeps bounced rays off their own surface
pub const T_EPSILON: f64 = 0.001;

/// What a ray that escapes the scene sees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// No light from outside; enclosed scenes are lit only by emitters
    Black,
    /// Blend from white at the horizon to light blue overhead
    Sky,
    /// A fixed color in every direction
    Solid([f64; 3]),
}
impl Background {
    pub fn radiance(&self, ray: &Ray) -> Color {
        match self {
            Background::Black => Color::zeros(),
            Background::Sky => {
                let unit_direction = ray.dir.normalize();
                let t = 0.5 * (unit_direction[1] + 1.0);
                (1.0 - t) * Color::new(1.0, 1.0, 1.0) + t * Color::new(0.5, 0.7, 1.0)
            }
            Background::Solid(c) => Color::new(c[0], c[1], c[2]),
        }
    }
}

/// Recursive path-tracing estimator
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    background: Background,
}
impl Integrator {
    /// Bounces beyond this depth contribute only emission
    pub const MAX_DEPTH: u32 = 50;

    pub fn new(background: Background) -> Self {
        Self { background }
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Radiance carried back along `ray`, `depth` bounces into the path
    pub fn radiance(&self, ray: &Ray, world: &dyn Hittable, depth: u32) -> Color {
        let Some(hr) = world.try_hit(ray, T_EPSILON, f64::INFINITY) else {
            return self.background.radiance(ray);
        };

        let emitted = hr.material.emitted(hr.u, hr.v, &hr.p);
        if depth < Self::MAX_DEPTH {
            if let Some(sr) = hr.material.try_scatter(ray, &hr) {
                return emitted
                    + sr
                        .attenuation
                        .component_mul(&self.radiance(&sr.scattered, world, depth + 1));
            }
        }
        emitted
    }
}

/// Order rows are laid out in the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowOrder {
    /// Row 0 is the top of the image
    #[default]
    TopDown,
    /// Row 0 is the bottom of the image
    BottomUp,
}

/// Render Settings
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    /// Number of worker threads, each taking one contiguous block of rows
    pub workers: usize,
    /// Reseed the generator per pixel so output does not depend on scheduling
    pub seed: Option<u64>,
    pub row_order: RowOrder,
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
            samples_per_pixel: 1,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            seed: None,
            row_order: RowOrder::TopDown,
        }
    }
}

/// Gamma-corrected 8-bit RGB pixels, 3 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    row_order: RowOrder,
    data: Vec<u8>,
}
impl FrameBuffer {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }

    /// Raw bytes in this buffer's row order
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at column `x`, row `y` counted from the top of the image
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image. See [`FrameBuffer::pixel_checked`].
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixel_checked(x, y).unwrap_or_else(|| {
            panic!(
                "pixel ({x}, {y}) out of bounds for {}x{} image",
                self.width, self.height
            )
        })
    }

    /// Pixel at column `x`, row `y` counted from the top, or `None` outside the image
    pub fn pixel_checked(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = match self.row_order {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => self.height - 1 - y,
        };
        let idx = 3 * (row * self.width + x);
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Top-down image ready for encoding
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.pixel(x as usize, y as usize))
        })
    }

    /// Encode to `path`, format picked from the extension
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }
}

/// Per-pixel seed, spread so neighbouring pixels get unrelated streams
fn pixel_seed(seed: u64, x: usize, j: usize, width: usize) -> u64 {
    let index = (j * width + x) as u64;
    seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the scene into a frame buffer
///
/// Rows are split into `settings.workers` contiguous blocks, one per worker.
/// Workers only read the scene and write disjoint slices of the buffer. The
/// call returns once every block is finished.
pub fn render(
    world: &(dyn Hittable + Sync),
    camera: &Camera,
    integrator: &Integrator,
    settings: &RenderSettings,
    progress: &ProgressBar,
) -> crate::Result<FrameBuffer> {
    let RenderSettings {
        width,
        height,
        samples_per_pixel,
        workers,
        seed,
        row_order,
    } = *settings;
    let workers = workers.max(1);
    let samples = samples_per_pixel.max(1);
    let row_len = 3 * width;
    let mut data = vec![0u8; row_len * height];

    log::info!(
        "rendering {width}x{height}, {samples} samples per pixel, {workers} workers"
    );
    let start = Instant::now();
    progress.set_length(height as u64);

    if width > 0 && height > 0 {
        let rows_per_block = height.div_ceil(workers);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

        pool.install(|| {
            data.par_chunks_mut(rows_per_block * row_len)
                .enumerate()
                .for_each(|(block, chunk)| {
                    for (offset, row) in chunk.chunks_mut(row_len).enumerate() {
                        let r = block * rows_per_block + offset;
                        // Image row counted from the bottom, as the camera expects
                        let j = match row_order {
                            RowOrder::TopDown => height - 1 - r,
                            RowOrder::BottomUp => r,
                        };
                        for (x, pixel) in row.chunks_mut(3).enumerate() {
                            if let Some(seed) = seed {
                                utils::reseed(pixel_seed(seed, x, j, width));
                            }
                            let mut color = Color::zeros();
                            for _ in 0..samples {
                                let s = (x as f64 + utils::random::<f64>()) / width as f64;
                                let t = (j as f64 + utils::random::<f64>()) / height as f64;
                                let ray = camera.get_ray(s, t);
                                color += integrator.radiance(&ray, world, 0);
                            }
                            pixel.copy_from_slice(&utils::to_rgb8(&(color / samples as f64)));
                        }
                        progress.inc(1);
                    }
                });
        });
    }

    progress.finish();
    log::info!("render finished in {:.2?}", start.elapsed());

    Ok(FrameBuffer {
        width,
        height,
        row_order,
        data,
    })
}
