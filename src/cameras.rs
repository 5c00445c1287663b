//! Cameras and configs for cameras
use serde::{Deserialize, Serialize};

use crate::utils::{self, SerdeVector};
use crate::{Point, Ray, Vec3};

/// Camera Config
///
/// The aspect ratio is not part of the config; it follows the output resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub look_from: SerdeVector,
    pub look_at: SerdeVector,
    #[serde(default = "CameraConfig::default_v_up")]
    pub v_up: SerdeVector,
    pub vertical_fov_deg: f64,
    #[serde(default)]
    pub aperture: f64,
    pub focus_distance: f64,
    #[serde(default)]
    pub time0: f64,
    #[serde(default = "CameraConfig::default_time1")]
    pub time1: f64,
}
impl CameraConfig {
    fn default_v_up() -> SerdeVector {
        SerdeVector([0.0, 1.0, 0.0])
    }

    fn default_time1() -> f64 {
        1.0
    }

    pub fn build(&self, aspect_ratio: f64) -> Camera {
        Camera::new(
            self.look_from.into(),
            self.look_at.into(),
            self.v_up.into(),
            self.vertical_fov_deg,
            aspect_ratio,
            self.aperture,
            self.focus_distance,
            self.time0,
            self.time1,
        )
    }
}

/// Camera and related tasks
///
/// Thin lens for depth of field, and a shutter interval for motion blur.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Point,
    lower_left_corner: Point,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
    time0: f64,
    time1: f64,
}
impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        look_from: Point,
        look_at: Point,
        v_up: Vec3,
        vertical_fov_deg: f64,
        aspect_ratio: f64,
        aperture: f64,
        focus_dist: f64,
        time0: f64,
        time1: f64,
    ) -> Self {
        // Establish the viewport
        let theta = vertical_fov_deg.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate the viewing vectors
        let w = (look_from - look_at).normalize();
        let u = (v_up.cross(&w)).normalize();
        let v = w.cross(&u);

        let origin = look_from;
        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: aperture / 2.0,
            time0,
            time1,
        }
    }

    /// Ray through viewport coordinates `(s, t)`, with `(0, 0)` at the lower left
    pub fn get_ray(&self, s: f64, t: f64) -> Ray {
        let rd = self.lens_radius * utils::random_in_unit_disk();
        let offset = self.u * rd[0] + self.v * rd[1];
        let time = self.time0 + utils::random::<f64>() * (self.time1 - self.time0);

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
            time,
        )
    }

    /// The orthonormal basis `(u, v, w)`, with `w` pointing back toward the viewer
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}
