//! Path Tracing Library
//!
//! Monte Carlo path tracer over spheres, axis-aligned rectangles, boxes and
//! constant-density media, accelerated by a bounding volume hierarchy.

use std::sync::Arc;

use nalgebra::Vector3;

pub mod aabb;
pub mod bvh;
pub mod cameras;
pub mod error;
pub mod materials;
pub mod mediums;
pub mod objects;
pub mod perlin;
pub mod renderer;
pub mod scenes;
pub mod textures;
pub mod transrot;
pub mod utils;

use materials::Scatterable;
use textures::Textured;

pub use error::{Error, Result};

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;

/// Materials are immutable and shared between every primitive that uses them
pub type Material = Arc<dyn Scatterable + Send + Sync>;
/// Textures are shared the same way materials are
pub type Texture = Arc<dyn Textured + Send + Sync>;

/// Prelude
pub mod prelude {
    pub use crate::aabb::Aabb;
    pub use crate::bvh::Bvh;
    pub use crate::cameras::Camera;
    pub use crate::materials::{Dielectric, DiffuseLight, Isotropic, Lambertian, Metal};
    pub use crate::mediums::ConstantMedium;
    pub use crate::objects::{
        Cuboid, FlipNormals, HitRecord, Hittable, HittableList, HittableObj, MovingSphere, Plane,
        Rectangle, Sphere,
    };
    pub use crate::renderer::{Background, FrameBuffer, Integrator, RenderSettings, RowOrder};
    pub use crate::textures::{Checker, ImageTexture, Noise, SolidColor};
    pub use crate::transrot::{RotateY, Translate};
    pub use crate::{Color, Material, Point, Ray, Texture, Vec3};
}

/// The ray in ray tracing
///
/// `dir` is not required to be unit length. `time` is the instant inside the
/// shutter interval the ray was sampled at.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub orig: Point,
    pub dir: Vec3,
    pub time: f64,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3, time: f64) -> Self {
        Self { orig, dir, time }
    }

    pub fn get(&self, t: f64) -> Point {
        self.orig + t * self.dir
    }
}
