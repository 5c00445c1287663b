//! Utils

use std::cell::RefCell;

use rand::distributions::{uniform::SampleRange, Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{Color, Vec3};

thread_local! {
    /// Every render worker owns its own generator, so no stream is shared between threads
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Reset the calling thread's generator to a known state
pub fn reseed(seed: u64) {
    RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(seed));
}

/// Run `f` against the calling thread's generator
pub fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// A random value from the standard distribution, `[0, 1)` for floats
pub fn random<T>() -> T
where
    Standard: Distribution<T>,
{
    with_rng(|rng| rng.gen())
}

/// A random value inside `range`
pub fn random_range<T, R>(range: R) -> T
where
    T: rand::distributions::uniform::SampleUniform,
    R: SampleRange<T>,
{
    with_rng(|rng| rng.gen_range(range))
}

/// Compute a random vector inside the unit sphere
///
/// Randomly generate vectors. If the squared norm is < 1, it is inside the unit sphere.
pub fn random_in_unit_sphere() -> Vec3 {
    with_rng(|rng| loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.norm_squared() < 1.0 {
            return p;
        }
    })
}

/// A uniformly distributed direction on the unit sphere
pub fn random_unit_vector() -> Vec3 {
    loop {
        let p = random_in_unit_sphere();
        let len = p.norm();
        if len > 1e-8 {
            return p / len;
        }
    }
}

/// Generate a random vector inside a unit disk in the xy plane
///
/// This simulates defocus blur
pub fn random_in_unit_disk() -> Vec3 {
    with_rng(|rng| loop {
        let p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        if p.norm_squared() < 1.0 {
            return p;
        }
    })
}

/// Mirror `v` about `n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    *v - 2.0 * v.dot(n) * *n
}

/// Bend `v` through a surface with normal `n` using Snell's law
///
/// Returns `None` on total internal reflection.
pub fn refract(v: &Vec3, n: &Vec3, ni_over_nt: f64) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - *n * dt) - *n * discriminant.sqrt())
    } else {
        None
    }
}

/// Gamma-correct (gamma = 2.0) a linear color and quantize it to bytes
pub fn to_rgb8(color: &Color) -> [u8; 3] {
    [
        scale_color(color[0]),
        scale_color(color[1]),
        scale_color(color[2]),
    ]
}

/// scale the color to between 0 and 255
fn scale_color(val: f64) -> u8 {
    if val.is_nan() {
        return 0;
    }
    (256.0 * val.max(0.0).sqrt().min(0.999)) as u8
}

/// Plain `[x, y, z]` triple for scene descriptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerdeVector(pub [f64; 3]);
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.0[0], v.0[1], v.0[2])
    }
}
