//! Perlin value noise

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Point;

const POINT_COUNT: usize = 256;
const PERLIN_SEED: u64 = 0x5eed_2d_7e11;

lazy_static! {
    /// Generated on first use and read-only afterwards, shared by every worker
    static ref SHARED: Perlin = Perlin::new(&mut StdRng::seed_from_u64(PERLIN_SEED));
}

/// Lattice tables for value noise
#[derive(Debug, Clone)]
pub struct Perlin {
    ranfloat: [f64; POINT_COUNT],
    perm_x: [usize; POINT_COUNT],
    perm_y: [usize; POINT_COUNT],
    perm_z: [usize; POINT_COUNT],
}
impl Perlin {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut ranfloat = [0.0; POINT_COUNT];
        for value in ranfloat.iter_mut() {
            *value = rng.gen();
        }

        Self {
            ranfloat,
            perm_x: Self::perlin_generate_perm(rng),
            perm_y: Self::perlin_generate_perm(rng),
            perm_z: Self::perlin_generate_perm(rng),
        }
    }

    /// The process-wide tables
    pub fn shared() -> &'static Perlin {
        &SHARED
    }

    /// Smoothed value noise in `[0, 1]`
    pub fn noise(&self, p: &Point) -> f64 {
        let u = p[0] - p[0].floor();
        let v = p[1] - p[1].floor();
        let w = p[2] - p[2].floor();

        let i = p[0].floor() as i64;
        let j = p[1].floor() as i64;
        let k = p[2].floor() as i64;

        let mut c = [[[0.0; 2]; 2]; 2];
        for (di, c0) in c.iter_mut().enumerate() {
            for (dj, c1) in c0.iter_mut().enumerate() {
                for (dk, c2) in c1.iter_mut().enumerate() {
                    *c2 = self.ranfloat[self.perm_x[Self::wrap(i + di as i64)]
                        ^ self.perm_y[Self::wrap(j + dj as i64)]
                        ^ self.perm_z[Self::wrap(k + dk as i64)]];
                }
            }
        }

        Self::trilinear_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves of noise with halving weight
    pub fn turbulence(&self, p: &Point, depth: Option<u32>) -> f64 {
        let depth = depth.unwrap_or(7);
        let mut accum = 0.0;
        let mut temp_p = *p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(&temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }
        accum.abs()
    }

    fn wrap(n: i64) -> usize {
        (n & (POINT_COUNT as i64 - 1)) as usize
    }

    fn perlin_generate_perm<R: Rng + ?Sized>(rng: &mut R) -> [usize; POINT_COUNT] {
        let mut p = [0; POINT_COUNT];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i;
        }
        for i in (1..POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            p.swap(i, target);
        }
        p
    }

    fn trilinear_interp(c: &[[[f64; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        // Hermitian Smoothing
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);

        let mut accum = 0.0;
        for (i, c0) in c.iter().enumerate() {
            let i = i as f64;
            for (j, c1) in c0.iter().enumerate() {
                let j = j as f64;
                for (k, value) in c1.iter().enumerate() {
                    let k = k as f64;
                    accum += (i * uu + (1.0 - i) * (1.0 - uu))
                        * (j * vv + (1.0 - j) * (1.0 - vv))
                        * (k * ww + (1.0 - k) * (1.0 - ww))
                        * value;
                }
            }
        }
        accum
    }
}
