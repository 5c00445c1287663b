//! Axis-Aligned Bounding Boxes

use crate::{Point, Ray};

/// Axis-Aligned Bounding Box
///
/// Invariant: `min[a] <= max[a]` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}
impl Aabb {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Whether the box is hit by a ray inside `[t_min, t_max]`
    ///
    /// Slab test. An axis the ray runs parallel to passes only if the origin
    /// already lies inside that slab, so a zero direction component never
    /// feeds a NaN into the interval.
    pub fn hit(&self, r: &Ray, mut t_min: f64, mut t_max: f64) -> bool {
        for a in 0..3 {
            if r.dir[a] == 0.0 {
                if r.orig[a] < self.min[a] || r.orig[a] > self.max[a] {
                    return false;
                }
                continue;
            }
            let inv_d = 1.0 / r.dir[a];
            let mut t0 = (self.min[a] - r.orig[a]) * inv_d;
            let mut t1 = (self.max[a] - r.orig[a]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = if t0 > t_min { t0 } else { t_min };
            t_max = if t1 < t_max { t1 } else { t_max };
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    /// Compute the surrounding AABB between this and another
    pub fn surrounding_box(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|a| self.min[a] <= other.min[a] && other.max[a] <= self.max[a])
    }

    /// Shift the whole box by `offset`
    pub fn translated(&self, offset: &crate::Vec3) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }
}
