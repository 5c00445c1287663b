//! Mediums

use std::sync::Arc;

use crate::{
    aabb::Aabb,
    materials::Isotropic,
    objects::{HitRecord, Hittable, HittableObj},
    textures::SolidColor,
    utils, Color, Material, Ray, Texture, Vec3,
};

/// Constant Medium
///
/// Fog or smoke filling a closed boundary. Rays scatter inside it after an
/// exponentially distributed distance governed by the density.
pub struct ConstantMedium {
    boundary: HittableObj,
    phase_function: Material,
    neg_inv_density: f64,
}
impl ConstantMedium {
    pub fn new(b: HittableObj, d: f64, a: Texture) -> Self {
        Self {
            boundary: b,
            phase_function: Arc::new(Isotropic::new(a)),
            neg_inv_density: -1.0 / d,
        }
    }

    pub fn from_color(b: HittableObj, d: f64, c: Color) -> Self {
        Self::new(b, d, Arc::new(SolidColor::new(c)))
    }
}
impl Hittable for ConstantMedium {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        // Entry and exit along the whole line, so an origin inside the volume still works
        let rec1 = self
            .boundary
            .try_hit(ray, f64::NEG_INFINITY, f64::INFINITY)?;
        let rec2 = self.boundary.try_hit(ray, rec1.t + 0.0001, f64::INFINITY)?;

        let mut t_enter = rec1.t.max(t_min);
        let t_exit = rec2.t.min(t_max);
        if t_enter >= t_exit {
            return None;
        }
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.dir.norm();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * utils::random::<f64>().ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }
        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.get(t),
            // Arbitrary, isotropic scattering ignores it
            normal: Vec3::new(1.0, 0.0, 0.0),
            t,
            material: &*self.phase_function,
            u: 0.0,
            v: 0.0,
        })
    }

    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.boundary.try_bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Cuboid, Sphere};
    use crate::{materials::Lambertian, Point};

    fn fog(density: f64) -> ConstantMedium {
        let boundary = Sphere::new(
            Point::zeros(),
            1.0,
            Arc::new(Lambertian::new(Color::repeat(0.5))),
        );
        ConstantMedium::from_color(Box::new(boundary), density, Color::repeat(0.9))
    }

    #[test]
    fn scatter_points_stay_inside_the_boundary() {
        utils::reseed(21);
        let medium = fog(2.0);
        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.1, 1.0), 0.0);
        let mut hits = 0;
        for _ in 0..500 {
            if let Some(hr) = medium.try_hit(&ray, 0.001, f64::INFINITY) {
                hits += 1;
                assert!(hr.p.norm() <= 1.0 + 1e-9);
                assert!(hr.t > 0.0);
            }
        }
        // With density 2 over a path of length ~2 most rays scatter
        assert!(hits > 400, "only {hits} of 500 rays scattered");
    }

    #[test]
    fn origin_inside_the_volume_scatters_forward() {
        utils::reseed(4);
        let medium = fog(1000.0);
        let ray = Ray::new(Point::zeros(), Vec3::new(1.0, 0.0, 0.0), 0.0);
        let hr = medium
            .try_hit(&ray, 0.001, f64::INFINITY)
            .expect("dense fog always scatters");
        assert!(hr.t >= 0.0 && hr.t < 1.0);
    }

    #[test]
    fn thin_fog_mostly_lets_rays_through() {
        utils::reseed(8);
        let boundary = Cuboid::new(
            Point::repeat(-1.0),
            Point::repeat(1.0),
            Arc::new(Lambertian::new(Color::repeat(0.5))),
        );
        let medium = ConstantMedium::from_color(Box::new(boundary), 0.001, Color::repeat(1.0));
        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let hits = (0..500)
            .filter(|_| medium.try_hit(&ray, 0.001, f64::INFINITY).is_some())
            .count();
        assert!(hits < 25, "{hits} of 500 rays scattered in thin fog");
    }

    #[test]
    fn missing_the_boundary_misses_the_medium() {
        let medium = fog(10.0);
        let ray = Ray::new(Point::new(0.0, 5.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(medium.try_hit(&ray, 0.001, f64::INFINITY).is_none());
        assert_eq!(
            medium.try_bounding_box(0.0, 1.0).unwrap().max,
            Point::new(1.0, 1.0, 1.0)
        );
    }
}
