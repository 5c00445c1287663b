//! Translation and rotation

use crate::{
    aabb::Aabb,
    objects::{HitRecord, Hittable, HittableObj},
    Point, Ray, Vec3,
};

/// Translate an object
pub struct Translate {
    obj: HittableObj,
    offset: Vec3,
}
impl Translate {
    pub fn new(obj: HittableObj, offset: Vec3) -> Self {
        Self { obj, offset }
    }
}
impl Hittable for Translate {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let moved_ray = Ray::new(ray.orig - self.offset, ray.dir, ray.time);

        self.obj.try_hit(&moved_ray, t_min, t_max).map(|mut hr| {
            hr.p += self.offset;
            hr
        })
    }

    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.obj
            .try_bounding_box(time0, time1)
            .map(|output_box| output_box.translated(&self.offset))
    }
}

/// Rotate an object about the Y axis
pub struct RotateY {
    obj: HittableObj,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}
impl RotateY {
    pub fn new(obj: HittableObj, angle_deg: f64) -> Self {
        let radians = angle_deg.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        // An unbounded object stays unbounded after rotation
        let bbox = obj.try_bounding_box(0.0, 1.0).map(|bbox| {
            let mut min = Point::repeat(f64::INFINITY);
            let mut max = Point::repeat(f64::NEG_INFINITY);

            for i in 0..2 {
                for j in 0..2 {
                    for k in 0..2 {
                        let x = i as f64 * bbox.max[0] + (1 - i) as f64 * bbox.min[0];
                        let y = j as f64 * bbox.max[1] + (1 - j) as f64 * bbox.min[1];
                        let z = k as f64 * bbox.max[2] + (1 - k) as f64 * bbox.min[2];

                        let new_x = cos_theta * x + sin_theta * z;
                        let new_z = -sin_theta * x + cos_theta * z;

                        let tester = Vec3::new(new_x, y, new_z);
                        min = min.inf(&tester);
                        max = max.sup(&tester);
                    }
                }
            }
            Aabb::new(min, max)
        });

        Self {
            obj,
            sin_theta,
            cos_theta,
            bbox,
        }
    }

    /// World space to object space
    fn to_object(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v[0] - self.sin_theta * v[2],
            v[1],
            self.sin_theta * v[0] + self.cos_theta * v[2],
        )
    }

    /// Object space back to world space
    fn to_world(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v[0] + self.sin_theta * v[2],
            v[1],
            -self.sin_theta * v[0] + self.cos_theta * v[2],
        )
    }
}
impl Hittable for RotateY {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let rotated_r = Ray::new(self.to_object(&ray.orig), self.to_object(&ray.dir), ray.time);

        self.obj.try_hit(&rotated_r, t_min, t_max).map(|mut rec| {
            rec.p = self.to_world(&rec.p);
            rec.normal = self.to_world(&rec.normal);
            rec
        })
    }

    fn try_bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        self.bbox
    }
}
