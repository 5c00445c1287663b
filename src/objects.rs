//! Objects
use serde::{Deserialize, Serialize};

use crate::{aabb::Aabb, materials::Scatterable, Material, Point, Ray, Vec3};

pub type HittableObj = Box<dyn Hittable + Send + Sync>;

pub trait Hittable {
    /// The closest intersection with `t` inside `[t_min, t_max]`
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;

    /// Bounds of the object over the shutter interval, `None` if unbounded
    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb>;
}

/// Represents a hit
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point,
    /// Surface normal, pointing out of the object unless flipped
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Material of the surface that was hit
    pub material: &'a dyn Scatterable,
    /// U,V surface coordinates
    pub u: f64,
    /// U,V surface coordinates
    pub v: f64,
}

#[derive(Default)]
pub struct HittableList(pub Vec<HittableObj>);
impl HittableList {
    pub fn add(&mut self, boxed_obj: HittableObj) {
        self.0.push(boxed_obj)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl Hittable for HittableList {
    // Every member is tested; the window shrinks so a later member only wins if it is closer
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest_so_far = t_max;
        let mut hr_final = None;

        for obj in &self.0 {
            if let Some(hr) = obj.try_hit(ray, t_min, closest_so_far) {
                closest_so_far = hr.t;
                hr_final = Some(hr)
            }
        }
        hr_final
    }

    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let mut output_box: Option<Aabb> = None;

        for obj in &self.0 {
            let tmp_box = obj.try_bounding_box(time0, time1)?;
            output_box = Some(match output_box {
                Some(output_box) => output_box.surrounding_box(&tmp_box),
                None => tmp_box,
            });
        }
        output_box
    }
}

pub struct Sphere {
    center: Point,
    radius: f64,
    material: Material,
}
impl Sphere {
    pub fn new(center: Point, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn get_uv(p: &Point) -> (f64, f64) {
        // p: a given point on the sphere of radius one, centered at the origin.
        // u: returned value [0,1] of angle around the Y axis from X=-1.
        // v: returned value [0,1] of angle from Y=-1 to Y=+1.
        //     <1 0 0> yields <0.50 0.50>       <-1  0  0> yields <0.00 0.50>
        //     <0 1 0> yields <0.50 1.00>       < 0 -1  0> yields <0.50 0.00>
        //     <0 0 1> yields <0.25 0.50>       < 0  0 -1> yields <0.75 0.50>

        let theta = (-p[1]).clamp(-1.0, 1.0).acos();
        let phi = (-p[2]).atan2(p[0]) + std::f64::consts::PI;

        let u = phi / (2.0 * std::f64::consts::PI);
        let v = theta / std::f64::consts::PI;
        (u, v)
    }
}
impl Hittable for Sphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(
            &self.center,
            self.radius,
            &*self.material,
            ray,
            t_min,
            t_max,
        )
    }

    fn try_bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let v = Vec3::repeat(self.radius.abs());
        Some(Aabb::new(self.center - v, self.center + v))
    }
}

/// Ray/sphere intersection shared by the static and moving spheres
fn hit_sphere<'a>(
    center: &Point,
    radius: f64,
    material: &'a dyn Scatterable,
    ray: &Ray,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord<'a>> {
    let oc = ray.orig - center;
    let a = ray.dir.norm_squared();
    if a == 0.0 {
        return None;
    }
    let half_b = oc.dot(&ray.dir);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    // Find the nearest root that lies in the acceptable range
    let sqrtd = discriminant.sqrt();
    let mut root = (-half_b - sqrtd) / a;
    if root < t_min || t_max < root {
        root = (-half_b + sqrtd) / a;
        if root < t_min || t_max < root {
            return None;
        }
    }
    let p = ray.get(root);
    // A negative radius flips the normal inward but keeps the surface mapping
    let normal = (p - center) / radius;
    let (u, v) = Sphere::get_uv(&(p - center).normalize());
    Some(HitRecord {
        p,
        normal,
        t: root,
        material,
        u,
        v,
    })
}

/// Moving Sphere
///
/// The center travels linearly from `initial_center` at `initial_time` to
/// `final_center` at `final_time`.
pub struct MovingSphere {
    initial_center: Point,
    final_center: Point,
    initial_time: f64,
    final_time: f64,
    radius: f64,
    material: Material,
}
impl MovingSphere {
    pub fn new(
        initial_center: Point,
        final_center: Point,
        initial_time: f64,
        final_time: f64,
        radius: f64,
        material: Material,
    ) -> Self {
        Self {
            initial_center,
            final_center,
            initial_time,
            final_time,
            radius,
            material,
        }
    }

    pub fn center(&self, time: f64) -> Point {
        let span = self.final_time - self.initial_time;
        if span == 0.0 {
            return self.initial_center;
        }
        self.initial_center
            + ((time - self.initial_time) / span) * (self.final_center - self.initial_center)
    }
}
impl Hittable for MovingSphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(
            &self.center(ray.time),
            self.radius,
            &*self.material,
            ray,
            t_min,
            t_max,
        )
    }

    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let v = Vec3::repeat(self.radius.abs());

        let box0 = Aabb::new(self.center(time0) - v, self.center(time0) + v);
        let box1 = Aabb::new(self.center(time1) - v, self.center(time1) + v);

        Some(box0.surrounding_box(&box1))
    }
}

/// Which coordinate plane a rectangle lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}
impl Plane {
    /// Indices of the two in-plane axes followed by the fixed axis
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::Xy => (0, 1, 2),
            Plane::Xz => (0, 2, 1),
            Plane::Yz => (1, 2, 0),
        }
    }
}

/// Axis-aligned rectangle
///
/// Spans `[a0, a1] x [b0, b1]` over the plane's two in-plane axes at
/// `k` on the fixed axis. The normal points along the fixed axis.
pub struct Rectangle {
    plane: Plane,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    material: Material,
}
impl Rectangle {
    pub fn new(plane: Plane, a0: f64, a1: f64, b0: f64, b1: f64, k: f64, material: Material) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
        }
    }

    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Material) -> Self {
        Self::new(Plane::Xy, x0, x1, y0, y1, k, material)
    }

    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Material) -> Self {
        Self::new(Plane::Xz, x0, x1, z0, z1, k, material)
    }

    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Material) -> Self {
        Self::new(Plane::Yz, y0, y1, z0, z1, k, material)
    }
}
impl Hittable for Rectangle {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let t = (self.k - ray.orig[k_axis]) / ray.dir[k_axis];
        // A ray parallel to the plane gives an infinite or NaN t
        if !t.is_finite() || t < t_min || t > t_max {
            return None;
        }
        let a = ray.orig[a_axis] + t * ray.dir[a_axis];
        let b = ray.orig[b_axis] + t * ray.dir[b_axis];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }
        let mut normal = Vec3::zeros();
        normal[k_axis] = 1.0;
        Some(HitRecord {
            p: ray.get(t),
            normal,
            t,
            material: &*self.material,
            u: (a - self.a0) / (self.a1 - self.a0),
            v: (b - self.b0) / (self.b1 - self.b0),
        })
    }

    fn try_bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        // Pad the fixed axis so the box never has zero width
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let mut min = Point::zeros();
        let mut max = Point::zeros();
        min[a_axis] = self.a0;
        max[a_axis] = self.a1;
        min[b_axis] = self.b0;
        max[b_axis] = self.b1;
        min[k_axis] = self.k - 0.0001;
        max[k_axis] = self.k + 0.0001;
        Some(Aabb::new(min, max))
    }
}

/// Negates the normal of whatever it wraps
pub struct FlipNormals {
    obj: HittableObj,
}
impl FlipNormals {
    pub fn new(obj: HittableObj) -> Self {
        Self { obj }
    }
}
impl Hittable for FlipNormals {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.obj.try_hit(ray, t_min, t_max).map(|mut hr| {
            hr.normal = -hr.normal;
            hr
        })
    }

    fn try_bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.obj.try_bounding_box(time0, time1)
    }
}

/// Axis-aligned box built from six rectangles with outward normals
pub struct Cuboid {
    min: Point,
    max: Point,
    sides: HittableList,
}
impl Cuboid {
    pub fn new(p0: Point, p1: Point, material: Material) -> Self {
        let min = p0.inf(&p1);
        let max = p0.sup(&p1);
        let mut sides = HittableList::default();

        sides.add(Box::new(Rectangle::xy(
            min[0], max[0], min[1], max[1], max[2], material.clone(),
        )));
        sides.add(Box::new(FlipNormals::new(Box::new(Rectangle::xy(
            min[0], max[0], min[1], max[1], min[2], material.clone(),
        )))));
        sides.add(Box::new(Rectangle::xz(
            min[0], max[0], min[2], max[2], max[1], material.clone(),
        )));
        sides.add(Box::new(FlipNormals::new(Box::new(Rectangle::xz(
            min[0], max[0], min[2], max[2], min[1], material.clone(),
        )))));
        sides.add(Box::new(Rectangle::yz(
            min[1], max[1], min[2], max[2], max[0], material.clone(),
        )));
        sides.add(Box::new(FlipNormals::new(Box::new(Rectangle::yz(
            min[1], max[1], min[2], max[2], min[0], material,
        )))));

        Self { min, max, sides }
    }
}
impl Hittable for Cuboid {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.sides.try_hit(ray, t_min, t_max)
    }

    fn try_bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(Aabb::new(self.min, self.max))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::materials::Lambertian;

    fn grey() -> Material {
        Arc::new(Lambertian::new(Vec3::repeat(0.5)))
    }

    #[test]
    fn sphere_hit_lies_on_surface_and_takes_near_root() {
        let sphere = Sphere::new(Point::new(0.0, 0.0, -3.0), 1.0, grey());
        let ray = Ray::new(Point::zeros(), Vec3::new(0.1, 0.2, -1.0), 0.0);
        let hr = sphere.try_hit(&ray, 0.001, f64::INFINITY).expect("should hit");
        assert!(((hr.p - Point::new(0.0, 0.0, -3.0)).norm() - 1.0).abs() < 1e-9);

        // The far root is the only other candidate and it is further along
        let far = sphere
            .try_hit(&ray, hr.t + 1e-6, f64::INFINITY)
            .expect("should hit far side");
        assert!(far.t > hr.t);
        assert!(((far.p - Point::new(0.0, 0.0, -3.0)).norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_from_inside_uses_far_root() {
        let sphere = Sphere::new(Point::zeros(), 2.0, grey());
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let hr = sphere.try_hit(&ray, 0.001, f64::INFINITY).expect("should hit");
        assert!((hr.t - 2.0).abs() < 1e-9);
        assert!((hr.normal - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn sphere_uv_matches_reference_points() {
        let (u, v) = Sphere::get_uv(&Point::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-9 && (v - 0.5).abs() < 1e-9);
        let (u, v) = Sphere::get_uv(&Point::new(0.0, 0.0, 1.0));
        assert!((u - 0.25).abs() < 1e-9 && (v - 0.5).abs() < 1e-9);
        let (_, v) = Sphere::get_uv(&Point::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hollow_sphere_keeps_outer_surface_mapping() {
        let solid = Sphere::new(Point::new(0.0, 0.0, -3.0), 1.0, grey());
        let hollow = Sphere::new(Point::new(0.0, 0.0, -3.0), -1.0, grey());
        let ray = Ray::new(Point::new(0.3, 0.2, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);

        let outer = solid.try_hit(&ray, 0.001, f64::INFINITY).unwrap();
        let inner = hollow.try_hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert_eq!(outer.p, inner.p);
        assert_eq!(outer.normal, -inner.normal);
        assert!((outer.u - inner.u).abs() < 1e-12);
        assert!((outer.v - inner.v).abs() < 1e-12);
        // Facing the camera, the hit sits on the +z side of the sphere
        assert!(inner.u > 0.2 && inner.u < 0.5);
    }

    #[test]
    fn moving_sphere_follows_ray_time() {
        let sphere = MovingSphere::new(
            Point::new(0.0, 0.0, -5.0),
            Point::new(0.0, 10.0, -5.0),
            0.0,
            1.0,
            1.0,
            grey(),
        );
        let ray_early = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let ray_late = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(sphere.try_hit(&ray_early, 0.001, f64::INFINITY).is_some());
        assert!(sphere.try_hit(&ray_late, 0.001, f64::INFINITY).is_none());

        let bbox = sphere.try_bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point::new(-1.0, -1.0, -6.0));
        assert_eq!(bbox.max, Point::new(1.0, 11.0, -4.0));
    }

    #[test]
    fn rectangle_hits_inside_extent_only() {
        let rect = Rectangle::xz(-1.0, 1.0, -1.0, 1.0, 2.0, grey());
        let up = Ray::new(Point::new(0.5, 0.0, -0.5), Vec3::new(0.0, 1.0, 0.0), 0.0);
        let hr = rect.try_hit(&up, 0.001, f64::INFINITY).expect("should hit");
        assert!((hr.p[1] - 2.0).abs() < 1e-12);
        assert_eq!(hr.normal, Vec3::new(0.0, 1.0, 0.0));
        assert!((hr.u - 0.75).abs() < 1e-12 && (hr.v - 0.25).abs() < 1e-12);

        let outside = Ray::new(Point::new(1.5, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert!(rect.try_hit(&outside, 0.001, f64::INFINITY).is_none());
    }

    #[test]
    fn rectangle_ignores_parallel_rays() {
        let rect = Rectangle::xy(-1.0, 1.0, -1.0, 1.0, 0.0, grey());
        let in_plane = Ray::new(Point::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.0);
        let above = Ray::new(Point::new(-5.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), 0.0);
        assert!(rect.try_hit(&in_plane, 0.001, f64::INFINITY).is_none());
        assert!(rect.try_hit(&above, 0.001, f64::INFINITY).is_none());
    }

    #[test]
    fn cuboid_returns_nearest_face_with_outward_normal() {
        let cube = Cuboid::new(Point::zeros(), Point::new(2.0, 2.0, 2.0), grey());
        let ray = Ray::new(Point::new(1.0, 1.0, 10.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hr = cube.try_hit(&ray, 0.001, f64::INFINITY).expect("should hit");
        assert!((hr.t - 8.0).abs() < 1e-12);
        assert_eq!(hr.normal, Vec3::new(0.0, 0.0, 1.0));

        let back = Ray::new(Point::new(1.0, 1.0, -10.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let hr = cube.try_hit(&back, 0.001, f64::INFINITY).expect("should hit");
        assert!((hr.t - 10.0).abs() < 1e-12);
        assert_eq!(hr.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn list_returns_closest_regardless_of_order() {
        let mut list = HittableList::default();
        list.add(Box::new(Sphere::new(Point::new(0.0, 0.0, -10.0), 1.0, grey())));
        list.add(Box::new(Sphere::new(Point::new(0.0, 0.0, -4.0), 1.0, grey())));
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hr = list.try_hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hr.t - 3.0).abs() < 1e-9);

        let bbox = list.try_bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point::new(-1.0, -1.0, -11.0));
        assert_eq!(bbox.max, Point::new(1.0, 1.0, -3.0));
    }

    #[test]
    fn flip_normals_negates_only_the_normal() {
        let flipped = FlipNormals::new(Box::new(Sphere::new(Point::zeros(), 1.0, grey())));
        let ray = Ray::new(Point::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hr = flipped.try_hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hr.t - 4.0).abs() < 1e-9);
        assert!((hr.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }
}
