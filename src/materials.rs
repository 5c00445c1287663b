//! Implementation of materials

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    objects::HitRecord,
    textures::{SolidColor, TextureConfig},
    utils, Color, Material, Point, Ray, Texture,
};

/// Material
pub trait Scatterable {
    /// Scatter `ray_in` off the surface, `None` if the ray is absorbed
    fn try_scatter(&self, ray_in: &Ray, hit_record: &HitRecord) -> Option<ScatterResult>;

    /// Light given off at the surface point
    fn emitted(&self, _u: f64, _v: f64, _p: &Point) -> Color {
        Color::zeros()
    }
}

/// Scatter Result
#[derive(Debug)]
pub struct ScatterResult {
    /// Attenuation Color
    pub attenuation: Color,
    /// Resulting Scattered Ray
    pub scattered: Ray,
}

/// Config for materials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialConfig {
    Lambertian { texture: TextureConfig },
    Metal { albedo: utils::SerdeVector, fuzz: f64 },
    Dielectric { ir: f64 },
    DiffuseLight { emit: TextureConfig },
}

/// Generator from config
pub struct Generator;
impl Generator {
    pub fn from_config(config: &MaterialConfig) -> crate::Result<Material> {
        Ok(match config {
            MaterialConfig::Lambertian { texture } => {
                Arc::new(Lambertian::from_texture(texture.build()?))
            }
            MaterialConfig::Metal { albedo, fuzz } => Arc::new(Metal::new((*albedo).into(), *fuzz)),
            MaterialConfig::Dielectric { ir } => Arc::new(Dielectric::new(*ir)),
            MaterialConfig::DiffuseLight { emit } => Arc::new(DiffuseLight::new(emit.build()?)),
        })
    }
}

/// Lambertian Scatterer
pub struct Lambertian {
    albedo: Texture,
}
impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn from_texture(texture: Texture) -> Self {
        Self { albedo: texture }
    }
}
impl Scatterable for Lambertian {
    fn try_scatter(&self, ray_in: &Ray, hit_record: &HitRecord) -> Option<ScatterResult> {
        let mut scatter_direction = hit_record.normal + utils::random_in_unit_sphere();

        // Protect against if hit_record.normal and the random_in_unit_sphere as exact opposites
        if scatter_direction.norm() < 1e-8 {
            scatter_direction = hit_record.normal;
        }
        let scattered = Ray::new(hit_record.p, scatter_direction, ray_in.time);
        let attenuation = self.albedo.value(hit_record.u, hit_record.v, &hit_record.p);
        Some(ScatterResult {
            attenuation,
            scattered,
        })
    }
}

/// Metal Scatterer
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}
impl Metal {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        if !(0.0..=1.0).contains(&fuzz) {
            log::warn!("metal fuzz {fuzz} outside [0, 1], clamping");
        }
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}
impl Scatterable for Metal {
    fn try_scatter(&self, ray_in: &Ray, hit_record: &HitRecord) -> Option<ScatterResult> {
        let reflected = utils::reflect(&ray_in.dir.normalize(), &hit_record.normal);
        let scattered = Ray::new(
            hit_record.p,
            reflected + self.fuzz * utils::random_in_unit_sphere(),
            ray_in.time,
        );
        if scattered.dir.dot(&hit_record.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered,
            })
        } else {
            None
        }
    }
}

/// A Dielectric is a refractive material, such as glass
#[derive(Debug, Clone)]
pub struct Dielectric {
    ir: f64,
}
impl Dielectric {
    pub fn new(ir: f64) -> Self {
        Self { ir }
    }

    fn reflectance(cosine: f64, ref_idx: f64) -> f64 {
        // An index-matched interface does not reflect at all
        if ref_idx == 1.0 {
            return 0.0;
        }
        // Use Schlick's approximation for reflectance
        let r0 = ((1.0 - ref_idx) / (1.0 + ref_idx)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}
impl Scatterable for Dielectric {
    fn try_scatter(&self, ray_in: &Ray, hit_record: &HitRecord) -> Option<ScatterResult> {
        let attenuation = Color::new(1.0, 1.0, 1.0);
        let d_dot_n = ray_in.dir.dot(&hit_record.normal);
        let dir_len = ray_in.dir.norm();

        // Leaving the material when travelling along the outward normal
        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            (-hit_record.normal, self.ir, self.ir * d_dot_n / dir_len)
        } else {
            (hit_record.normal, 1.0 / self.ir, -d_dot_n / dir_len)
        };

        let direction = match utils::refract(&ray_in.dir, &outward_normal, ni_over_nt) {
            Some(refracted) if Self::reflectance(cosine, self.ir) <= utils::random::<f64>() => {
                refracted
            }
            _ => utils::reflect(&ray_in.dir, &hit_record.normal),
        };

        Some(ScatterResult {
            attenuation,
            scattered: Ray::new(hit_record.p, direction, ray_in.time),
        })
    }
}

/// Emits light and never scatters
pub struct DiffuseLight {
    emit: Texture,
}
impl DiffuseLight {
    pub fn new(emit: Texture) -> Self {
        Self { emit }
    }

    pub fn from_color(c: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(c)))
    }
}
impl Scatterable for DiffuseLight {
    fn try_scatter(&self, _ray_in: &Ray, _hit_record: &HitRecord) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, u: f64, v: f64, p: &Point) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Phase function of a participating medium
pub struct Isotropic {
    albedo: Texture,
}
impl Isotropic {
    pub fn new(albedo: Texture) -> Self {
        Self { albedo }
    }
}
impl Scatterable for Isotropic {
    fn try_scatter(&self, ray_in: &Ray, hit_record: &HitRecord) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.albedo.value(hit_record.u, hit_record.v, &hit_record.p),
            scattered: Ray::new(hit_record.p, utils::random_unit_vector(), ray_in.time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    fn record(material: &dyn Scatterable, normal: Vec3) -> HitRecord<'_> {
        HitRecord {
            p: Point::zeros(),
            normal,
            t: 1.0,
            material,
            u: 0.25,
            v: 0.75,
        }
    }

    #[test]
    fn lambertian_scatters_into_the_normal_hemisphere_ball() {
        utils::reseed(11);
        let mat = Lambertian::new(Color::new(0.1, 0.2, 0.3));
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let hr = record(&mat, normal);
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.25);
        for _ in 0..200 {
            let sr = mat.try_scatter(&ray, &hr).expect("lambertian always scatters");
            assert_eq!(sr.attenuation, Color::new(0.1, 0.2, 0.3));
            assert!((sr.scattered.dir - normal).norm() <= 1.0);
            assert_eq!(sr.scattered.time, 0.25);
        }
        assert_eq!(mat.emitted(0.0, 0.0, &Point::zeros()), Color::zeros());
    }

    #[test]
    fn smooth_metal_mirrors_and_absorbs_grazing_fuzz() {
        let mat = Metal::new(Color::new(0.8, 0.8, 0.8), 0.0);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let hr = record(&mat, normal);
        let ray = Ray::new(Point::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 0.0);
        let sr = mat.try_scatter(&ray, &hr).expect("mirror reflects");
        assert!((sr.scattered.dir - Vec3::new(1.0, 1.0, 0.0).normalize()).norm() < 1e-12);

        // Coming from below the surface the reflection points into it
        let below = Ray::new(Point::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0), 0.0);
        assert!(mat.try_scatter(&below, &hr).is_none());
    }

    #[test]
    fn metal_fuzz_is_clamped() {
        let mat = Metal::new(Color::repeat(1.0), 4.0);
        assert_eq!(mat.fuzz, 1.0);
    }

    #[test]
    fn index_matched_dielectric_keeps_direction() {
        utils::reseed(5);
        let mat = Dielectric::new(1.0);
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let hr = record(&mat, normal);
        for dir in [
            Vec3::new(0.3, 0.1, -1.0),
            Vec3::new(-0.9, 0.2, -0.1),
            Vec3::new(0.2, 0.2, 1.0),
        ] {
            for _ in 0..50 {
                let sr = mat
                    .try_scatter(&Ray::new(Point::zeros(), dir, 0.0), &hr)
                    .expect("glass always scatters");
                assert_eq!(sr.attenuation, Color::new(1.0, 1.0, 1.0));
                assert!((sr.scattered.dir.normalize() - dir.normalize()).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn dielectric_totally_reflects_at_grazing_exit() {
        utils::reseed(9);
        let mat = Dielectric::new(1.5);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let hr = record(&mat, normal);
        // Travelling along the outward normal means we are inside the glass
        let ray = Ray::new(Point::zeros(), Vec3::new(1.0, 0.1, 0.0), 0.0);
        let sr = mat.try_scatter(&ray, &hr).unwrap();
        assert!((sr.scattered.dir - Vec3::new(1.0, -0.1, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn dielectric_splits_grazing_entry_between_reflection_and_refraction() {
        utils::reseed(21);
        let mat = Dielectric::new(1.5);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let hr = record(&mat, normal);
        // Entering from above, close to the surface
        let ray = Ray::new(Point::new(-1.0, 0.05, 0.0), Vec3::new(1.0, -0.05, 0.0), 0.0);
        let mirrored = Vec3::new(1.0, 0.05, 0.0);

        let trials = 1000;
        let mut reflected = 0;
        for _ in 0..trials {
            let dir = mat.try_scatter(&ray, &hr).unwrap().scattered.dir;
            if dir.dot(&normal) > 0.0 {
                assert!((dir - mirrored).norm() < 1e-12);
                reflected += 1;
            } else {
                // Bent toward the normal on the way into the glass
                let unit = dir.normalize();
                assert!(unit[0] > 0.0 && unit[0] < 1.0 / 1.5 + 1e-9);
            }
        }
        // Schlick gives roughly 0.78 at this angle
        let fraction = reflected as f64 / trials as f64;
        assert!(fraction > 0.65 && fraction < 0.9, "reflected {fraction}");
    }

    #[test]
    fn diffuse_light_only_emits() {
        let mat = DiffuseLight::from_color(Color::new(4.0, 4.0, 4.0));
        let hr = record(&mat, Vec3::new(0.0, 1.0, 0.0));
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert!(mat.try_scatter(&ray, &hr).is_none());
        assert_eq!(mat.emitted(0.0, 0.0, &Point::zeros()), Color::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn isotropic_scatters_on_the_unit_sphere() {
        utils::reseed(1);
        let mat = Isotropic::new(Arc::new(SolidColor::new(Color::new(0.5, 0.5, 0.5))));
        let hr = record(&mat, Vec3::new(1.0, 0.0, 0.0));
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0), 0.0);
        for _ in 0..100 {
            let sr = mat.try_scatter(&ray, &hr).unwrap();
            assert!((sr.scattered.dir.norm() - 1.0).abs() < 1e-9);
            assert_eq!(sr.attenuation, Color::new(0.5, 0.5, 0.5));
        }
    }

    #[test]
    fn config_builds_every_material() {
        let yaml = r#"
- type: lambertian
  texture: { type: solid, color: [0.1, 0.2, 0.3] }
- type: metal
  albedo: [0.7, 0.6, 0.5]
  fuzz: 0.1
- type: dielectric
  ir: 1.5
- type: diffuse_light
  emit: { type: solid, color: [4.0, 4.0, 4.0] }
"#;
        let configs: Vec<MaterialConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(configs.len(), 4);
        for config in &configs {
            assert!(Generator::from_config(config).is_ok());
        }
    }
}
