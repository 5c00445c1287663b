//! Scenes: the built-in demos and YAML scene descriptions

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    bvh::Bvh,
    cameras::{Camera, CameraConfig},
    materials::{Dielectric, DiffuseLight, Generator, Lambertian, MaterialConfig, Metal},
    mediums::ConstantMedium,
    objects::{Cuboid, FlipNormals, HittableList, HittableObj, MovingSphere, Plane, Rectangle, Sphere},
    renderer::Background,
    textures::{Checker, ImageTexture, Noise, TextureConfig},
    transrot::{RotateY, Translate},
    utils::{self, SerdeVector},
    Color, Error, Material, Point, Vec3,
};

/// Everything the renderer needs: a finished world, where to look from, and
/// what escaping rays see
pub struct Scene {
    pub world: HittableObj,
    pub camera: Camera,
    pub background: Background,
}

/// Scenes that ship with the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinScene {
    /// Field of small random spheres around three large ones
    #[default]
    Random,
    /// Two diffuse spheres and a metal one on a large ground sphere
    ThreeSpheres,
    Cornell,
    /// Cornell box with the two blocks replaced by smoke and fog
    CornellSmoke,
    /// Marble-textured spheres
    Perlin,
}
impl FromStr for BuiltinScene {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "three-spheres" => Ok(Self::ThreeSpheres),
            "cornell" => Ok(Self::Cornell),
            "cornell-smoke" => Ok(Self::CornellSmoke),
            "perlin" => Ok(Self::Perlin),
            other => Err(Error::UnknownScene(other.to_string())),
        }
    }
}
impl BuiltinScene {
    /// Build the scene
    ///
    /// `texture` is only read by the random scene, for its earth sphere.
    pub fn build(self, aspect_ratio: f64, texture: &Path) -> crate::Result<Scene> {
        log::debug!("building {self:?} scene");
        match self {
            Self::Random => random_scene(aspect_ratio, ImageTexture::open(texture)?),
            Self::ThreeSpheres => three_spheres(aspect_ratio),
            Self::Cornell => cornell_box(aspect_ratio),
            Self::CornellSmoke => cornell_smoke(aspect_ratio),
            Self::Perlin => perlin_spheres(aspect_ratio),
        }
    }
}

/// Build a built-in scene by name
pub fn builtin(name: &str, aspect_ratio: f64, texture: &Path) -> crate::Result<Scene> {
    name.parse::<BuiltinScene>()?.build(aspect_ratio, texture)
}

fn lambertian(c: Color) -> Material {
    Arc::new(Lambertian::new(c))
}

/// The random sphere field, with `earth` wrapped around one of the large spheres
pub fn random_scene(aspect_ratio: f64, earth: ImageTexture) -> crate::Result<Scene> {
    let colors = [
        Color::new(0.37, 0.62, 0.58),
        Color::new(0.24, 0.21, 0.22),
        Color::new(0.45, 0.21, 0.20),
        Color::new(0.71, 0.38, 0.22),
        Color::new(0.69, 0.63, 0.64),
        Color::new(0.89, 0.85, 0.82),
    ];

    let mut world = HittableList::default();
    world.add(Box::new(Sphere::new(
        Point::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::from_texture(Arc::new(Checker::from_solid_colors(
            colors[1], colors[2],
        )))),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = utils::random();
            let center = Point::new(
                a as f64 + 0.9 * utils::random::<f64>(),
                0.2,
                b as f64 + 0.9 * utils::random::<f64>(),
            );
            let color = colors[utils::random_range(0..5usize)];

            if (center - Point::new(4.0, 0.2, 0.0)).norm() > 0.9 {
                let material: Material = if choose_mat < 0.3 {
                    // diffuse
                    lambertian(color)
                } else if choose_mat < 0.6 {
                    // metal
                    let albedo = Color::from_fn(|_, _| 0.5 * (1.0 + utils::random::<f64>()));
                    Arc::new(Metal::new(albedo, 0.5 * utils::random::<f64>()))
                } else {
                    // glass
                    Arc::new(Dielectric::new(1.5))
                };
                world.add(Box::new(Sphere::new(center, 0.2, material)));
            }
        }
    }

    world.add(Box::new(Sphere::new(
        Point::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Box::new(Sphere::new(
        Point::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::from_texture(Arc::new(earth))),
    )));
    world.add(Box::new(Sphere::new(
        Point::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(colors[4], 0.0)),
    )));

    let camera = Camera::new(
        Point::new(13.0, 2.0, 3.0),
        Point::zeros(),
        Vec3::new(0.0, 1.0, 0.0),
        20.0,
        aspect_ratio,
        0.1,
        10.0,
        0.0,
        1.0,
    );
    Ok(Scene {
        world: Box::new(Bvh::new(world, 0.0, 1.0)?),
        camera,
        background: Background::Sky,
    })
}

/// Small regression scene
pub fn three_spheres(aspect_ratio: f64) -> crate::Result<Scene> {
    let mut world = HittableList::default();
    world.add(Box::new(Sphere::new(
        Point::new(0.0, -100.5, -1.0),
        100.0,
        lambertian(Color::new(0.8, 0.8, 0.0)),
    )));
    world.add(Box::new(Sphere::new(
        Point::new(0.0, 0.0, -1.0),
        0.5,
        lambertian(Color::new(0.1, 0.2, 0.5)),
    )));
    world.add(Box::new(Sphere::new(
        Point::new(-1.0, 0.0, -1.0),
        0.5,
        lambertian(Color::new(0.7, 0.3, 0.3)),
    )));
    world.add(Box::new(Sphere::new(
        Point::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.3)),
    )));

    let camera = Camera::new(
        Point::zeros(),
        Point::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 1.0, 0.0),
        90.0,
        aspect_ratio,
        0.0,
        1.0,
        0.0,
        1.0,
    );
    Ok(Scene {
        world: Box::new(Bvh::new(world, 0.0, 1.0)?),
        camera,
        background: Background::Sky,
    })
}

/// Five walls of the Cornell box with the light set into the ceiling
fn cornell_walls(light: Material, light_extent: [f64; 4]) -> HittableList {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::repeat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));
    let [x0, x1, z0, z1] = light_extent;

    let mut walls = HittableList::default();
    walls.add(Box::new(FlipNormals::new(Box::new(Rectangle::yz(
        0.0, 555.0, 0.0, 555.0, 555.0, green,
    )))));
    walls.add(Box::new(Rectangle::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    walls.add(Box::new(FlipNormals::new(Box::new(Rectangle::xz(
        x0, x1, z0, z1, 554.0, light,
    )))));
    walls.add(Box::new(FlipNormals::new(Box::new(Rectangle::xz(
        0.0,
        555.0,
        0.0,
        555.0,
        555.0,
        white.clone(),
    )))));
    walls.add(Box::new(Rectangle::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    walls.add(Box::new(FlipNormals::new(Box::new(Rectangle::xy(
        0.0, 555.0, 0.0, 555.0, 555.0, white,
    )))));
    walls
}

/// The two blocks standing in the box, rotated and moved into place
fn cornell_blocks() -> [HittableObj; 2] {
    let white = lambertian(Color::repeat(0.73));
    let place = |size: Point, angle: f64, offset: Vec3| -> HittableObj {
        Box::new(Translate::new(
            Box::new(RotateY::new(
                Box::new(Cuboid::new(Point::zeros(), size, white.clone())),
                angle,
            )),
            offset,
        ))
    };
    [
        place(Point::new(165.0, 165.0, 165.0), -18.0, Vec3::new(130.0, 0.0, 65.0)),
        place(Point::new(165.0, 330.0, 165.0), 15.0, Vec3::new(265.0, 0.0, 295.0)),
    ]
}

fn cornell_camera(aspect_ratio: f64) -> Camera {
    Camera::new(
        Point::new(278.0, 278.0, -800.0),
        Point::new(278.0, 278.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        40.0,
        aspect_ratio,
        0.0,
        10.0,
        0.0,
        1.0,
    )
}

/// Cornell box, lit only by its ceiling light
pub fn cornell_box(aspect_ratio: f64) -> crate::Result<Scene> {
    let light = Arc::new(DiffuseLight::from_color(Color::repeat(15.0)));
    let mut world = cornell_walls(light, [213.0, 343.0, 227.0, 332.0]);
    for block in cornell_blocks() {
        world.add(block);
    }
    Ok(Scene {
        world: Box::new(Bvh::new(world, 0.0, 1.0)?),
        camera: cornell_camera(aspect_ratio),
        background: Background::Black,
    })
}

/// Cornell box with a dark smoke block and a light fog block
pub fn cornell_smoke(aspect_ratio: f64) -> crate::Result<Scene> {
    let light = Arc::new(DiffuseLight::from_color(Color::repeat(7.0)));
    let mut world = cornell_walls(light, [113.0, 443.0, 127.0, 432.0]);
    let [short, tall] = cornell_blocks();
    world.add(Box::new(ConstantMedium::from_color(short, 0.01, Color::repeat(1.0))));
    world.add(Box::new(ConstantMedium::from_color(tall, 0.01, Color::zeros())));
    Ok(Scene {
        world: Box::new(Bvh::new(world, 0.0, 1.0)?),
        camera: cornell_camera(aspect_ratio),
        background: Background::Black,
    })
}

/// Two marble spheres under the sky
pub fn perlin_spheres(aspect_ratio: f64) -> crate::Result<Scene> {
    let marble: Material = Arc::new(Lambertian::from_texture(Arc::new(Noise::marble(4.0))));
    let mut world = HittableList::default();
    world.add(Box::new(Sphere::new(
        Point::new(0.0, -1000.0, 0.0),
        1000.0,
        marble.clone(),
    )));
    world.add(Box::new(Sphere::new(Point::new(0.0, 2.0, 0.0), 2.0, marble)));

    let camera = Camera::new(
        Point::new(13.0, 2.0, 3.0),
        Point::zeros(),
        Vec3::new(0.0, 1.0, 0.0),
        20.0,
        aspect_ratio,
        0.0,
        10.0,
        0.0,
        1.0,
    );
    Ok(Scene {
        world: Box::new(Bvh::new(world, 0.0, 1.0)?),
        camera,
        background: Background::Sky,
    })
}

/// Geometry of one scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeConfig {
    Sphere {
        center: SerdeVector,
        radius: f64,
        material: MaterialConfig,
    },
    MovingSphere {
        center0: SerdeVector,
        center1: SerdeVector,
        time0: f64,
        time1: f64,
        radius: f64,
        material: MaterialConfig,
    },
    Rectangle {
        plane: Plane,
        a0: f64,
        a1: f64,
        b0: f64,
        b1: f64,
        k: f64,
        material: MaterialConfig,
    },
    Cuboid {
        min: SerdeVector,
        max: SerdeVector,
        material: MaterialConfig,
    },
    Medium {
        boundary: Box<ObjectConfig>,
        density: f64,
        texture: TextureConfig,
    },
}

/// Object Config
///
/// Modifiers apply in order: flip the normals, rotate about y, then translate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    #[serde(flatten)]
    pub shape: ShapeConfig,
    #[serde(default)]
    pub flip_normals: bool,
    #[serde(default)]
    pub rotate_y: Option<f64>,
    #[serde(default)]
    pub translate: Option<SerdeVector>,
}
impl ObjectConfig {
    pub fn build(&self) -> crate::Result<HittableObj> {
        let mut obj: HittableObj = match &self.shape {
            ShapeConfig::Sphere {
                center,
                radius,
                material,
            } => Box::new(Sphere::new(
                (*center).into(),
                *radius,
                Generator::from_config(material)?,
            )),
            ShapeConfig::MovingSphere {
                center0,
                center1,
                time0,
                time1,
                radius,
                material,
            } => Box::new(MovingSphere::new(
                (*center0).into(),
                (*center1).into(),
                *time0,
                *time1,
                *radius,
                Generator::from_config(material)?,
            )),
            ShapeConfig::Rectangle {
                plane,
                a0,
                a1,
                b0,
                b1,
                k,
                material,
            } => Box::new(Rectangle::new(
                *plane,
                *a0,
                *a1,
                *b0,
                *b1,
                *k,
                Generator::from_config(material)?,
            )),
            ShapeConfig::Cuboid { min, max, material } => Box::new(Cuboid::new(
                (*min).into(),
                (*max).into(),
                Generator::from_config(material)?,
            )),
            ShapeConfig::Medium {
                boundary,
                density,
                texture,
            } => Box::new(ConstantMedium::new(
                boundary.build()?,
                *density,
                texture.build()?,
            )),
        };

        if self.flip_normals {
            obj = Box::new(FlipNormals::new(obj));
        }
        if let Some(angle) = self.rotate_y {
            obj = Box::new(RotateY::new(obj, angle));
        }
        if let Some(offset) = self.translate {
            obj = Box::new(Translate::new(obj, offset.into()));
        }
        Ok(obj)
    }
}

fn default_background() -> Background {
    Background::Sky
}

/// Scene Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    #[serde(default = "default_background")]
    pub background: Background,
    pub objects: Vec<ObjectConfig>,
}
impl SceneConfig {
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        log::debug!("loading scene description {path:?}");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Build every object, then wrap them in a bvh over the shutter interval
    ///
    /// Any object that fails to build, such as an image texture that cannot be
    /// read, fails the whole scene.
    pub fn build(&self, aspect_ratio: f64) -> crate::Result<Scene> {
        let mut list = HittableList::default();
        for object in &self.objects {
            list.add(object.build()?);
        }
        let world = Bvh::new(list, self.camera.time0, self.camera.time1)?;
        Ok(Scene {
            world: Box::new(world),
            camera: self.camera.build(aspect_ratio),
            background: self.background,
        })
    }
}
