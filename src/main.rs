//! Render a scene to an image file
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use path_tracer::{
    renderer::{self, Integrator, RenderSettings, RowOrder},
    scenes::{BuiltinScene, SceneConfig},
    utils,
};

#[derive(Debug, Default, Clone, Copy, ValueEnum)]
enum Rows {
    #[default]
    TopDown,
    BottomUp,
}
impl From<Rows> for RowOrder {
    fn from(rows: Rows) -> Self {
        match rows {
            Rows::TopDown => RowOrder::TopDown,
            Rows::BottomUp => RowOrder::BottomUp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Monte Carlo path tracer")]
struct Args {
    /// Output image, format picked from the extension
    #[arg(long = "fileName", default_value = "image.jpg")]
    file_name: PathBuf,

    /// Samples per pixel
    #[arg(long = "nSamples", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    n_samples: u32,

    #[arg(long = "xResolution", default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    x_resolution: u32,

    #[arg(long = "yResolution", default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
    y_resolution: u32,

    /// Built-in scene: random, three-spheres, cornell, cornell-smoke or perlin
    #[arg(long, default_value = "random")]
    scene: BuiltinScene,

    /// YAML scene description, used instead of --scene
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image wrapped around the earth sphere of the random scene
    #[arg(long, default_value = "earth.jpg")]
    texture: PathBuf,

    /// Seed scene construction and every pixel for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads, defaults to the available parallelism
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long = "rowOrder", value_enum, default_value_t)]
    row_order: Rows,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Scene layout and BVH splits draw from this thread's generator too
    if let Some(seed) = args.seed {
        utils::reseed(seed);
    }
    let aspect_ratio = args.x_resolution as f64 / args.y_resolution as f64;
    let scene = match &args.config {
        Some(path) => SceneConfig::load(path)
            .and_then(|config| config.build(aspect_ratio))
            .with_context(|| format!("failed to build scene from {path:?}"))?,
        None => args
            .scene
            .build(aspect_ratio, &args.texture)
            .with_context(|| format!("failed to build {:?} scene", args.scene))?,
    };

    let mut settings = RenderSettings {
        width: args.x_resolution as usize,
        height: args.y_resolution as usize,
        samples_per_pixel: args.n_samples as usize,
        seed: args.seed,
        row_order: args.row_order.into(),
        ..Default::default()
    };
    if let Some(threads) = args.threads {
        settings.workers = threads;
    }
    log::info!("creating image {:?}", args.file_name);

    let bar = ProgressBar::new(settings.height as u64);
    bar.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} rows")
            .context("invalid progress bar template")?,
    );

    let integrator = Integrator::new(scene.background);
    let image = renderer::render(&*scene.world, &scene.camera, &integrator, &settings, &bar)?;
    image
        .save(&args.file_name)
        .with_context(|| format!("failed to write {:?}", args.file_name))?;

    Ok(())
}
