//! Errors

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building a scene or rendering it
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot build a bounding volume hierarchy over an empty scene")]
    EmptyScene,

    #[error("primitive {index} has no bounding box and cannot be placed in a bvh")]
    MissingBoundingBox { index: usize },

    #[error("failed to load texture {path:?}: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image buffer holds {actual} bytes, expected {expected} for {width}x{height}x{bytes_per_pixel}")]
    InvalidImage {
        width: usize,
        height: usize,
        bytes_per_pixel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image of {width}x{height}x{bytes_per_pixel} does not fit in memory")]
    ImageTooLarge {
        width: usize,
        height: usize,
        bytes_per_pixel: usize,
    },

    #[error("invalid scene description: {0}")]
    SceneConfig(#[from] serde_yaml::Error),

    #[error("unknown scene {0:?}")]
    UnknownScene(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write image: {0}")]
    ImageWrite(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
