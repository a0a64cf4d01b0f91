use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //frame sources
    #[error("Image directory not found: {}", .0.display())]
    ImageDirNotFound(PathBuf),

    #[error("No images found in {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("Failed to read image {}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        src: image::ImageError,
    },

    #[error("Failed to start capture: {0}")]
    #[allow(dead_code)] // variant is unused when gstreamer is not compiled
    CaptureStart(String),

    /////////////////////////////////
    //outputs
    #[error("Failed to create output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        src: std::io::Error,
    },

    /////////////////////////////////
    //pipeline
    #[error("Motion detection failed: {0}")]
    Pipeline(#[from] motion_centroid::Error),
}
