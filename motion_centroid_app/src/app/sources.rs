use std::path::{Path, PathBuf};

use image::RgbImage;
use motion_centroid::{Error, FrameSource};
use walkdir::WalkDir;

use crate::app::*;

const IMAGE_EXTS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Reads every image in a directory as a frame, in file name order.
#[derive(Debug)]
pub struct ImageDirSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageDirSource {
    pub fn new(dir: &Path) -> Result<Self, AppError> {
        if !dir.is_dir() {
            return Err(AppError::ImageDirNotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();

        if paths.is_empty() {
            return Err(AppError::NoImagesFound(dir.to_path_buf()));
        }

        paths.sort();
        debug!("Found {} images in {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into_iter(),
        })
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, Error> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };

        trace!("Loading frame {}", path.display());
        match image::open(&path) {
            Ok(img) => Ok(Some(img.into_rgb8())),
            Err(src) => Err(Error::FrameSource(Box::new(AppError::ImageRead {
                path,
                src,
            }))),
        }
    }
}

#[cfg(feature = "gstreamer_backend")]
pub use capture::CaptureSource;

#[cfg(feature = "gstreamer_backend")]
mod capture {
    use image::RgbImage;
    use motion_centroid::{Error, FrameSource};
    use vid_frame_source::{CaptureBuilder, VideoCapture};

    use crate::app::*;

    /// Frames from a camera or video file, decoded by gstreamer.
    pub struct CaptureSource {
        frames: VideoCapture,
    }

    impl CaptureSource {
        pub fn open(cfg: &SourceCfg) -> Result<Self, AppError> {
            vid_frame_source::init_gstreamer().map_err(|e| AppError::CaptureStart(e.to_string()))?;

            let builder = match cfg {
                SourceCfg::Video(uri) => CaptureBuilder::from_uri(uri),
                SourceCfg::Camera(device) => CaptureBuilder::camera(device.as_deref()),
                SourceCfg::Images(dir) => {
                    return Err(AppError::CaptureStart(format!(
                        "{} is an image directory",
                        dir.display()
                    )))
                }
            };

            let frames = builder
                .spawn()
                .map_err(|e| AppError::CaptureStart(e.to_string()))?;

            Ok(Self { frames })
        }
    }

    impl FrameSource for CaptureSource {
        fn next_frame(&mut self) -> Result<Option<RgbImage>, Error> {
            self.frames
                .next()
                .transpose()
                .map_err(|e| Error::FrameSource(Box::new(e)))
        }
    }
}
