use std::collections::HashMap;
use std::path::{Path, PathBuf};

use motion_centroid::{FrameSink, FrameView};

use crate::app::*;

/// Writes every image it is shown into a directory as `<label>_<index>.png`, where index
/// counts how many images with that label have been shown so far.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    counts: HashMap<String, u64>,
}

impl DirSink {
    pub fn new(dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(dir).map_err(|src| AppError::OutputDir {
            path: dir.to_path_buf(),
            src,
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            counts: HashMap::new(),
        })
    }

    fn next_path(&mut self, label: &str) -> PathBuf {
        let count = self.counts.entry(label.to_string()).or_insert(0);
        let ret = self.dir.join(format!("{label}_{count:06}.png"));
        *count += 1;
        ret
    }
}

impl FrameSink for DirSink {
    fn show(&mut self, label: &str, image: FrameView<'_>) {
        let path = self.next_path(label);

        let res = match image {
            FrameView::Color(img) => img.save(&path),
            FrameView::Gray(img) => img.save(&path),
        };

        //the sink is purely observational, so a failed write does not stop the run.
        match res {
            Ok(()) => trace!("Wrote {}", path.display()),
            Err(e) => warn!("Failed to write {}: {e}", path.display()),
        }
    }
}
