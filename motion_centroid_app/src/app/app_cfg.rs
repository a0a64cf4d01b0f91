use std::path::PathBuf;

use motion_centroid::PipelineOptions;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Text,
    Json,
}

// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceCfg {
    Images(PathBuf),

    #[cfg_attr(not(feature = "gstreamer_backend"), allow(dead_code))]
    Video(String),

    #[cfg_attr(not(feature = "gstreamer_backend"), allow(dead_code))]
    Camera(Option<String>),
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub format: OutputFormat,
    pub images_dir: Option<PathBuf>,

    pub verbosity: ReportVerbosity,
}

#[derive(Debug, Clone)]
pub struct StopCfg {
    pub max_frames: Option<u64>,
    pub keypress: bool,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub source_cfg: SourceCfg,
    pub output_cfg: OutputCfg,
    pub stop_cfg: StopCfg,

    pub pipeline: PipelineOptions,
}
