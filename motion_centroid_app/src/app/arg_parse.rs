use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use motion_centroid::*;

use crate::app::*;

// frame sources
const IMAGES_DIR: &str = "Directory of image frames";
const VIDEO_URI: &str = "Video URI";
const CAMERA: &str = "Camera device";

// pipeline configuration
const WINDOW_SIZE: &str = "Similarity window size";

// stopping
const MAX_FRAMES: &str = "Maximum frames";
const NO_KEYPRESS_STOP: &str = "Ignore stdin";

//output settings
const OUTPUT_FORMAT: &str = "Format";
const OUTPUT_IMAGES_DIR: &str = "Output directory";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 10] = [
    //
    // frame sources
    IMAGES_DIR,
    VIDEO_URI,
    CAMERA,
    //
    //pipeline
    WINDOW_SIZE,
    //
    //stopping
    MAX_FRAMES,
    NO_KEYPRESS_STOP,
    //
    //outputs
    OUTPUT_FORMAT,
    OUTPUT_IMAGES_DIR,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

pub(super) fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Motion centroid")
        .version(clap::crate_version!())
        .about("Find the centre of motion between consecutive video frames");

    clap_app = clap_app.arg(
        clap::Arg::new(IMAGES_DIR)
            .long("images")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Read frames from the still images in this directory, in file name order")
            .display_order(get_ordering(IMAGES_DIR)),
    );

    #[cfg(feature = "gstreamer_backend")]
    {
        clap_app = clap_app.arg(
            clap::Arg::new(VIDEO_URI)
                .long("video")
                .value_parser(value_parser!(String))
                .num_args(1)
                .help("Read frames from a video file or URI. Plain file paths are accepted too")
                .display_order(get_ordering(VIDEO_URI)),
        );

        clap_app = clap_app.arg(
            clap::Arg::new(CAMERA)
                .long("camera")
                .value_parser(value_parser!(String))
                .num_args(0..=1)
                .help("Read frames from a camera. Give a device path such as /dev/video0, or nothing for the default camera")
                .display_order(get_ordering(CAMERA)),
        );
    }

    clap_app = clap_app.group(
        clap::ArgGroup::new("source")
            .args(source_args())
            .required(true)
            .multiple(false),
    );

    let default_window = DEFAULT_SSIM_WINDOW_SIZE.to_string();
    clap_app = clap_app.arg(
        clap::Arg::new(WINDOW_SIZE)
            .long("window-size")
            .value_parser(value_parser!(u32).range(1..=i64::from(MAX_SSIM_WINDOW_SIZE)))
            .default_value(default_window)
            .num_args(1)
            .help("Edge length of the square window used to compare frames. Must be odd")
            .display_order(get_ordering(WINDOW_SIZE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_FRAMES)
            .long("max-frames")
            .value_parser(value_parser!(u64).range(1..))
            .num_args(1)
            .help("Stop after reading this many frames")
            .display_order(get_ordering(MAX_FRAMES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(NO_KEYPRESS_STOP)
            .long("no-stdin")
            .help("Do not watch stdin. By default, typing q then enter stops the run")
            .action(SetTrue)
            .display_order(get_ordering(NO_KEYPRESS_STOP)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("format")
            .help("Whether to print each motion centroid as text, or as JSON lines")
            .value_parser(value_parser!(OutputFormat))
            .default_value("text")
            .num_args(1)
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_IMAGES_DIR)
            .long("output-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Write the difference, threshold and annotated images of every frame pair to this directory")
            .display_order(get_ordering(OUTPUT_IMAGES_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .short('q')
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .short('v')
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

fn source_args() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut ret = vec![IMAGES_DIR];

    #[cfg(feature = "gstreamer_backend")]
    ret.extend([VIDEO_URI, CAMERA]);

    ret
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir().expect("failed to extract cwd");

    let args = build_app().get_matches();
    cfg_from_matches(&args, &cwd)
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> AppCfg {
    let source_cfg = source_cfg_from_matches(args, cwd);

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let output_cfg = OutputCfg {
        format: *args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .expect("This argument has a default value"),
        images_dir: args
            .get_one::<PathBuf>(OUTPUT_IMAGES_DIR)
            .map(|p| absolutify_path(cwd, p)),
        verbosity,
    };

    let stop_cfg = StopCfg {
        max_frames: args.get_one::<u64>(MAX_FRAMES).copied(),
        keypress: !args.get_flag(NO_KEYPRESS_STOP),
    };

    let pipeline = PipelineOptions {
        window_size: *args
            .get_one::<u32>(WINDOW_SIZE)
            .expect("This argument has a default value"),
        ..PipelineOptions::default()
    };

    let ret = AppCfg {
        source_cfg,
        output_cfg,
        stop_cfg,
        pipeline,
    };

    ret
}

fn source_cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> SourceCfg {
    #[cfg(feature = "gstreamer_backend")]
    {
        if let Some(uri) = args.get_one::<String>(VIDEO_URI) {
            return SourceCfg::Video(uri_from_arg(cwd, uri));
        }

        if args.contains_id(CAMERA) {
            return SourceCfg::Camera(args.get_one::<String>(CAMERA).cloned());
        }
    }

    let dir = args
        .get_one::<PathBuf>(IMAGES_DIR)
        .expect("a frame source is required");
    SourceCfg::Images(absolutify_path(cwd, dir))
}

// gstreamer wants URIs, but plain paths are friendlier on the command line.
#[cfg(feature = "gstreamer_backend")]
fn uri_from_arg(cwd: &Path, arg: &str) -> String {
    if arg.contains("://") {
        arg.to_string()
    } else {
        format!("file://{}", absolutify_path(cwd, Path::new(arg)).display())
    }
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    let path = if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };

    //now try canonicalizing the path. If that fails then silently ignore the failure and carry on
    let p = path.canonicalize().unwrap_or(path);

    p
}
