#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
//#![warn(clippy::expect_used)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

//! # Overview
//! `motion_centroid` finds where things are moving in a video stream. Each frame is compared
//! with the one before it, the areas that changed are boxed, and a single "centre of motion"
//! is computed for the pair.
//!
//! # How it works
//! For every pair of consecutive frames:
//! * Both frames are converted to grayscale.
//! * The per-pixel [structural similarity](https://en.wikipedia.org/wiki/Structural_similarity)
//!   of the two frames is computed over a small square window.
//! * The similarity map is rescaled to 8 bits and split into changed/unchanged pixels with a
//!   single threshold chosen by Otsu's method.
//! * The outermost connected regions of changed pixels are boxed.
//! * The boxes are combined into one point. X is weighted by the square of each box's width,
//!   and Y by the square of its height, so one large moving object outweighs many small
//!   specks of noise.
//!
//! # High Level API
//! Use a [`FramePairController`] to feed frames one at a time, or [`run`] to drive a whole
//! stream from a [`FrameSource`] to a [`FrameSink`].
//! ```rust
//! use image::{Rgb, RgbImage};
//! use motion_centroid::{FramePairController, Motion, PipelineOptions};
//!
//! let background = RgbImage::from_pixel(64, 48, Rgb([30, 30, 30]));
//! let mut moved = background.clone();
//! for y in 20..30 {
//!     for x in 40..50 {
//!         moved.put_pixel(x, y, Rgb([220, 220, 220]));
//!     }
//! }
//!
//! let mut controller = FramePairController::new(PipelineOptions::default()).unwrap();
//!
//! // The first frame only primes the controller.
//! assert!(controller.push_frame(background).unwrap().is_none());
//!
//! let report = controller.push_frame(moved).unwrap().unwrap();
//! assert!(report.score < 1.0);
//! assert!(matches!(report.motion, Motion::Detected(_)));
//! ```
//!
//! # Limitations
//! Every frame pair is handled on its own. There is no tracking of objects between pairs,
//! no history of motion, and no filtering of small regions beyond what the threshold does.
//! A global change in lighting will therefore be reported as motion everywhere.

#[macro_use]
extern crate log;

mod definitions;
mod motion_detect;

pub use motion_detect::{
    annotate::annotate_frame,
    centroid::{motion_centroid, Motion, MotionCentroid},
    change_mask::{rescale_similarity, ChangeMask},
    frame_pair::{process_frame_pair, FramePairController, FramePairReport},
    grayscale::to_grayscale,
    options::{AnnotationStyle, PipelineOptions},
    regions::{extract_regions, Region},
    run_loop::{
        run, FrameSink, FrameSource, FrameView, NeverStop, NullSink, RunSummary, StopReason,
        StopSignal,
    },
    structural_diff::{structural_difference, SimilarityMap, StructuralDifference},
    Error, InvalidInput,
};

pub use definitions::{
    DEFAULT_CENTROID_COLOUR, DEFAULT_CENTROID_RADIUS, DEFAULT_CENTROID_THICKNESS,
    DEFAULT_REGION_COLOUR, DEFAULT_REGION_THICKNESS, DEFAULT_SSIM_WINDOW_SIZE, LABEL_ANNOTATED,
    LABEL_DIFFERENCE, LABEL_THRESH, MAX_SSIM_WINDOW_SIZE,
};

#[cfg(any(feature = "test-util", test))]
pub use motion_detect::test_util;

pub type Result<T> = std::result::Result<T, crate::Error>;
