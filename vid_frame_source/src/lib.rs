#![allow(clippy::let_and_return)]
#![warn(clippy::redundant_pub_crate)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::unwrap_used)]

//! A crate for capturing frames from a camera or a video file as [`image::RgbImage`]s, using
//! gstreamer as a backend.
//!
//! To start capturing, create a [`CaptureBuilder`] for either a camera device or a URI, then
//! call [`CaptureBuilder::spawn`] to receive an iterator over frames.
//!
//! # Examples
//! Count the frames of a video file.
//!
//! ```no_run
//! use vid_frame_source::CaptureBuilder;
//!
//! fn main() -> Result<(), glib::Error> {
//!     //Must call this first.
//!     vid_frame_source::init_gstreamer()?;
//!
//!     let builder = CaptureBuilder::from_uri("file:///tmp/video.mp4");
//!     let frames = builder.spawn()?;
//!
//!     let mut total = 0;
//!     for frame in frames {
//!         let _frame: image::RgbImage = frame?;
//!         total += 1;
//!     }
//!     assert!(total > 0);
//!     Ok(())
//! }
//! ```
//!
//! # Error handling
//! Instead of defining its own error type this crate uses the libglib [`glib::Error`] type.
//! Errors can be told apart with the `matches` method of [`glib::Error`], for example
//! `e.matches(gstreamer::ResourceError::NotFound)`.
//!
//! # Installing
//! Follow the instructions written for gstreamer-rs [here.](https://github.com/sdroege/gstreamer-rs#installation)

#[macro_use]
extern crate log;

pub mod capture;

pub use capture::CaptureBuilder;
pub use capture::CaptureInput;
pub use capture::VideoCapture;

/// Initialize gstreamer. You must call this function before calling any other function in this crate.
pub fn init_gstreamer() -> Result<(), glib::Error> {
    gstreamer::init()
}
