use std::iter::FusedIterator;

use gstreamer::{prelude::*, CoreError, MessageView, StateChangeSuccess};
use gstreamer_video::VideoFrameExt;
use image::RgbImage;

/// Where frames are captured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureInput {
    /// Any URI that gstreamer's `uridecodebin` understands (`file://`, `rtsp://`, ...)
    Uri(String),

    /// A local camera. With no device path, gstreamer picks the default camera.
    Camera(Option<String>),
}

#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    input: CaptureInput,
    fps: Option<(u64, u64)>,
}

impl CaptureBuilder {
    /// Create a [`CaptureBuilder`] reading from the given URI.
    #[must_use]
    pub fn from_uri(uri: impl AsRef<str>) -> Self {
        Self {
            input: CaptureInput::Uri(uri.as_ref().to_string()),
            fps: None,
        }
    }

    /// Create a [`CaptureBuilder`] reading from a camera, e.g. `/dev/video0`.
    #[must_use]
    pub fn camera(device: Option<&str>) -> Self {
        Self {
            input: CaptureInput::Camera(device.map(str::to_string)),
            fps: None,
        }
    }

    #[must_use]
    pub fn input(&self) -> &CaptureInput {
        &self.input
    }

    /// Change the frame rate of the capture. The argument is a fraction, for example:
    /// * For a framerate of one per 3 seconds, use (1, 3).
    /// * For a framerate of 12.34 frames per second use (1234, 100).
    pub fn frame_rate(&mut self, fps: (u64, u64)) {
        self.fps = Some(fps);
    }

    fn is_live(&self) -> bool {
        matches!(self.input, CaptureInput::Camera(_))
    }

    fn pipeline_description(&self) -> String {
        let src = match &self.input {
            CaptureInput::Uri(uri) => format!("uridecodebin uri=\"{uri}\" buffer-size=1"),
            CaptureInput::Camera(Some(device)) => format!("v4l2src device=\"{device}\""),
            CaptureInput::Camera(None) => String::from("autovideosrc"),
        };

        let fps_arg = match self.fps {
            None => String::from(""),
            Some((numer, denom)) => {
                format!("videorate ! video/x-raw,framerate={numer}/{denom} ! ")
            }
        };

        format!("{src} ! {fps_arg}videoconvert ! appsink name=sink")
    }

    /// Start the gstreamer pipeline and return an iterator over its frames.
    pub fn spawn(&self) -> Result<VideoCapture, glib::Error> {
        let pipeline_desc = self.pipeline_description();
        debug!("starting capture pipeline: {pipeline_desc}");

        let pipeline = gstreamer::parse::launch(&pipeline_desc)?
            .downcast::<gstreamer::Pipeline>()
            .map_err(|_| glib::Error::new(CoreError::Failed, "Expected a gstreamer::Pipeline"))?;

        let appsink = find_appsink(&pipeline)?;

        // Don't synchronize on the clock.
        appsink.set_property("sync", false);

        // Files are read as fast as they are consumed. Cameras keep running, so only the newest
        // frame is kept.
        appsink.set_max_buffers(1);
        appsink.set_drop(self.is_live());

        appsink.set_caps(Some(
            &gstreamer::Caps::builder("video/x-raw")
                .field("format", gstreamer_video::VideoFormat::Rgb.to_str())
                .build(),
        ));

        let capture = VideoCapture {
            pipeline,
            appsink,
            fused: false,
        };
        change_state_blocking(&capture.pipeline, gstreamer::State::Playing)?;

        Ok(capture)
    }
}

fn find_appsink(pipeline: &gstreamer::Pipeline) -> Result<gstreamer_app::AppSink, glib::Error> {
    pipeline
        .by_name("sink")
        .and_then(|elem| elem.downcast::<gstreamer_app::AppSink>().ok())
        .ok_or_else(|| glib::Error::new(CoreError::Failed, "Sink element not found"))
}

fn change_state_blocking(
    pipeline: &gstreamer::Pipeline,
    new_state: gstreamer::State,
) -> Result<(), glib::Error> {
    use StateChangeSuccess::*;
    let timeout = 10 * gstreamer::ClockTime::SECOND;

    let state_change_error = match pipeline.set_state(new_state) {
        Ok(Success | NoPreroll) => return Ok(()),
        Ok(Async) => {
            let (result, _curr, _pending) = pipeline.state(timeout);
            match result {
                Ok(Success | NoPreroll) => return Ok(()),

                //state change failed within timeout. Treat as error
                Ok(Async) => None,
                Err(e) => Some(e),
            }
        }

        Err(e) => Some(e),
    };

    //If there was any error then return that.
    //If no error but timed out then say so.
    let bus_error = pipeline.bus().and_then(|bus| bus_errors(&bus).next());
    let error = match (bus_error, state_change_error) {
        (Some(e), _) => e,
        (None, Some(_)) => glib::Error::new(CoreError::StateChange, "Gstreamer State Change Error"),
        (None, None) => glib::Error::new(CoreError::TooLazy, "Gstreamer state change timed out"),
    };

    //before returning, close down the pipeline so that gstreamer releases the device.
    if new_state != gstreamer::State::Null {
        if let Err(e) = change_state_blocking(pipeline, gstreamer::State::Null) {
            error!("failed to shut down capture pipeline: {e}");
        }
    }

    Err(error)
}

fn into_glib_error(msg: &gstreamer::Message) -> Option<glib::Error> {
    match msg.view() {
        MessageView::Error(e) => Some(e.error()),
        MessageView::Warning(w) => Some(w.error()),
        _ => None,
    }
}

// Drain all errors and warnings from the bus.
//(This prevents messages piling up and causing memory leaks)
fn bus_errors(bus: &gstreamer::Bus) -> impl Iterator<Item = glib::Error> + '_ {
    let errs_warns = [
        gstreamer::MessageType::Error,
        gstreamer::MessageType::Warning,
    ];

    std::iter::from_fn(move || bus.pop_filtered(&errs_warns)).filter_map(|msg| into_glib_error(&msg))
}

// Iterates over all captured frames.
// The iterator will produce Ok(frame) until no more frames can be read. If any error occurred
// the iterator will produce Err(error). Once all frames and the first error have been
// produced the iterator will produce None.
#[derive(Debug)]
pub struct VideoCapture {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,

    //Whether the last frame has been returned
    fused: bool,
}

impl FusedIterator for VideoCapture {}
impl Iterator for VideoCapture {
    type Item = Result<RgbImage, glib::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample()
            .map(|res| res.and_then(|sample| sample_to_image(&sample)))
    }
}

impl VideoCapture {
    fn next_sample(&mut self) -> Option<Result<gstreamer::Sample, glib::Error>> {
        //the amount of time to wait for a frame before assuming there are
        //none left.
        let try_pull_sample_timeout = 30 * gstreamer::ClockTime::SECOND;

        if self.fused {
            return None;
        }

        //If any error/warning occurred, then return it now.
        if let Some(error) = self.try_find_error() {
            self.shutdown();
            return Some(Err(error));
        }

        match self.appsink.try_pull_sample(try_pull_sample_timeout) {
            Some(sample) => Some(Ok(sample)),

            None => {
                //if no sample was returned then we might have hit the timeout.
                //If so check for any possible error being written into the log
                //at that time
                let ret = match self.try_find_error() {
                    Some(error) => Some(Err(error)),
                    None if !self.appsink.is_eos() => Some(Err(glib::Error::new(
                        CoreError::TooLazy,
                        "Gstreamer timed out",
                    ))),

                    // Otherwise we hit EOS and nothing else suspicious happened
                    None => None,
                };

                self.shutdown();
                ret
            }
        }
    }

    fn try_find_error(&self) -> Option<glib::Error> {
        self.pipeline.bus().and_then(|bus| bus_errors(&bus).next())
    }

    // Make sure no more frames can be drawn, and release the device.
    fn shutdown(&mut self) {
        if self.fused {
            return;
        }
        self.fused = true;

        trace!("shutting down capture pipeline");
        if let Err(e) = change_state_blocking(&self.pipeline, gstreamer::State::Null) {
            error!("failed to shut down capture pipeline: {e}");
        }
    }
}

//Must ensure all refcounted gobjects are cleaned up by the glib runtime.
//This won't happen unless we set the pipeline state to null
impl Drop for VideoCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sample_to_image(sample: &gstreamer::Sample) -> Result<RgbImage, glib::Error> {
    let caps = sample
        .caps()
        .ok_or_else(|| glib::Error::new(CoreError::Negotiation, "Sample without caps"))?;
    let info = gstreamer_video::VideoInfo::from_caps(caps)
        .map_err(|e| glib::Error::new(CoreError::Negotiation, &e.message))?;

    let buffer = sample
        .buffer_owned()
        .ok_or_else(|| glib::Error::new(CoreError::Failed, "Sample without buffer"))?;

    let frame = gstreamer_video::VideoFrame::from_buffer_readable(buffer, &info)
        .map_err(|_| glib::Error::new(CoreError::Failed, "Failed to map buffer readable"))?;

    let data = frame
        .plane_data(0)
        .map_err(|e| glib::Error::new(CoreError::Failed, &e.message))?;
    let stride = frame.plane_stride()[0] as usize;

    copy_rgb_rows(data, frame.width(), frame.height(), stride)
        .ok_or_else(|| glib::Error::new(CoreError::Failed, "Frame buffer is too small"))
}

// Copy a packed RGB plane whose rows are `stride` bytes apart into a tightly packed image.
fn copy_rgb_rows(data: &[u8], width: u32, height: u32, stride: usize) -> Option<RgbImage> {
    let row_len = width as usize * 3;
    if stride < row_len {
        return None;
    }

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(data.get(start..start + row_len)?);
    }

    RgbImage::from_raw(width, height, pixels)
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn test_uri_pipeline() {
        let builder = CaptureBuilder::from_uri("file:///tmp/a.mp4");
        assert_eq!(
            builder.pipeline_description(),
            "uridecodebin uri=\"file:///tmp/a.mp4\" buffer-size=1 ! videoconvert ! appsink name=sink"
        );
        assert!(!builder.is_live());
    }

    #[test]
    fn test_camera_pipeline() {
        let mut builder = CaptureBuilder::camera(Some("/dev/video2"));
        builder.frame_rate((10, 1));
        assert_eq!(
            builder.pipeline_description(),
            "v4l2src device=\"/dev/video2\" ! videorate ! video/x-raw,framerate=10/1 ! videoconvert ! appsink name=sink"
        );
        assert!(builder.is_live());

        let default_cam = CaptureBuilder::camera(None);
        assert!(default_cam.pipeline_description().starts_with("autovideosrc ! "));
    }

    #[test]
    fn test_copy_padded_rows() {
        //2x2 image with 2 bytes of padding per row
        #[rustfmt::skip]
        let data = [
            1, 2, 3,  4, 5, 6,  0, 0,
            7, 8, 9,  10, 11, 12,  0, 0,
        ];
        let img = copy_rgb_rows(&data, 2, 2, 8).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgb([1, 2, 3]));
        assert_eq!(*img.get_pixel(1, 0), Rgb([4, 5, 6]));
        assert_eq!(*img.get_pixel(0, 1), Rgb([7, 8, 9]));
        assert_eq!(*img.get_pixel(1, 1), Rgb([10, 11, 12]));
    }

    #[test]
    fn test_copy_short_buffer() {
        let data = [0u8; 10];
        assert!(copy_rgb_rows(&data, 2, 2, 6).is_none());
        assert!(copy_rgb_rows(&data, 2, 1, 4).is_none());
    }
}
