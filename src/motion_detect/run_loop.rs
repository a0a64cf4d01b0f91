use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::definitions::{LABEL_ANNOTATED, LABEL_DIFFERENCE, LABEL_THRESH};

use super::frame_pair::{FramePairController, FramePairReport};
use super::options::PipelineOptions;
use super::Error;

/// Produces successive frames of a stream. All frames of one stream must have the same
/// dimensions.
pub trait FrameSource {
    /// Block until the next frame is available. `Ok(None)` signals the end of the stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, Error>;
}

/// A borrowed image handed to a [`FrameSink`].
#[derive(Debug, Clone, Copy)]
pub enum FrameView<'a> {
    Color(&'a RgbImage),
    Gray(&'a GrayImage),
}

impl FrameView<'_> {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Color(img) => img.dimensions(),
            Self::Gray(img) => img.dimensions(),
        }
    }
}

/// Receives intermediate images for display. Purely observational: nothing is ever read back.
pub trait FrameSink {
    fn show(&mut self, label: &str, image: FrameView<'_>);
}

/// Asked once per loop iteration whether the run should end.
pub trait StopSignal {
    fn stop_requested(&mut self) -> bool;
}

/// A sink that throws everything away.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&mut self, label: &str, _image: FrameView<'_>) {
        trace!("discarding {label} image");
    }
}

/// A stop signal that never fires, so the run lasts until the source is exhausted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn stop_requested(&mut self) -> bool {
        false
    }
}

impl<F: FnMut() -> bool> StopSignal for F {
    fn stop_requested(&mut self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    EndOfStream,
    StopRequested,
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames_read: u64,
    pub pairs_processed: u64,
    pub pairs_with_motion: u64,
    pub stop_reason: StopReason,
}

/// Pull frames from `source` until it is exhausted or `stop` fires, comparing each frame
/// with the one before it.
///
/// For every frame pair the rescaled difference image, the change mask and the annotated
/// frame are shown on `sink` (as `"difference"`, `"thresh"` and `"annotated"`), and then
/// `on_pair` is called with the index of the pair and its report.
///
/// The source is consumed, and is dropped before this function returns on every path.
pub fn run<S, K, T, F>(
    mut source: S,
    sink: &mut K,
    stop: &mut T,
    options: PipelineOptions,
    mut on_pair: F,
) -> Result<RunSummary, Error>
where
    S: FrameSource,
    K: FrameSink + ?Sized,
    T: StopSignal + ?Sized,
    F: FnMut(u64, &FramePairReport),
{
    let mut controller = FramePairController::new(options)?;

    let mut frames_read = 0;
    let mut pairs_processed = 0;
    let mut pairs_with_motion = 0;

    let stop_reason = loop {
        let frame = match source.next_frame()? {
            Some(frame) => frame,
            None => {
                trace!("frame source exhausted");
                break StopReason::EndOfStream;
            }
        };
        frames_read += 1;

        if let Some(report) = controller.push_frame(frame)? {
            sink.show(LABEL_DIFFERENCE, FrameView::Gray(report.difference()));
            sink.show(LABEL_THRESH, FrameView::Gray(report.mask()));
            sink.show(LABEL_ANNOTATED, FrameView::Color(&report.annotated));

            if report.motion.is_detected() {
                pairs_with_motion += 1;
            }
            on_pair(pairs_processed, &report);
            pairs_processed += 1;
        }

        if stop.stop_requested() {
            trace!("stop requested after {frames_read} frames");
            break StopReason::StopRequested;
        }
    };

    drop(source);

    let summary = RunSummary {
        frames_read,
        pairs_processed,
        pairs_with_motion,
        stop_reason,
    };

    info!(
        "Run finished ({:?}): {} frames read, {} pairs processed, motion in {} pairs",
        summary.stop_reason,
        summary.frames_read,
        summary.pairs_processed,
        summary.pairs_with_motion
    );

    Ok(summary)
}
