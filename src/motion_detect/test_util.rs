//! Synthetic frames and in-memory collaborators for exercising the pipeline in tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use image::{GrayImage, Rgb, RgbImage};

use super::run_loop::{FrameSink, FrameSource, FrameView};
use super::Error;

#[must_use]
pub fn uniform_frame(width: u32, height: u32, colour: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(colour))
}

/// A copy of `base` with the rectangle at (x, y) of the given size painted `colour`.
#[must_use]
pub fn with_patch(
    base: &RgbImage,
    (x, y): (u32, u32),
    (width, height): (u32, u32),
    colour: [u8; 3],
) -> RgbImage {
    let mut ret = base.clone();
    for py in y..(y + height).min(ret.height()) {
        for px in x..(x + width).min(ret.width()) {
            ret.put_pixel(px, py, Rgb(colour));
        }
    }
    ret
}

/// A frame source that replays a fixed list of frames, optionally failing partway through.
///
/// `dropped()` returns a flag that is set once the source has been dropped.
#[derive(Debug)]
pub struct VecSource {
    frames: VecDeque<RgbImage>,
    fail_after: Option<usize>,
    served: usize,
    dropped: Rc<Cell<bool>>,
}

impl VecSource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            fail_after: None,
            served: 0,
            dropped: Rc::new(Cell::new(false)),
        }
    }

    /// Return an error instead of the frame following the first `n` frames.
    #[must_use]
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    #[must_use]
    pub fn dropped(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.dropped)
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, Error> {
        if self.fail_after == Some(self.served) {
            return Err(Error::FrameSource(
                format!("synthetic failure after {} frames", self.served).into(),
            ));
        }
        self.served += 1;
        Ok(self.frames.pop_front())
    }
}

impl Drop for VecSource {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

/// An owned copy of an image shown to a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedImage {
    Color(RgbImage),
    Gray(GrayImage),
}

/// A sink that keeps a copy of everything it is shown. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    shown: Rc<RefCell<Vec<(String, RecordedImage)>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.shown.borrow().iter().map(|(l, _)| l.clone()).collect()
    }

    #[must_use]
    pub fn shown(&self) -> Vec<(String, RecordedImage)> {
        self.shown.borrow().clone()
    }
}

impl FrameSink for RecordingSink {
    fn show(&mut self, label: &str, image: FrameView<'_>) {
        let owned = match image {
            FrameView::Color(img) => RecordedImage::Color(img.clone()),
            FrameView::Gray(img) => RecordedImage::Gray(img.clone()),
        };
        self.shown.borrow_mut().push((label.to_string(), owned));
    }
}
