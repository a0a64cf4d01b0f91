pub mod annotate;
pub mod centroid;
pub mod change_mask;
pub mod frame_pair;
pub mod grayscale;
pub mod options;
pub mod regions;
pub mod run_loop;
pub mod structural_diff;

#[cfg(any(feature = "test-util", test))]
pub mod test_util;

use thiserror::Error;

/// An input that the pipeline refuses to process. These always indicate a misconfigured
/// frame source or bad options, so they are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("frame dimensions {actual:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("frame has zero width or height ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("similarity window size {0} must be odd, nonzero and at most {max}", max = crate::definitions::MAX_SSIM_WINDOW_SIZE)]
    InvalidWindowSize(u32),
}

/// An error that stopped a frame pair (or a whole run) from being processed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Frame source error: {0}")]
    FrameSource(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub(crate) fn check_nonempty((width, height): (u32, u32)) -> Result<(), InvalidInput> {
    if width == 0 || height == 0 {
        Err(InvalidInput::EmptyFrame { width, height })
    } else {
        Ok(())
    }
}

pub(crate) fn check_same_dimensions(
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), InvalidInput> {
    if expected == actual {
        Ok(())
    } else {
        Err(InvalidInput::DimensionMismatch { expected, actual })
    }
}
