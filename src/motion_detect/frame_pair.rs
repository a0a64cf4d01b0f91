use image::{GrayImage, RgbImage};

use super::annotate::annotate_frame;
use super::centroid::{motion_centroid, Motion};
use super::change_mask::ChangeMask;
use super::grayscale::to_grayscale;
use super::options::PipelineOptions;
use super::regions::{extract_regions, Region};
use super::structural_diff::{structural_difference, SimilarityMap};
use super::{check_nonempty, check_same_dimensions, InvalidInput};

/// Everything computed for one (previous, current) frame pair.
#[derive(Debug, Clone)]
pub struct FramePairReport {
    pub score: f64,
    pub similarity: SimilarityMap,
    pub change_mask: ChangeMask,
    pub regions: Vec<Region>,
    pub motion: Motion,

    /// A copy of the current frame with the regions and centroid drawn on it.
    pub annotated: RgbImage,
}

impl FramePairReport {
    /// The similarity map rescaled to 8 bits, 255 = most similar.
    #[must_use]
    pub fn difference(&self) -> &GrayImage {
        self.change_mask.difference()
    }

    #[must_use]
    pub fn mask(&self) -> &GrayImage {
        self.change_mask.mask()
    }
}

/// Run the full pipeline on a single pair of frames.
pub fn process_frame_pair(
    previous: &RgbImage,
    current: &RgbImage,
    options: &PipelineOptions,
) -> Result<FramePairReport, InvalidInput> {
    options.validate()?;
    check_same_dimensions(previous.dimensions(), current.dimensions())?;
    check_nonempty(current.dimensions())?;

    let gray_a = to_grayscale(previous)?;
    let gray_b = to_grayscale(current)?;

    let diff = structural_difference(&gray_a, &gray_b, options.window_size)?;
    let score = diff.score();
    let similarity = diff.into_map();

    let change_mask = ChangeMask::from_similarity(&similarity);
    let regions = extract_regions(change_mask.mask());
    let motion = motion_centroid(&regions);
    let annotated = annotate_frame(current, &regions, &motion, &options.annotation);

    debug!(
        "frame pair: score {:.4}, threshold {}, {} regions, {:?}",
        score,
        change_mask.threshold(),
        regions.len(),
        motion
    );

    Ok(FramePairReport {
        score,
        similarity,
        change_mask,
        regions,
        motion,
        annotated,
    })
}

/// Holds the previous frame of a stream, and compares each new frame against it.
///
/// The first frame only primes the controller. Every following frame is compared with the one
/// before it, after which it becomes the new previous frame.
#[derive(Debug, Clone)]
pub struct FramePairController {
    options: PipelineOptions,
    previous: Option<RgbImage>,
}

impl FramePairController {
    pub fn new(options: PipelineOptions) -> Result<Self, InvalidInput> {
        options.validate()?;
        Ok(Self {
            options,
            previous: None,
        })
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[must_use]
    pub fn has_previous_frame(&self) -> bool {
        self.previous.is_some()
    }

    /// Feed the next frame of the stream.
    ///
    /// Returns `Ok(None)` for the first frame. If the frame does not match the dimensions of the
    /// previous frame then an error is returned and the previous frame is kept.
    pub fn push_frame(&mut self, frame: RgbImage) -> Result<Option<FramePairReport>, InvalidInput> {
        check_nonempty(frame.dimensions())?;

        let report = match &self.previous {
            None => {
                trace!("no previous frame, storing first frame");
                None
            }
            Some(previous) => {
                check_same_dimensions(previous.dimensions(), frame.dimensions())?;
                Some(process_frame_pair(previous, &frame, &self.options)?)
            }
        };

        self.previous = Some(frame);
        Ok(report)
    }

    /// Forget the previous frame. The next frame pushed will prime the controller again.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn test_first_frame_primes() {
        let mut ctl = FramePairController::new(PipelineOptions::default()).unwrap();
        assert!(!ctl.has_previous_frame());

        let res = ctl.push_frame(RgbImage::new(12, 12)).unwrap();
        assert!(res.is_none());
        assert!(ctl.has_previous_frame());

        let res = ctl.push_frame(RgbImage::new(12, 12)).unwrap();
        assert!(res.is_some());
        assert!(ctl.has_previous_frame());
    }

    #[test]
    fn test_mismatch_keeps_previous() {
        let mut ctl = FramePairController::new(PipelineOptions::default()).unwrap();
        ctl.push_frame(RgbImage::from_pixel(12, 12, Rgb([1, 2, 3])))
            .unwrap();

        let err = ctl.push_frame(RgbImage::new(13, 12)).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::DimensionMismatch {
                expected: (12, 12),
                actual: (13, 12)
            }
        );

        //the stored frame is still the 12x12 one
        assert!(ctl.push_frame(RgbImage::new(12, 12)).unwrap().is_some());
    }

    #[test]
    fn test_empty_first_frame() {
        let mut ctl = FramePairController::new(PipelineOptions::default()).unwrap();
        assert!(ctl.push_frame(RgbImage::new(0, 0)).is_err());
        assert!(!ctl.has_previous_frame());
    }

    #[test]
    fn test_reset() {
        let mut ctl = FramePairController::new(PipelineOptions::default()).unwrap();
        ctl.push_frame(RgbImage::new(8, 8)).unwrap();
        ctl.reset();
        assert!(!ctl.has_previous_frame());
        assert!(ctl.push_frame(RgbImage::new(8, 8)).unwrap().is_none());
    }

    #[test]
    fn test_bad_options() {
        let opts = PipelineOptions {
            window_size: 6,
            ..PipelineOptions::default()
        };
        assert!(FramePairController::new(opts).is_err());
    }

    #[test]
    fn test_report_accessors() {
        let frame = RgbImage::from_pixel(10, 10, Rgb([50, 60, 70]));
        let report = process_frame_pair(&frame, &frame, &PipelineOptions::default()).unwrap();

        assert_eq!(report.difference().dimensions(), (10, 10));
        assert_eq!(report.mask().dimensions(), (10, 10));
        assert_eq!(report.annotated, frame);
    }
}
