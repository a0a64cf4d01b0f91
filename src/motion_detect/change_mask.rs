use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use super::structural_diff::SimilarityMap;

/// A binary mask separating pixels that changed between two frames (foreground, 255)
/// from pixels that did not (background, 0).
#[derive(Debug, Clone)]
pub struct ChangeMask {
    difference: GrayImage,
    mask: GrayImage,
    threshold: u8,
}

impl ChangeMask {
    /// Build a mask from a similarity map.
    ///
    /// The map is first rescaled into an 8 bit "difference image" (255 = most similar). A single
    /// threshold for the whole frame is then chosen with Otsu's method, and every pixel whose
    /// rescaled similarity is *below* that threshold becomes foreground. Similarity is high where
    /// the frames agree, so the low tail of the histogram is the motion.
    #[must_use]
    pub fn from_similarity(map: &SimilarityMap) -> Self {
        let difference = rescale_similarity(map);
        Self::from_difference(difference)
    }

    /// Build a mask from an already rescaled difference image.
    #[must_use]
    pub fn from_difference(difference: GrayImage) -> Self {
        // Otsu's level is the brightest intensity of the lower class, so
        // everything at or below it is foreground once inverted.
        let level = otsu_level(&difference);
        let mask = threshold(&difference, level, ThresholdType::BinaryInverted);

        // otsu_level can never select 255 as that would leave the upper class empty.
        let threshold = level.saturating_add(1);

        Self {
            difference,
            mask,
            threshold,
        }
    }

    /// The rescaled similarity map that the threshold was computed from.
    #[must_use]
    pub fn difference(&self) -> &GrayImage {
        &self.difference
    }

    #[must_use]
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// The lowest rescaled similarity that is classified as background. Pixels strictly below
    /// this value are foreground.
    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.mask.pixels().filter(|Luma([p])| *p != 0).count()
    }
}

/// Map similarity values onto the full 8 bit range. Negative similarities (anti-correlated
/// windows) are clamped to 0, so they count as maximally different.
#[must_use]
pub fn rescale_similarity(map: &SimilarityMap) -> GrayImage {
    let mut ret = GrayImage::new(map.width(), map.height());

    for (&mut Luma([ref mut dst]), &Luma([src])) in ret.pixels_mut().zip(map.pixels()) {
        let scaled = f64::from(src).clamp(0.0, 1.0) * 255.0;
        *dst = scaled as u8;
    }

    ret
}
