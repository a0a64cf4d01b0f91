use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

use crate::definitions::{MASK_BACKGROUND, MASK_FOREGROUND};

/// An axis-aligned bounding box around one connected region of changed pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a region from its top left corner and its size.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero. Regions produced by [`extract_regions`]
    /// always cover at least one pixel.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "region must be at least 1x1, got {width}x{height}");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create the smallest region containing both (inclusive) corners.
    ///
    /// # Panics
    ///
    /// Panics if the second corner lies above or to the left of the first.
    #[must_use]
    pub fn from_corners((min_x, min_y): (u32, u32), (max_x, max_y): (u32, u32)) -> Self {
        assert!(min_x <= max_x && min_y <= max_y, "corners out of order");
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// Geometric centre, measured the same way as the centroid weighting: `x + width / 2`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug)]
struct LabelBounds {
    min: (u32, u32),
    max: (u32, u32),
    external: bool,
}

/// Find every outermost connected region of foreground (nonzero) pixels in `mask` and
/// return its bounding box.
///
/// Foreground is connected through all eight neighbours. The frame is treated as if it were
/// surrounded by background, and only regions that can be reached from that outer background
/// are reported: a region lying entirely inside a hole of another region is swallowed by
/// its enclosing region. Nothing is filtered by size, so even a single changed pixel is
/// a region.
#[must_use]
pub fn extract_regions(mask: &GrayImage) -> Vec<Region> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return vec![];
    }

    let binary = binarize(mask);
    let fg_labels = connected_components(&binary, Connectivity::Eight, Luma([MASK_BACKGROUND]));

    //The dual of 8-connected foreground is 4-connected background.
    let inverted = invert(&binary);
    let bg_labels = connected_components(&inverted, Connectivity::Four, Luma([MASK_BACKGROUND]));
    let outer_bg = outer_background_labels(&bg_labels);

    let mut bounds: Vec<Option<LabelBounds>> = vec![];

    for (x, y, &Luma([label])) in fg_labels.enumerate_pixels() {
        if label == 0 {
            continue;
        }
        let label = label as usize;
        if bounds.len() <= label {
            bounds.resize(label + 1, None);
        }

        let external = touches_outer_background(&bg_labels, &outer_bg, x, y);
        let entry = bounds[label].get_or_insert(LabelBounds {
            min: (x, y),
            max: (x, y),
            external: false,
        });

        entry.min = (entry.min.0.min(x), entry.min.1.min(y));
        entry.max = (entry.max.0.max(x), entry.max.1.max(y));
        entry.external |= external;
    }

    bounds
        .into_iter()
        .flatten()
        .filter(|b| b.external)
        .map(|b| Region::from_corners(b.min, b.max))
        .collect()
}

fn binarize(mask: &GrayImage) -> GrayImage {
    let mut ret = mask.clone();
    for &mut Luma([ref mut pix]) in ret.pixels_mut() {
        *pix = if *pix == MASK_BACKGROUND {
            MASK_BACKGROUND
        } else {
            MASK_FOREGROUND
        };
    }
    ret
}

fn invert(binary: &GrayImage) -> GrayImage {
    let mut ret = binary.clone();
    for &mut Luma([ref mut pix]) in ret.pixels_mut() {
        *pix = MASK_FOREGROUND - *pix;
    }
    ret
}

// Labels of every background component that touches the edge of the frame.
fn outer_background_labels(bg_labels: &Image<Luma<u32>>) -> Vec<bool> {
    let (width, height) = bg_labels.dimensions();
    let max_label = bg_labels.pixels().map(|Luma([l])| *l).max().unwrap_or(0);
    let mut ret = vec![false; max_label as usize + 1];

    let top_bottom = (0..width).flat_map(|x| [(x, 0), (x, height - 1)]);
    let left_right = (0..height).flat_map(|y| [(0, y), (width - 1, y)]);

    for (x, y) in top_bottom.chain(left_right) {
        let Luma([label]) = *bg_labels.get_pixel(x, y);
        if label != 0 {
            ret[label as usize] = true;
        }
    }

    ret
}

// Whether a foreground pixel borders the outside world, either by lying on the frame edge or
// by having a 4-neighbour in a background component that reaches the frame edge.
fn touches_outer_background(
    bg_labels: &Image<Luma<u32>>,
    outer_bg: &[bool],
    x: u32,
    y: u32,
) -> bool {
    let (width, height) = bg_labels.dimensions();
    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
        return true;
    }

    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
        .iter()
        .any(|&(nx, ny)| {
            let Luma([label]) = *bg_labels.get_pixel(nx, ny);
            label != 0 && outer_bg[label as usize]
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn mask_from(width: u32, height: u32, pixen: &[u8]) -> GrayImage {
        let vals = pixen.iter().map(|&p| if p == 0 { 0 } else { 255 }).collect();
        GrayImage::from_raw(width, height, vals).unwrap()
    }

    fn sorted(mut regions: Vec<Region>) -> Vec<Region> {
        regions.sort();
        regions
    }

    #[test]
    fn test_empty_mask() {
        let mask = GrayImage::new(6, 4);
        assert!(extract_regions(&mask).is_empty());
    }

    #[test]
    fn test_zero_sized_mask() {
        let mask = GrayImage::new(0, 0);
        assert!(extract_regions(&mask).is_empty());
    }

    #[test]
    fn test_single_pixel_is_a_region() {
        #[rustfmt::skip]
        let pixen = [
            0, 0, 0,
            0, 1, 0,
            0, 0, 0,
        ];
        let regions = extract_regions(&mask_from(3, 3, &pixen));
        assert_eq!(regions, vec![Region::new(1, 1, 1, 1)]);
    }

    #[test]
    fn test_two_separate_blobs() {
        #[rustfmt::skip]
        let pixen = [
            1, 1, 0, 0, 0, 0,
            1, 1, 0, 0, 0, 0,
            0, 0, 0, 0, 1, 0,
            0, 0, 0, 1, 1, 1,
        ];
        let regions = sorted(extract_regions(&mask_from(6, 4, &pixen)));
        assert_eq!(regions, vec![Region::new(0, 0, 2, 2), Region::new(3, 2, 3, 2)]);
    }

    #[test]
    fn test_diagonal_neighbours_are_connected() {
        #[rustfmt::skip]
        let pixen = [
            1, 0, 0, 0,
            0, 1, 0, 0,
            0, 0, 1, 0,
            0, 0, 0, 0,
        ];
        let regions = extract_regions(&mask_from(4, 4, &pixen));
        assert_eq!(regions, vec![Region::new(0, 0, 3, 3)]);
    }

    #[test]
    fn test_nested_region_not_reported() {
        #[rustfmt::skip]
        let pixen = [
            0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 1, 1, 1, 1, 1, 1, 1, 0,
            0, 1, 0, 0, 0, 0, 0, 1, 0,
            0, 1, 0, 0, 0, 0, 0, 1, 0,
            0, 1, 0, 0, 1, 0, 0, 1, 0,
            0, 1, 0, 0, 0, 0, 0, 1, 0,
            0, 1, 0, 0, 0, 0, 0, 1, 0,
            0, 1, 1, 1, 1, 1, 1, 1, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let regions = extract_regions(&mask_from(9, 9, &pixen));
        assert_eq!(regions, vec![Region::new(1, 1, 7, 7)]);
    }

    #[test]
    fn test_ring_touching_border_still_hides_island() {
        #[rustfmt::skip]
        let pixen = [
            1, 1, 1, 1, 1,
            1, 0, 0, 0, 1,
            1, 0, 1, 0, 1,
            1, 0, 0, 0, 1,
            1, 1, 1, 1, 1,
        ];
        let regions = extract_regions(&mask_from(5, 5, &pixen));
        assert_eq!(regions, vec![Region::new(0, 0, 5, 5)]);
    }

    #[test]
    fn test_leaky_ring_exposes_inner_region() {
        //a gap in the ring joins the inner background to the outside. 4-connected background
        //cannot pass between diagonal foreground pixels, so the gap must be an edge gap.
        #[rustfmt::skip]
        let pixen = [
            0, 0, 0, 0, 0, 0, 0,
            0, 1, 1, 0, 1, 1, 0,
            0, 1, 0, 0, 0, 1, 0,
            0, 1, 0, 1, 0, 1, 0,
            0, 1, 0, 0, 0, 1, 0,
            0, 1, 1, 1, 1, 1, 0,
            0, 0, 0, 0, 0, 0, 0,
        ];
        let regions = sorted(extract_regions(&mask_from(7, 7, &pixen)));
        assert_eq!(regions, vec![Region::new(1, 1, 5, 5), Region::new(3, 3, 1, 1)]);
    }

    #[test]
    fn test_full_mask() {
        let mask = GrayImage::from_pixel(4, 3, Luma([255]));
        assert_eq!(extract_regions(&mask), vec![Region::new(0, 0, 4, 3)]);
    }

    #[test]
    fn test_region_geometry() {
        let region = Region::new(10, 20, 5, 8);
        assert_eq!(region.center(), (12.5, 24.0));
        assert_eq!(region.area(), 40);
        assert_eq!((region.right(), region.bottom()), (15, 28));
        assert_eq!(Region::from_corners((10, 20), (14, 27)), region);
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn test_zero_sized_region_panics() {
        let _ = Region::new(3, 4, 0, 2);
    }

    #[test]
    #[should_panic(expected = "corners out of order")]
    fn test_swapped_corners_panic() {
        let _ = Region::from_corners((5, 5), (4, 9));
    }
}
