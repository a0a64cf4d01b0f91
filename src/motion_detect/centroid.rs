use serde::{Deserialize, Serialize};

use super::regions::Region;

/// A point in frame coordinates marking the centre of all motion in a frame pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionCentroid {
    pub x: f64,
    pub y: f64,
}

/// The outcome of the centroid calculation. Having no motion is not an error, it just
/// means nothing should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    NoMotion,
    Detected(MotionCentroid),
}

impl Motion {
    #[must_use]
    pub fn centroid(&self) -> Option<MotionCentroid> {
        match self {
            Self::NoMotion => None,
            Self::Detected(c) => Some(*c),
        }
    }

    #[must_use]
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}

/// Compute the size-weighted centre of a set of regions.
///
/// The two axes are independent. Each region pulls the X coordinate towards its horizontal
/// centre with weight `width^2`, and pulls the Y coordinate towards its vertical centre with
/// weight `height^2`. Squaring the extent lets one large moving object dominate many small
/// specks of noise far more than weighting by area would.
#[must_use]
pub fn motion_centroid(regions: &[Region]) -> Motion {
    let mut center_x = 0.0;
    let mut weight_x = 0.0;
    let mut center_y = 0.0;
    let mut weight_y = 0.0;

    for r in regions {
        let (cx, cy) = r.center();
        let wx = f64::from(r.width).powi(2);
        let wy = f64::from(r.height).powi(2);

        center_x += cx * wx;
        weight_x += wx;
        center_y += cy * wy;
        weight_y += wy;
    }

    if weight_x <= 0.0 || weight_y <= 0.0 {
        return Motion::NoMotion;
    }

    Motion::Detected(MotionCentroid {
        x: center_x / weight_x,
        y: center_y / weight_y,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_no_regions() {
        assert_eq!(motion_centroid(&[]), Motion::NoMotion);
        assert_eq!(motion_centroid(&[]).centroid(), None);
    }

    #[test]
    fn test_single_region_is_its_centre() {
        let c = motion_centroid(&[Region::new(10, 20, 30, 40)])
            .centroid()
            .unwrap();
        assert_close(c.x, 25.0);
        assert_close(c.y, 40.0);
    }

    #[test]
    fn test_axes_weighted_independently() {
        //wide but short, and narrow but tall.
        let wide = Region::new(0, 0, 100, 2);
        let tall = Region::new(200, 200, 2, 100);

        let c = motion_centroid(&[wide, tall]).centroid().unwrap();

        //x follows the wide region, y follows the tall region.
        let expected_x = (50.0 * 10000.0 + 201.0 * 4.0) / 10004.0;
        let expected_y = (1.0 * 4.0 + 250.0 * 10000.0) / 10004.0;
        assert_close(c.x, expected_x);
        assert_close(c.y, expected_y);
    }

    #[test]
    fn test_wide_region_dominates() {
        let narrow = Region::new(0, 0, 10, 10);
        let wide = Region::new(500, 0, 100, 10);

        let c = motion_centroid(&[narrow, wide]).centroid().unwrap();

        let unweighted_x = (narrow.center().0 + wide.center().0) / 2.0;
        let wide_x = wide.center().0;
        assert!((c.x - wide_x).abs() < (unweighted_x - wide_x).abs());

        //exact value: (5 * 100 + 550 * 10000) / 10100
        assert_close(c.x, (5.0 * 100.0 + 550.0 * 10000.0) / 10100.0);
    }
}
