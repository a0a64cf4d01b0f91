use image::{GrayImage, Luma};
use imageproc::definitions::Image;

use crate::definitions::{MAX_SSIM_WINDOW_SIZE, SSIM_DATA_RANGE, SSIM_K1, SSIM_K2};

use super::{check_nonempty, check_same_dimensions, InvalidInput};

/// Per-pixel structural similarity between two frames. Values lie in [-1, 1],
/// where 1 means the neighbourhoods of the pixel are identical in both frames.
pub type SimilarityMap = Image<Luma<f32>>;

/// The result of comparing two grayscale frames.
#[derive(Debug, Clone)]
pub struct StructuralDifference {
    score: f64,
    map: SimilarityMap,
}

impl StructuralDifference {
    /// Mean of every cell of the similarity map.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn map(&self) -> &SimilarityMap {
        &self.map
    }

    #[must_use]
    pub fn into_map(self) -> SimilarityMap {
        self.map
    }
}

/// Compute the structural similarity (SSIM) of every pixel of `frame_a` against `frame_b`.
///
/// Local statistics are gathered over a square `window_size` window centred on each pixel.
/// Windows that overhang the edge of the frame are filled by mirroring the frame about its
/// border (`d c b a | a b c d`), so the map always has the same dimensions as the inputs,
/// even for frames smaller than the window.
pub fn structural_difference(
    frame_a: &GrayImage,
    frame_b: &GrayImage,
    window_size: u32,
) -> Result<StructuralDifference, InvalidInput> {
    check_same_dimensions(frame_a.dimensions(), frame_b.dimensions())?;
    check_nonempty(frame_a.dimensions())?;
    if window_size == 0 || window_size % 2 == 0 || window_size > MAX_SSIM_WINDOW_SIZE {
        return Err(InvalidInput::InvalidWindowSize(window_size));
    }

    let (width, height) = frame_a.dimensions();
    let (w, h) = (width as usize, height as usize);
    let radius = (window_size / 2) as usize;

    let a: Vec<f64> = frame_a.as_raw().iter().map(|&p| f64::from(p)).collect();
    let b: Vec<f64> = frame_b.as_raw().iter().map(|&p| f64::from(p)).collect();
    let aa: Vec<f64> = a.iter().map(|v| v * v).collect();
    let bb: Vec<f64> = b.iter().map(|v| v * v).collect();
    let ab: Vec<f64> = a.iter().zip(&b).map(|(va, vb)| va * vb).collect();

    let sum_a = window_sums(&a, w, h, radius);
    let sum_b = window_sums(&b, w, h, radius);
    let sum_aa = window_sums(&aa, w, h, radius);
    let sum_bb = window_sums(&bb, w, h, radius);
    let sum_ab = window_sums(&ab, w, h, radius);

    // unbiased (sample) covariance, as is conventional for SSIM
    let n = f64::from(window_size).powi(2);
    let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };

    let c1 = (SSIM_K1 * SSIM_DATA_RANGE).powi(2);
    let c2 = (SSIM_K2 * SSIM_DATA_RANGE).powi(2);

    let mut map = SimilarityMap::new(width, height);
    let mut total = 0.0;

    for (i, &mut Luma([ref mut cell])) in map.pixels_mut().enumerate() {
        let mu_a = sum_a[i] / n;
        let mu_b = sum_b[i] / n;
        let var_a = cov_norm * (sum_aa[i] / n - mu_a * mu_a);
        let var_b = cov_norm * (sum_bb[i] / n - mu_b * mu_b);
        let cov_ab = cov_norm * (sum_ab[i] / n - mu_a * mu_b);

        let numerator = (2.0 * mu_a * mu_b + c1) * (2.0 * cov_ab + c2);
        let denominator = (mu_a * mu_a + mu_b * mu_b + c1) * (var_a + var_b + c2);
        let ssim = numerator / denominator;

        total += ssim;
        *cell = ssim as f32;
    }

    let score = total / (w * h) as f64;

    Ok(StructuralDifference { score, map })
}

// Index into a line of `len` samples, mirroring about both ends.
fn reflect(idx: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let m = idx.rem_euclid(period);
    let ret = if m < len { m } else { period - 1 - m };
    ret as usize
}

// Sum of every (2 * radius + 1)^2 window, computed separably: rows first, then columns.
fn window_sums(values: &[f64], width: usize, height: usize, radius: usize) -> Vec<f64> {
    let span = 2 * radius + 1;
    let xs: Vec<usize> = (0..width + 2 * radius)
        .map(|i| reflect(i as isize - radius as isize, width))
        .collect();
    let ys: Vec<usize> = (0..height + 2 * radius)
        .map(|i| reflect(i as isize - radius as isize, height))
        .collect();

    let mut rows = vec![0.0; width * height];
    for y in 0..height {
        let src = &values[y * width..(y + 1) * width];
        let dst = &mut rows[y * width..(y + 1) * width];
        for (x, out) in dst.iter_mut().enumerate() {
            *out = xs[x..x + span].iter().map(|&sx| src[sx]).sum();
        }
    }

    let mut ret = vec![0.0; width * height];
    for y in 0..height {
        for x in 0..width {
            ret[y * width + x] = ys[y..y + span]
                .iter()
                .map(|&sy| rows[sy * width + x])
                .sum();
        }
    }

    ret
}
