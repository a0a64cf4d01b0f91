use image::{GrayImage, RgbImage};

use super::{check_nonempty, InvalidInput};

/// Convert a colour frame into a single channel of luminance.
///
/// Uses the `image` crate's luma weights, so the output is identical to
/// `image::imageops::grayscale`.
pub fn to_grayscale(frame: &RgbImage) -> Result<GrayImage, InvalidInput> {
    check_nonempty(frame.dimensions())?;
    Ok(image::imageops::grayscale(frame))
}
