use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::definitions::*;

use super::InvalidInput;

/// How regions and the motion centroid are drawn onto the annotated copy of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    pub region_colour: [u8; 3],
    pub region_thickness: u32,
    pub centroid_colour: [u8; 3],
    pub centroid_radius: u32,
    pub centroid_thickness: u32,
}

impl AnnotationStyle {
    pub(crate) fn region_rgb(&self) -> Rgb<u8> {
        Rgb(self.region_colour)
    }

    pub(crate) fn centroid_rgb(&self) -> Rgb<u8> {
        Rgb(self.centroid_colour)
    }
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            region_colour: DEFAULT_REGION_COLOUR,
            region_thickness: DEFAULT_REGION_THICKNESS,
            centroid_colour: DEFAULT_CENTROID_COLOUR,
            centroid_radius: DEFAULT_CENTROID_RADIUS,
            centroid_thickness: DEFAULT_CENTROID_THICKNESS,
        }
    }
}

/// Tunables for the frame pair pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Edge length of the structural similarity window. Must be odd, and no larger than
    /// [`MAX_SSIM_WINDOW_SIZE`].
    pub window_size: u32,

    pub annotation: AnnotationStyle,
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.window_size == 0
            || self.window_size % 2 == 0
            || self.window_size > MAX_SSIM_WINDOW_SIZE
        {
            return Err(InvalidInput::InvalidWindowSize(self.window_size));
        }
        Ok(())
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_SSIM_WINDOW_SIZE,
            annotation: AnnotationStyle::default(),
        }
    }
}
