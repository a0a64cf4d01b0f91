// Structural similarity definitions

/// The default edge length (in pixels) of the square window used to compute local
/// structural similarity. Must be odd so that every window has a center pixel.
///
/// Larger windows smooth out sensor noise but blur the edges of moving objects, which
/// makes the bounding boxes of detected regions grow by roughly half a window in every
/// direction.
pub const DEFAULT_SSIM_WINDOW_SIZE: u32 = 7;

/// The largest accepted window edge length.
pub const MAX_SSIM_WINDOW_SIZE: u32 = 1023;

/// Luminance stabilization constant (as a fraction of the dynamic range)
pub const SSIM_K1: f64 = 0.01;

/// Contrast stabilization constant (as a fraction of the dynamic range)
pub const SSIM_K2: f64 = 0.03;

/// Dynamic range of 8 bit grayscale frames.
pub const SSIM_DATA_RANGE: f64 = 255.0;

// Change mask definitions
pub const MASK_FOREGROUND: u8 = 255;
pub const MASK_BACKGROUND: u8 = 0;

// Annotation definitions
pub const DEFAULT_REGION_COLOUR: [u8; 3] = [255, 0, 0];
pub const DEFAULT_REGION_THICKNESS: u32 = 2;
pub const DEFAULT_CENTROID_COLOUR: [u8; 3] = [0, 255, 0];
pub const DEFAULT_CENTROID_RADIUS: u32 = 40;
pub const DEFAULT_CENTROID_THICKNESS: u32 = 10;

// Labels handed to the frame sink for each surfaced artifact.
pub const LABEL_DIFFERENCE: &str = "difference";
pub const LABEL_THRESH: &str = "thresh";
pub const LABEL_ANNOTATED: &str = "annotated";
