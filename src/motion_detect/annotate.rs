use image::RgbImage;
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::centroid::Motion;
use super::options::AnnotationStyle;
use super::regions::Region;

/// Copy `frame` and draw a box around every region, plus a ring around the motion centroid
/// if there is one. Shapes that overhang the frame are clipped.
#[must_use]
pub fn annotate_frame(
    frame: &RgbImage,
    regions: &[Region],
    motion: &Motion,
    style: &AnnotationStyle,
) -> RgbImage {
    let mut ret = frame.clone();

    for region in regions {
        draw_region(&mut ret, region, style);
    }

    if let Some(centroid) = motion.centroid() {
        let center = (centroid.x as i32, centroid.y as i32);
        draw_ring(&mut ret, center, style);
    }

    ret
}

// Outline from (x, y) to (x + width, y + height) inclusive, thickened about that line.
fn draw_region(canvas: &mut RgbImage, region: &Region, style: &AnnotationStyle) {
    let thickness = style.region_thickness as i32;
    let x = region.x as i32;
    let y = region.y as i32;
    let width = region.width as i32;
    let height = region.height as i32;

    for grow in (-(thickness - 1) / 2)..=(thickness / 2) {
        let w = width + 1 + 2 * grow;
        let h = height + 1 + 2 * grow;
        if w <= 0 || h <= 0 {
            continue;
        }

        let rect = Rect::at(x - grow, y - grow).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, style.region_rgb());
    }
}

fn draw_ring(canvas: &mut RgbImage, center: (i32, i32), style: &AnnotationStyle) {
    let thickness = style.centroid_thickness as i32;
    let radius = style.centroid_radius as i32;

    for r in (radius - (thickness - 1) / 2)..=(radius + thickness / 2) {
        if r < 0 {
            continue;
        }
        draw_hollow_circle_mut(canvas, center, r, style.centroid_rgb());
    }
}
