use image::{ImageBuffer, Pixel, Rgb, RgbImage};

use crate::detection::preprocessing;
use crate::detection::TableParams;
use crate::models::{Contour, Point};

/// Color used for contour overlays in debug images.
const OVERLAY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Contours that plausibly belong to table structure, plus the two overlay
/// images kept for debugging and analysis.
pub struct LargeContours {
    /// Contours sorted by bounding-box area, descending.
    pub contours: Vec<Contour>,
    pub with_large_contours: RgbImage,
    pub with_all_contours: RgbImage,
}

/// Returns just the contours with larger bounding-box area from the image.
///
/// Small-area contours are assumed to be words and letters rather than cell
/// or table structure, so everything below `min_contour_area_ratio` of the
/// image area is cut off. The contours are sorted descending first, which
/// makes the cutoff a prefix, not a scan of the full set.
pub fn extract_large_contours(image: &RgbImage, params: &TableParams) -> LargeContours {
    let image_area = (image.width() as i64 * image.height() as i64) as f64;

    let gray = preprocessing::to_grayscale(image);
    let edged = preprocessing::detect_edges(&gray, params.canny_low, params.canny_high);

    let mut all: Vec<Contour> = imageproc::contours::find_contours::<i32>(&edged)
        .into_iter()
        .filter_map(from_traced)
        .collect();

    let mut with_all_contours = image.clone();
    stamp_contours(&mut with_all_contours, &all, OVERLAY_COLOR, params.contour_stroke);

    all.sort_by(|a, b| b.bounding_area().cmp(&a.bounding_area()));

    let mut large = Vec::new();
    for contour in all {
        if contour.bounding_area() as f64 / image_area < params.min_contour_area_ratio {
            break;
        }
        large.push(contour);
    }

    let mut with_large_contours = image.clone();
    stamp_contours(&mut with_large_contours, &large, OVERLAY_COLOR, params.contour_stroke);

    LargeContours {
        contours: large,
        with_large_contours,
        with_all_contours,
    }
}

/// Convert a traced `imageproc` contour into the crate's representation.
pub fn from_traced(traced: imageproc::contours::Contour<i32>) -> Option<Contour> {
    Contour::from_points(
        traced
            .points
            .into_iter()
            .map(|p| Point::new(p.x, p.y))
            .collect(),
    )
}

/// Paint every contour point as a `stroke`-sized square, clamped at the
/// image bounds. Boundary points traced from an edge map are dense, so this
/// reproduces a thick contour stroke.
pub fn stamp_contours<P: Pixel>(
    image: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    contours: &[Contour],
    color: P,
    stroke: i32,
) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let reach = stroke / 2;
    for contour in contours {
        for point in &contour.points {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let (x, y) = (point.x + dx, point.y + dy);
                    if x >= 0 && x < w && y >= 0 && y < h {
                        image.put_pixel(x as u32, y as u32, color);
                    }
                }
            }
        }
    }
}
