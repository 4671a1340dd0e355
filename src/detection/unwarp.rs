use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::BorderType;
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::geometric_transformations::{warp, Interpolation, Projection};

use crate::detection::contours::{self, LargeContours};
use crate::detection::preprocessing;
use crate::detection::TableParams;
use crate::error::TableError;
use crate::models::{Contour, Point, TableCorners};

/// Result of the unwarping stage: the perspective-corrected table image,
/// the inferred corners, and the intermediate images kept for debugging
/// and analysis.
#[derive(Debug)]
pub struct Unwarped {
    /// The bilateral-filtered source, warped so the table corners land on
    /// the image corners.
    pub image: RgbImage,
    /// Table corners in the coordinates of the original image.
    pub corners: TableCorners,
    pub with_all_contours: RgbImage,
    pub with_large_contours: RgbImage,
    pub contour_mask: GrayImage,
    pub with_outer_contours: RgbImage,
    pub with_corner_markers: RgbImage,
}

/// Correct the perspective of a scanned or photographed table.
///
/// The source is smoothed with an edge-preserving filter, the table's outer
/// boundary is recovered from the large contours, and the four boundary
/// points closest to the image corners are taken as the table corners. The
/// filtered image is then warped so those corners become the image corners;
/// downstream OCR benefits from the same noise reduction.
pub fn unwarp(image: &RgbImage, params: &TableParams) -> Result<Unwarped, TableError> {
    let (width, height) = image.dimensions();

    let filtered = preprocessing::bilateral_filter(
        image,
        params.bilateral_window,
        params.bilateral_sigma_color,
        params.bilateral_sigma_space,
    );

    let LargeContours {
        contours: large_contours,
        with_large_contours,
        with_all_contours,
    } = contours::extract_large_contours(&filtered, params);
    if large_contours.is_empty() {
        return Err(TableError::NoTableContours);
    }

    // Mask of the points comprising the large contours; tracing it again
    // keeps only the boundaries not nested inside another.
    let mut contour_mask = GrayImage::new(width, height);
    contours::stamp_contours(
        &mut contour_mask,
        &large_contours,
        Luma([255u8]),
        params.contour_stroke,
    );

    let outer_contours: Vec<Contour> = imageproc::contours::find_contours::<i32>(&contour_mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(contours::from_traced)
        .collect();
    if outer_contours.is_empty() {
        return Err(TableError::NoTableBoundary);
    }

    let mut with_outer_contours = image.clone();
    contours::stamp_contours(
        &mut with_outer_contours,
        &outer_contours,
        Rgb([255, 0, 0]),
        params.contour_stroke,
    );

    let corners =
        find_table_corners(&outer_contours, width, height).ok_or(TableError::NoTableBoundary)?;

    // Source points in top-left, top-right, bottom-left, bottom-right
    // order, paired with the same rectangle corners. This row-major pairing
    // is load-bearing; reordering it flips the output orientation.
    let src = [
        (corners.top_left.x as f32, corners.top_left.y as f32),
        (corners.top_right.x as f32, corners.top_right.y as f32),
        (corners.bottom_left.x as f32, corners.bottom_left.y as f32),
        (corners.bottom_right.x as f32, corners.bottom_right.y as f32),
    ];
    let dst = [
        (0.0, 0.0),
        (width as f32, 0.0),
        (0.0, height as f32),
        (width as f32, height as f32),
    ];
    let projection =
        Projection::from_control_points(src, dst).ok_or(TableError::NoTableBoundary)?;
    let unwarped = warp(
        &filtered,
        &projection,
        Interpolation::Bilinear,
        Rgb([255, 255, 255]),
    );

    let mut with_corner_markers = unwarped.clone();
    for corner in corners.as_array() {
        draw_filled_circle_mut(
            &mut with_corner_markers,
            (corner.x, corner.y),
            5,
            Rgb([255, 0, 0]),
        );
    }

    Ok(Unwarped {
        image: unwarped,
        corners,
        with_all_contours,
        with_large_contours,
        contour_mask,
        with_outer_contours,
        with_corner_markers,
    })
}

/// Use the outer contour points to infer the four corners of the table.
///
/// Each table corner is the contour point with minimum Euclidean distance
/// to the corresponding image corner; the first point reaching the minimum
/// wins, in contour-then-point iteration order.
fn find_table_corners(
    outer_contours: &[Contour],
    width: u32,
    height: u32,
) -> Option<TableCorners> {
    let targets = [
        Point::new(0, 0),
        Point::new(width as i32, 0),
        Point::new(width as i32, height as i32),
        Point::new(0, height as i32),
    ];
    let mut best: [Option<Point>; 4] = [None; 4];
    let mut best_dist = [f64::INFINITY; 4];

    for contour in outer_contours {
        for &point in &contour.points {
            for (i, &target) in targets.iter().enumerate() {
                let dist = point.distance_to(target);
                if dist < best_dist[i] {
                    best_dist[i] = dist;
                    best[i] = Some(point);
                }
            }
        }
    }

    Some(TableCorners {
        top_left: best[0]?,
        top_right: best[1]?,
        bottom_right: best[2]?,
        bottom_left: best[3]?,
    })
}
