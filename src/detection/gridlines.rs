use std::collections::HashSet;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::detection::contours::{self, LargeContours};
use crate::detection::peaks::{self, FindPeaksParams};
use crate::detection::TableParams;
use crate::error::{Axis, TableError};
use crate::models::{Contour, Histogram, LineSegment, Point};

/// Which kind of gridline a histogram pass is searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Detected gridlines plus the intermediate signals and overlays.
///
/// The structural contours are the large contours of the unwarped image;
/// the cell segmenter consumes them to erase gridline ink.
#[derive(Debug)]
pub struct Gridlines {
    /// Vertical lines (column boundaries), ascending by x.
    pub vertical: Vec<LineSegment>,
    /// Horizontal lines (row boundaries), ascending by y.
    pub horizontal: Vec<LineSegment>,
    pub x_histogram: Histogram,
    pub y_histogram: Histogram,
    pub structural_contours: Vec<Contour>,
    pub with_large_contours: RgbImage,
    pub with_all_contours: RgbImage,
    pub with_grid: RgbImage,
}

/// Identify the row and column gridlines of an unwarped table image.
///
/// The x and y frequencies of the points comprising the large contours form
/// two histograms; gridlines appear there as prominent peaks. Column search
/// retries with a lowered prominence threshold until enough vertical lines
/// are admitted, because tables with many narrow columns produce individually
/// weak peaks.
pub fn detect_gridlines(
    unwarped: &RgbImage,
    params: &TableParams,
) -> Result<Gridlines, TableError> {
    let (width, height) = unwarped.dimensions();

    let LargeContours {
        contours: structural_contours,
        with_large_contours,
        with_all_contours,
    } = contours::extract_large_contours(unwarped, params);

    let (x_histogram, y_histogram) = point_histograms(&structural_contours);

    let vertical = vertical_lines_with_retry(&x_histogram, width, height, params)?;
    let horizontal = lines_from_histogram(
        &y_histogram,
        width,
        height,
        Orientation::Horizontal,
        params.min_prominence_ratio,
        params,
    )?;

    let mut with_grid = unwarped.clone();
    for line in horizontal.iter().chain(vertical.iter()) {
        draw_thick_line(&mut with_grid, line, Rgb([255, 0, 0]));
    }

    Ok(Gridlines {
        vertical,
        horizontal,
        x_histogram,
        y_histogram,
        structural_contours,
        with_large_contours,
        with_all_contours,
        with_grid,
    })
}

/// Count unique contour points per x and per y coordinate. Points shared by
/// several contours are counted once.
fn point_histograms(contours: &[Contour]) -> (Histogram, Histogram) {
    let mut seen: HashSet<Point> = HashSet::new();
    let mut x_histogram = Histogram::default();
    let mut y_histogram = Histogram::default();

    for contour in contours {
        for &point in &contour.points {
            if !seen.insert(point) {
                continue;
            }
            x_histogram.record(point.x as usize);
            y_histogram.record(point.y as usize);
        }
    }
    (x_histogram, y_histogram)
}

/// Column search with adaptive threshold lowering.
///
/// Each retry lowers the prominence ratio by one step, which admits a
/// superset of the previous pass's peaks. The loop is a bounded fixed-point
/// search: once the ratio reaches zero every detected peak is already
/// admitted and lowering further cannot change the outcome, so the pass
/// returns what it has even when fewer than `min_vertical_lines` exist.
pub(crate) fn vertical_lines_with_retry(
    x_histogram: &Histogram,
    width: u32,
    height: u32,
    params: &TableParams,
) -> Result<Vec<LineSegment>, TableError> {
    let mut ratio = params.min_prominence_ratio;
    loop {
        let lines = lines_from_histogram(
            x_histogram,
            width,
            height,
            Orientation::Vertical,
            ratio,
            params,
        )?;
        if lines.len() >= params.min_vertical_lines || ratio <= 0.0 {
            return Ok(lines);
        }
        ratio -= params.prominence_ratio_step;
    }
}

/// Turn histogram peaks into full-span line segments.
///
/// Peaks are ranked by prominence and admitted while they stay above
/// `ratio` times the strongest prominence; the strongest peak is always
/// kept. Each admitted peak becomes a segment between its interpolated
/// left/right bounds, which captures slightly tilted gridlines. Border
/// lines missing near the image edges are synthesized, since table borders
/// are often too faint to detect.
pub(crate) fn lines_from_histogram(
    histogram: &Histogram,
    width: u32,
    height: u32,
    orientation: Orientation,
    ratio: f64,
    params: &TableParams,
) -> Result<Vec<LineSegment>, TableError> {
    let (primary_limit, min_distance, axis) = match orientation {
        Orientation::Vertical => (height as i32, height as f64 * (50.0 / 3000.0), Axis::X),
        Orientation::Horizontal => (width as i32, width as f64 * (30.0 / 2000.0), Axis::Y),
    };

    let mut found = peaks::find_peaks(
        &histogram.counts,
        &FindPeaksParams {
            min_distance: (min_distance as usize).max(1),
            ..FindPeaksParams::default()
        },
    );
    if found.is_empty() {
        return Err(TableError::NoPeaks { axis });
    }

    found.sort_by(|a, b| {
        b.prominence
            .partial_cmp(&a.prominence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let max_prominence = found[0].prominence;

    let mut lines = Vec::new();
    for peak in &found {
        if peak.prominence < max_prominence * ratio {
            break;
        }
        let left = peak.left_ips.round() as i32;
        let right = peak.right_ips.round() as i32;
        lines.push(match orientation {
            Orientation::Vertical => {
                LineSegment::new(Point::new(left, 0), Point::new(right, primary_limit))
            }
            Orientation::Horizontal => {
                LineSegment::new(Point::new(0, left), Point::new(primary_limit, right))
            }
        });
    }

    let margin = params.edge_line_margin;
    match orientation {
        Orientation::Vertical => {
            lines.sort_by_key(|line| line.start.x);
            if lines[0].start.x > margin {
                lines.insert(0, LineSegment::vertical(0, height as i32));
            }
            if width as i32 - lines[lines.len() - 1].start.x > margin {
                lines.push(LineSegment::vertical(width as i32, height as i32));
            }
        }
        Orientation::Horizontal => {
            lines.sort_by_key(|line| line.start.y);
            if lines[0].start.y > margin {
                lines.insert(0, LineSegment::horizontal(0, width as i32));
            }
            if height as i32 - lines[lines.len() - 1].start.y > margin {
                lines.push(LineSegment::horizontal(height as i32, width as i32));
            }
        }
    }

    Ok(lines)
}

/// Draw a line with a 3 pixel stroke by offsetting the 1 pixel segment on
/// both axes.
fn draw_thick_line(image: &mut RgbImage, line: &LineSegment, color: Rgb<u8>) {
    let (x0, y0) = (line.start.x as f32, line.start.y as f32);
    let (x1, y1) = (line.end.x as f32, line.end.y as f32);
    for d in -1..=1i32 {
        let d = d as f32;
        draw_line_segment_mut(image, (x0 + d, y0), (x1 + d, y1), color);
        draw_line_segment_mut(image, (x0, y0 + d), (x1, y1 + d), color);
    }
}
