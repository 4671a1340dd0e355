use image::{Rgb, RgbImage};

use crate::detection::TableParams;
use crate::error::TableError;
use crate::models::{CellQuad, Contour, LineSegment, Point};

/// Output of the segmentation stage: one cropped image per cell in
/// left-to-right, top-to-bottom order, plus the gridline-erased table
/// image the crops were taken from.
#[derive(Debug)]
pub struct SegmentedCells {
    pub cells: Vec<RgbImage>,
    pub quads: Vec<CellQuad>,
    pub gridless: RgbImage,
    /// Cell rows, one fewer than the horizontal line count.
    pub rows: usize,
    /// Cell columns, one fewer than the vertical line count.
    pub columns: usize,
}

/// Cut the unwarped table into per-cell images.
///
/// Gridline intersections form a row-major point grid; every four adjacent
/// points bound one cell. Before cropping, gridline ink is whitened out so
/// stray line fragments inside a crop cannot confuse OCR.
pub fn segment_cells(
    horizontal_lines: &[LineSegment],
    vertical_lines: &[LineSegment],
    unwarped: &RgbImage,
    structural_contours: &[Contour],
    params: &TableParams,
) -> Result<SegmentedCells, TableError> {
    let grid = intersection_grid(horizontal_lines, vertical_lines)?;
    let quads = cell_quads(&grid);
    let gridless = remove_gridlines(unwarped, structural_contours, params.whiten_radius);
    let cells = quads.iter().map(|q| crop_cell(&gridless, q)).collect();

    Ok(SegmentedCells {
        cells,
        quads,
        gridless,
        rows: horizontal_lines.len().saturating_sub(1),
        columns: vertical_lines.len().saturating_sub(1),
    })
}

/// Intersect every horizontal line with every vertical line, row-major.
fn intersection_grid(
    horizontal_lines: &[LineSegment],
    vertical_lines: &[LineSegment],
) -> Result<Vec<Vec<Point>>, TableError> {
    horizontal_lines
        .iter()
        .map(|row| {
            vertical_lines
                .iter()
                .map(|col| row.intersection(col).ok_or(TableError::DegenerateLines))
                .collect()
        })
        .collect()
}

/// Form one quadrilateral per cell from adjacent intersection points.
fn cell_quads(grid: &[Vec<Point>]) -> Vec<CellQuad> {
    let mut quads = Vec::new();
    for rows in grid.windows(2) {
        let (this_row, next_row) = (&rows[0], &rows[1]);
        for j in 0..this_row.len().saturating_sub(1) {
            quads.push(CellQuad {
                top_left: this_row[j],
                top_right: this_row[j + 1],
                bottom_right: next_row[j + 1],
                bottom_left: next_row[j],
            });
        }
    }
    quads
}

/// Whiten a square neighbourhood around every structural contour point,
/// erasing gridline ink. The window is clamped at the image bounds.
fn remove_gridlines(
    unwarped: &RgbImage,
    structural_contours: &[Contour],
    whiten_radius: i32,
) -> RgbImage {
    let mut gridless = unwarped.clone();
    let (w, h) = (gridless.width() as i32, gridless.height() as i32);
    for contour in structural_contours {
        for point in &contour.points {
            for y in point.y - whiten_radius..=point.y + whiten_radius {
                for x in point.x - whiten_radius..=point.x + whiten_radius {
                    if x >= 0 && x < w && y >= 0 && y < h {
                        gridless.put_pixel(x as u32, y as u32, Rgb([255, 255, 255]));
                    }
                }
            }
        }
    }
    gridless
}

/// Crop the cell's bounding rectangle: rows from the top-left and
/// bottom-right y, columns from the top-left and top-right x. A degenerate
/// quadrilateral yields an empty image rather than an error.
fn crop_cell(gridless: &RgbImage, quad: &CellQuad) -> RgbImage {
    let (w, h) = (gridless.width() as i32, gridless.height() as i32);
    let x0 = quad.top_left.x.clamp(0, w);
    let x1 = quad.top_right.x.clamp(0, w);
    let y0 = quad.top_left.y.clamp(0, h);
    let y1 = quad.bottom_right.y.clamp(0, h);

    if x1 <= x0 || y1 <= y0 {
        return RgbImage::new(0, 0);
    }
    image::imageops::crop_imm(
        gridless,
        x0 as u32,
        y0 as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    )
    .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_lines(xs: &[i32], ys: &[i32], w: i32, h: i32) -> (Vec<LineSegment>, Vec<LineSegment>) {
        let vertical = xs.iter().map(|&x| LineSegment::vertical(x, h)).collect();
        let horizontal = ys.iter().map(|&y| LineSegment::horizontal(y, w)).collect();
        (vertical, horizontal)
    }

    #[test]
    fn cell_count_is_lines_minus_one_squared() {
        let (vertical, horizontal) = grid_lines(&[0, 40, 80, 120], &[0, 30, 60], 120, 60);
        let img = RgbImage::from_pixel(120, 60, Rgb([255, 255, 255]));
        let result = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        assert_eq!(result.cells.len(), (4 - 1) * (3 - 1));
        assert_eq!(result.rows, 2);
        assert_eq!(result.columns, 3);
    }

    #[test]
    fn cells_enumerate_row_major() {
        let (vertical, horizontal) = grid_lines(&[0, 40, 80], &[0, 30, 60], 80, 60);
        let img = RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]));
        let result = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        let expected_top_lefts = [
            Point::new(0, 0),
            Point::new(40, 0),
            Point::new(0, 30),
            Point::new(40, 30),
        ];
        let top_lefts: Vec<Point> = result.quads.iter().map(|q| q.top_left).collect();
        assert_eq!(top_lefts, expected_top_lefts);
    }

    #[test]
    fn adjacent_cells_share_edges() {
        let (vertical, horizontal) = grid_lines(&[0, 40, 80], &[0, 30, 60], 80, 60);
        let img = RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]));
        let result = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        // Cell 0 and cell 1 sit side by side in row 0.
        assert_eq!(result.quads[0].top_right, result.quads[1].top_left);
        assert_eq!(result.quads[0].bottom_right, result.quads[1].bottom_left);
        // Cell 0 and cell 2 stack vertically.
        assert_eq!(result.quads[0].bottom_left, result.quads[2].top_left);
        assert_eq!(result.quads[0].bottom_right, result.quads[2].top_right);
    }

    #[test]
    fn segmentation_is_idempotent() {
        let (vertical, horizontal) = grid_lines(&[0, 33, 71, 80], &[0, 28, 60], 80, 60);
        let img = RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]));
        let first = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        let second = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        assert_eq!(first.quads, second.quads);
    }

    #[test]
    fn parallel_line_sets_are_rejected() {
        let (vertical, _) = grid_lines(&[0, 40], &[], 80, 60);
        let img = RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]));
        // Passing vertical lines on both sides makes every pair parallel.
        let err = segment_cells(&vertical.clone(), &vertical, &img, &[], &TableParams::default())
            .unwrap_err();
        assert_eq!(err, TableError::DegenerateLines);
    }

    #[test]
    fn degenerate_cells_crop_to_empty_images() {
        // Two coincident vertical positions give zero-width cells.
        let (vertical, horizontal) = grid_lines(&[10, 10, 50], &[0, 30], 80, 60);
        let img = RgbImage::from_pixel(80, 60, Rgb([255, 255, 255]));
        let result = segment_cells(&horizontal, &vertical, &img, &[], &TableParams::default())
            .unwrap();
        assert_eq!(result.cells.len(), 2);
        assert_eq!(result.cells[0].dimensions(), (0, 0));
        assert_eq!(result.cells[1].dimensions(), (40, 30));
    }

    #[test]
    fn gridline_ink_is_whitened() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        for y in 0..40 {
            img.put_pixel(20, y, Rgb([0, 0, 0]));
        }
        let line = Contour::from_points((0..40).map(|y| Point::new(20, y)).collect()).unwrap();
        let gridless = remove_gridlines(&img, &[line], 3);
        for p in gridless.pixels() {
            assert_eq!(p.0, [255, 255, 255]);
        }
    }

    #[test]
    fn whitening_clamps_at_image_bounds() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let corner = Contour::from_points(vec![Point::new(0, 0)]).unwrap();
        let gridless = remove_gridlines(&img, &[corner], 3);
        assert_eq!(gridless.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(gridless.get_pixel(3, 3).0, [255, 255, 255]);
        assert_eq!(gridless.get_pixel(4, 4).0, [0, 0, 0]);
    }
}
