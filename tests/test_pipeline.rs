mod common;

use common::*;
use image::DynamicImage;
use tablesnip::detection::cells;
use tablesnip::{TableParams, TablePipeline};

#[test]
fn bordered_scenario_yields_six_cells() {
    // 1000x600 table: border plus two internal columns and one internal
    // row should give 4 vertical and 3 horizontal gridlines.
    let img = bordered_table(1000, 600, &[333, 667], &[300]);
    let pipeline = TablePipeline::new();

    let grid = pipeline.gridline_stage(&img).unwrap();
    assert_eq!(grid.vertical.len(), 4);
    assert_eq!(grid.horizontal.len(), 3);

    let segmented = cells::segment_cells(
        &grid.horizontal,
        &grid.vertical,
        &img,
        &grid.structural_contours,
        &TableParams::default(),
    )
    .unwrap();
    assert_eq!(segmented.cells.len(), (4 - 1) * (3 - 1));
    assert_eq!(segmented.rows, 2);
    assert_eq!(segmented.columns, 3);
}

#[test]
fn detected_lines_sit_near_the_drawn_gridlines() {
    let img = bordered_table(1000, 600, &[333, 667], &[300]);
    let pipeline = TablePipeline::new();
    let grid = pipeline.gridline_stage(&img).unwrap();

    let xs: Vec<i32> = grid.vertical.iter().map(|l| l.start.x).collect();
    assert_eq!(xs.len(), 4);
    for (x, expected) in xs.iter().zip([0, 333, 667, 997]) {
        assert!(
            (x - expected).abs() <= 8,
            "line at x={} too far from {}",
            x,
            expected
        );
    }
    let ys: Vec<i32> = grid.horizontal.iter().map(|l| l.start.y).collect();
    assert_eq!(ys.len(), 3);
    for (y, expected) in ys.iter().zip([0, 300, 597]) {
        assert!(
            (y - expected).abs() <= 8,
            "line at y={} too far from {}",
            y,
            expected
        );
    }
}

#[test]
fn corners_are_distinct_and_inside_the_image() {
    let img = DynamicImage::ImageRgb8(bordered_table(600, 400, &[300], &[200]));
    let pipeline = TablePipeline::new();
    let unwarped = pipeline.unwarp_stage(&img).unwrap();

    let corners = unwarped.corners.as_array();
    for (i, a) in corners.iter().enumerate() {
        assert!(a.x >= 0 && a.x < 600, "corner {:?} out of bounds", a);
        assert!(a.y >= 0 && a.y < 400, "corner {:?} out of bounds", a);
        for b in &corners[i + 1..] {
            assert_ne!(a, b, "corners must be distinct");
        }
    }
}

#[test]
fn axis_aligned_table_round_trips() {
    // The table border coincides with the image edges, so the inferred
    // corners must be the image corners (within a few pixels of stroke and
    // edge-detection offset) and unwarping must leave the content alone.
    let source = bordered_table(600, 400, &[300], &[200]);
    let img = DynamicImage::ImageRgb8(source.clone());
    let pipeline = TablePipeline::new();
    let unwarped = pipeline.unwarp_stage(&img).unwrap();

    let c = unwarped.corners;
    let tolerance = 10.0;
    assert!(c.top_left.distance_to(tablesnip::Point::new(0, 0)) <= tolerance);
    assert!(c.top_right.distance_to(tablesnip::Point::new(600, 0)) <= tolerance);
    assert!(c.bottom_right.distance_to(tablesnip::Point::new(600, 400)) <= tolerance);
    assert!(c.bottom_left.distance_to(tablesnip::Point::new(0, 400)) <= tolerance);

    // Content check: the near-identity warp keeps the picture essentially
    // unchanged. Gridline pixels may shift by a few pixels, so only the
    // fraction of strongly differing pixels is bounded.
    let changed = source
        .pixels()
        .zip(unwarped.image.pixels())
        .filter(|(p, q)| p.0[0].abs_diff(q.0[0]) > 128)
        .count();
    let fraction = changed as f64 / (600.0 * 400.0);
    assert!(fraction < 0.10, "changed fraction {} too large", fraction);
}

#[test]
fn full_extraction_is_consistent() {
    let img = DynamicImage::ImageRgb8(bordered_table(1000, 600, &[333, 667], &[300]));
    let pipeline = TablePipeline::new();
    let table = pipeline.extract(&img).unwrap();

    assert_eq!(
        table.cells.len(),
        (table.vertical_lines.len() - 1) * (table.horizontal_lines.len() - 1)
    );
    assert_eq!(table.cells.len(), table.quads.len());
    assert_eq!(table.rows * table.columns, table.cells.len());
    assert_eq!(table.unwarped.dimensions(), (1000, 600));
    assert_eq!(table.gridless.dimensions(), (1000, 600));

    // Gridline ink is erased around every structural point, so the
    // gridless image is at least as bright as the unwarped one overall.
    let brightness = |img: &image::RgbImage| -> u64 {
        img.pixels().map(|p| p.0[0] as u64).sum()
    };
    assert!(brightness(&table.gridless) >= brightness(&table.unwarped));
}
