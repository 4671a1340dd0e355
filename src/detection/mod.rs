pub mod cells;
pub mod contours;
pub mod gridlines;
pub mod ocr;
pub mod peaks;
pub mod preprocessing;
pub mod unwarp;

use std::path::PathBuf;

use image::{DynamicImage, RgbImage};

use crate::error::TableError;
use crate::models::{CellQuad, LineSegment, TableCorners};
use crate::pipeline::{DebugConfig, PipelineContext};

/// Tuning knobs for all pipeline stages.
///
/// The defaults are tuned empirically against scanned exchange-rate style
/// tables; they travel together because later stages assume the texture the
/// earlier stages produce.
#[derive(Debug, Clone, Copy)]
pub struct TableParams {
    /// Bounding-box area, as a fraction of image area, below which a
    /// contour is considered text rather than table structure.
    pub min_contour_area_ratio: f64,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Bilateral smoothing window and sigmas.
    pub bilateral_window: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Stroke width used when stamping contours onto masks and overlays.
    pub contour_stroke: i32,
    /// Starting prominence ratio for peak admission.
    pub min_prominence_ratio: f64,
    /// How much the ratio drops on each vertical-line retry.
    pub prominence_ratio_step: f64,
    /// Column search keeps retrying until this many vertical lines exist
    /// (or the ratio floor is reached).
    pub min_vertical_lines: usize,
    /// Distance from the image edge beyond which a border gridline is
    /// assumed missing and synthesized.
    pub edge_line_margin: i32,
    /// Half-width of the square window whitened around gridline pixels.
    pub whiten_radius: i32,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            min_contour_area_ratio: 0.00086,
            canny_low: 30.0,
            canny_high: 180.0,
            bilateral_window: 13,
            bilateral_sigma_color: 20.0,
            bilateral_sigma_space: 20.0,
            contour_stroke: 3,
            min_prominence_ratio: 0.25,
            prominence_ratio_step: 0.01,
            min_vertical_lines: 7,
            edge_line_margin: 20,
            whiten_radius: 3,
        }
    }
}

/// Everything the pipeline recovered from one table image.
#[derive(Debug)]
pub struct ExtractedTable {
    /// Cropped cell images in row-major order.
    pub cells: Vec<RgbImage>,
    /// Cell geometry matching `cells`, index for index.
    pub quads: Vec<CellQuad>,
    /// The unwarped table with gridline ink whitened out.
    pub gridless: RgbImage,
    /// The perspective-corrected table image.
    pub unwarped: RgbImage,
    /// Table corners in original image coordinates.
    pub corners: TableCorners,
    pub vertical_lines: Vec<LineSegment>,
    pub horizontal_lines: Vec<LineSegment>,
    pub rows: usize,
    pub columns: usize,
}

/// Main extraction pipeline orchestrator.
///
/// Runs unwarping, gridline detection and cell segmentation in strict
/// order on a single image. Instances are independent; processing several
/// documents in parallel just means one pipeline value per thread.
pub struct TablePipeline {
    pub params: TableParams,
    context: PipelineContext,
}

impl TablePipeline {
    pub fn new() -> Self {
        Self {
            params: TableParams::default(),
            context: PipelineContext::default(),
        }
    }

    pub fn with_params(mut self, params: TableParams) -> Self {
        self.params = params;
        self
    }

    /// Enable verbose progress output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Persist every stage's intermediate images under `output_dir`.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.context.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    /// Run the full pipeline on one document image.
    ///
    /// Failures are `TableError` values wrapped in `anyhow`; batch callers
    /// can downcast to decide whether to skip the input and continue.
    pub fn extract(&self, image: &DynamicImage) -> anyhow::Result<ExtractedTable> {
        let rgb = image.to_rgb8();
        let ctx = &self.context;

        ctx.save_rgb(0, "input", "base", &rgb)?;
        if ctx.verbose {
            println!("Unwarping table ({}x{})...", rgb.width(), rgb.height());
        }

        let unwarped = unwarp::unwarp(&rgb, &self.params)?;
        ctx.save_rgb(1, "unwarp", "unwarped", &unwarped.image)?;
        ctx.save_rgb(1, "unwarp", "all_contours", &unwarped.with_all_contours)?;
        ctx.save_rgb(1, "unwarp", "large_contours", &unwarped.with_large_contours)?;
        ctx.save_gray(1, "unwarp", "contour_mask", &unwarped.contour_mask)?;
        ctx.save_rgb(1, "unwarp", "outer_contours", &unwarped.with_outer_contours)?;
        ctx.save_rgb(1, "unwarp", "table_corners", &unwarped.with_corner_markers)?;
        if ctx.verbose {
            let c = unwarped.corners;
            println!(
                "Table corners: ({},{}) ({},{}) ({},{}) ({},{})",
                c.top_left.x,
                c.top_left.y,
                c.top_right.x,
                c.top_right.y,
                c.bottom_right.x,
                c.bottom_right.y,
                c.bottom_left.x,
                c.bottom_left.y
            );
            println!("Detecting gridlines...");
        }

        let grid = gridlines::detect_gridlines(&unwarped.image, &self.params)?;
        ctx.save_rgb(2, "gridlines", "all_contours", &grid.with_all_contours)?;
        ctx.save_rgb(2, "gridlines", "large_contours", &grid.with_large_contours)?;
        ctx.save_rgb(2, "gridlines", "columns_histogram", &grid.x_histogram.render())?;
        ctx.save_rgb(2, "gridlines", "rows_histogram", &grid.y_histogram.render())?;
        ctx.save_rgb(2, "gridlines", "final_grid", &grid.with_grid)?;
        if ctx.verbose {
            println!(
                "Found {} vertical and {} horizontal lines",
                grid.vertical.len(),
                grid.horizontal.len()
            );
            println!("Segmenting cells...");
        }

        let segmented = cells::segment_cells(
            &grid.horizontal,
            &grid.vertical,
            &unwarped.image,
            &grid.structural_contours,
            &self.params,
        )?;
        ctx.save_rgb(3, "cells", "gridless", &segmented.gridless)?;
        for (i, cell) in segmented.cells.iter().enumerate() {
            if cell.width() > 0 && cell.height() > 0 {
                ctx.save_rgb(3, "cells", &format!("cell_{:03}", i), cell)?;
            }
        }
        if ctx.verbose {
            println!(
                "Segmented {} rows x {} columns = {} cells",
                segmented.rows,
                segmented.columns,
                segmented.cells.len()
            );
        }

        Ok(ExtractedTable {
            cells: segmented.cells,
            quads: segmented.quads,
            gridless: segmented.gridless,
            unwarped: unwarped.image,
            corners: unwarped.corners,
            vertical_lines: grid.vertical,
            horizontal_lines: grid.horizontal,
            rows: segmented.rows,
            columns: segmented.columns,
        })
    }

    /// Run only the contour extractor (for debugging).
    pub fn large_contours(&self, image: &DynamicImage) -> contours::LargeContours {
        contours::extract_large_contours(&image.to_rgb8(), &self.params)
    }

    /// Run only the unwarping stage (for debugging).
    pub fn unwarp_stage(&self, image: &DynamicImage) -> Result<unwarp::Unwarped, TableError> {
        unwarp::unwarp(&image.to_rgb8(), &self.params)
    }

    /// Run only gridline detection on an already unwarped image (for
    /// debugging).
    pub fn gridline_stage(
        &self,
        unwarped: &RgbImage,
    ) -> Result<gridlines::Gridlines, TableError> {
        gridlines::detect_gridlines(unwarped, &self.params)
    }
}

impl Default for TablePipeline {
    fn default() -> Self {
        Self::new()
    }
}
