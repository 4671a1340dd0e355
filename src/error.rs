use std::fmt;

use thiserror::Error;

/// Axis a frequency histogram was built along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Failures the pipeline can report for a single input image.
///
/// All variants mean "this input could not be processed" rather than a bug;
/// batch callers are expected to skip the offending image and continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Edge detection found nothing table-sized. Typical for blank pages.
    #[error("no table-scale contours found in the image")]
    NoTableContours,

    /// The contour mask had no outer boundary, or no candidate points were
    /// available for one of the four corners, or the found corners do not
    /// admit a perspective transform. We never substitute the image's own
    /// corners here; that would silently corrupt the output grid.
    #[error("could not locate the table boundary")]
    NoTableBoundary,

    /// The point-frequency histogram along the given axis was flat.
    #[error("no gridline peaks detected along the {axis} axis")]
    NoPeaks { axis: Axis },

    /// Two gridlines were parallel or coincident during intersection. With
    /// perpendicular line sets this cannot happen; seeing it means the caller
    /// passed two lines of the same orientation.
    #[error("gridlines are parallel or coincident; cannot intersect")]
    DegenerateLines,
}
