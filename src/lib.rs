pub mod detection;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;

pub use detection::{ExtractedTable, TableParams, TablePipeline};
pub use error::{Axis, TableError};
pub use models::{CellQuad, Contour, Histogram, LineSegment, Point, TableCorners};
pub use pipeline::{DebugConfig, PipelineContext};
