use std::path::Path;

use image::RgbImage;
pub use ocrs::{ImageSource, OcrEngine}; // Re-export for use in other modules
use ocrs::OcrEngineParams;
use rten::Model;

/// The external text-recognition collaborator.
///
/// The pipeline core never calls this; callers feed it the cropped cell
/// images one at a time, in row-major order. Mapping a cell index to a
/// logical column is the caller's concern.
pub trait CellRecognizer {
    fn recognize(&self, cell: &RgbImage) -> anyhow::Result<String>;
}

/// Initialize OCR engine with models from standard cache location.
pub fn init_ocr_engine() -> anyhow::Result<OcrEngine> {
    let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;

    let cache_dir = Path::new(&home_dir).join(".cache/ocrs");
    let detection_model_path = cache_dir.join("text-detection.rten");
    let recognition_model_path = cache_dir.join("text-recognition.rten");

    if !detection_model_path.exists() || !recognition_model_path.exists() {
        anyhow::bail!(
            "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
             Expected locations:\n  - {}\n  - {}",
            detection_model_path.display(),
            recognition_model_path.display()
        );
    }

    let detection_model = Model::load_file(&detection_model_path)?;
    let recognition_model = Model::load_file(&recognition_model_path)?;

    let engine = OcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })?;

    Ok(engine)
}

/// Cell recognizer backed by the `ocrs` engine.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            engine: init_ocr_engine()?,
        })
    }
}

impl CellRecognizer for OcrsRecognizer {
    fn recognize(&self, cell: &RgbImage) -> anyhow::Result<String> {
        // Degenerate cells come through as empty crops; there is nothing
        // to read in them.
        if cell.width() == 0 || cell.height() == 0 {
            return Ok(String::new());
        }
        let source = ImageSource::from_bytes(cell.as_raw(), cell.dimensions())?;
        let input = self.engine.prepare_input(source)?;
        let text = self.engine.get_text(&input)?;
        Ok(text.trim().to_string())
    }
}
