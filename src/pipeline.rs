use std::path::PathBuf;

use anyhow::Result;
use image::{GrayImage, RgbImage};

/// Debug configuration for pipeline execution.
///
/// When enabled, every stage writes its intermediate images under
/// `output_dir/NN_stage/`. These artifacts are write-only; nothing in the
/// pipeline reads them back.
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs.
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled.
    pub enabled: bool,
}

impl DebugConfig {
    /// Create a debug config rooted at `output_dir`. The directory must be
    /// empty or non-existent.
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        Ok(Self {
            output_dir,
            enabled: true,
        })
    }
}

/// Context available to all pipeline stages.
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Save a color debug image into the numbered stage directory.
    pub fn save_rgb(&self, stage: usize, stage_name: &str, name: &str, image: &RgbImage) -> Result<()> {
        if let Some(path) = self.artifact_path(stage, stage_name, name)? {
            image
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
            if self.verbose {
                println!("  Debug: saved {}", path.display());
            }
        }
        Ok(())
    }

    /// Save a single-channel debug image into the numbered stage directory.
    pub fn save_gray(&self, stage: usize, stage_name: &str, name: &str, image: &GrayImage) -> Result<()> {
        if let Some(path) = self.artifact_path(stage, stage_name, name)? {
            image
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
            if self.verbose {
                println!("  Debug: saved {}", path.display());
            }
        }
        Ok(())
    }

    /// Path for one artifact, creating the stage directory on first use.
    /// `None` when debug mode is off.
    fn artifact_path(&self, stage: usize, stage_name: &str, name: &str) -> Result<Option<PathBuf>> {
        let Some(debug_config) = &self.debug else {
            return Ok(None);
        };
        if !debug_config.enabled {
            return Ok(None);
        }
        let step_dir_name = format!("{:02}_{}", stage, stage_name);
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;
        Ok(Some(step_dir.join(format!("{}.png", name))))
    }
}
