//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod formats;
pub mod output;
pub mod parse;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use labscan_core::models::OcrConfig;
use labscan_core::source::InputKind;
use labscan_core::{LabscanConfig, LabscanError, OcrBackend, PureOcrEngine};

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("labscan")
        .join("config.json")
}

/// Configuration from `--config`, else the per-user file, else defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<LabscanConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path.display());
        return Ok(LabscanConfig::from_file(path)?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(LabscanConfig::from_file(&default_path)?)
    } else {
        Ok(LabscanConfig::default())
    }
}

/// Whether reading `path` may involve OCR.
pub fn needs_ocr(path: &Path) -> bool {
    InputKind::from_path(path) != Some(InputKind::Text)
}

/// Load the OCR models when they are installed.
///
/// Missing models are not an error here: inputs that do not need OCR still
/// work, and the ones that do fail with a clear "no OCR backend" cause.
pub fn load_ocr_backend(config: &OcrConfig) -> Result<Option<Box<dyn OcrBackend>>, LabscanError> {
    if !config.models_present() {
        warn!(
            "OCR models not found in {}, scanned inputs cannot be read",
            config.model_dir.display()
        );
        return Ok(None);
    }
    let engine = PureOcrEngine::from_config(config)?;
    Ok(Some(Box::new(engine)))
}
