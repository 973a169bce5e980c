//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LabscanError, Result};

/// Main configuration for the labscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabscanConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run the tabular fallback when the primary pass finds fewer fields than this.
    pub fallback_min_fields: usize,

    /// Number of lines after a label line searched for its value.
    pub fallback_window: usize,

    /// Allow the tabular fallback at all.
    pub enable_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_min_fields: 5,
            fallback_window: 2,
            enable_fallback: true,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Luma threshold for page binarization; `None` keeps grayscale.
    pub binarize_threshold: Option<u8>,

    /// Keep `[UNK]` markers emitted by the recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            binarize_threshold: Some(160),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Full paths of the detection model, recognition model and dictionary.
    pub fn model_paths(&self) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.model_dir.join(&self.detection_model),
            self.model_dir.join(&self.recognition_model),
            self.model_dir.join(&self.dictionary),
        )
    }

    /// Whether all model files are present on disk.
    pub fn models_present(&self) -> bool {
        let (det, rec, dict) = self.model_paths();
        det.exists() && rec.exists() && dict.exists()
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use embedded text before falling back to OCR of page images.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to skip OCR.
    pub min_text_length: usize,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

impl LabscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| LabscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LabscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LabscanConfig =
            serde_json::from_str(r#"{"extraction": {"fallback_min_fields": 3}}"#).unwrap();

        assert_eq!(config.extraction.fallback_min_fields, 3);
        assert_eq!(config.extraction.fallback_window, 2);
        assert!(config.extraction.enable_fallback);
        assert_eq!(config.ocr.binarize_threshold, Some(160));
        assert_eq!(config.pdf.min_text_length, 50);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = LabscanConfig::default();
        config.ocr.binarize_threshold = None;
        config.save(&path).unwrap();

        let loaded = LabscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.binarize_threshold, None);
        assert_eq!(loaded.ocr.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LabscanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, LabscanError::Config(_)));
        assert!(err.to_string().starts_with("configuration error: "));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_wrong_value_type_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"fallback_window": "two"}}"#).unwrap();

        assert!(matches!(
            LabscanConfig::from_file(&path),
            Err(LabscanError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabscanConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LabscanError::Io(_)));
    }
}
