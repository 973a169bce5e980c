//! OCR backend using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::OcrConfig;

use super::{assemble_lines, preprocess_page, OcrBackend, Result, TextBox};

/// Detection plus recognition models loaded from the configured directory.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    binarize_threshold: Option<u8>,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Load the models named in `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let (det_path, rec_path, dict_path) = config.model_paths();

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded OCR models from {}", config.model_dir.display());

        Ok(Self {
            engine,
            binarize_threshold: config.binarize_threshold,
            keep_unk: config.keep_unk,
        })
    }
}

impl OcrBackend for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        let page = preprocess_page(image, self.binarize_threshold);

        let results = self
            .engine
            .run_from_image(&page)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                bounding_box(&r.bounding_box, text)
            })
            .collect();
        let text = assemble_lines(boxes);

        info!(
            "OCR of {}x{} page done in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// Axis-aligned box around a detected polygon.
fn bounding_box(polygon: &pure_onnx_ocr::Polygon<f64>, text: String) -> TextBox {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let mut max_y = f64::NEG_INFINITY;
    for coord in polygon.exterior().coords() {
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
        max_y = max_y.max(coord.y);
    }

    if !min_x.is_finite() {
        return TextBox {
            text,
            x: 0.0,
            y: 0.0,
            height: 0.0,
        };
    }

    TextBox {
        text,
        x: min_x as f32,
        y: min_y as f32,
        height: (max_y - min_y) as f32,
    }
}
