//! Turning input files into document text.
//!
//! Text files are read as-is, PDFs contribute their embedded text when it
//! is substantial, and everything scanned goes through OCR.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, LabscanError, OcrError, PdfError, Result};
use crate::extraction::{Diagnostic, DiagnosticSink};
use crate::models::{Document, PdfConfig};
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfKind};

/// Page separator in plain-text inputs.
pub const FORM_FEED: char = '\u{c}';

/// Kind of input file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Pdf,
    Image,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(InputKind::Text),
            "pdf" => Some(InputKind::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" => Some(InputKind::Image),
            _ => None,
        }
    }
}

/// Loads documents, running OCR when needed.
pub struct DocumentLoader<'a> {
    pdf_config: PdfConfig,
    ocr: Option<&'a dyn OcrBackend>,
}

impl<'a> DocumentLoader<'a> {
    /// Loader without OCR: only text files and text PDFs can be read.
    pub fn new(pdf_config: PdfConfig) -> Self {
        Self {
            pdf_config,
            ocr: None,
        }
    }

    pub fn with_ocr(mut self, backend: &'a dyn OcrBackend) -> Self {
        self.ocr = Some(backend);
        self
    }

    /// Load `path` into a [`Document`], reporting page texts to `sink`.
    pub fn load(&self, path: &Path, sink: &dyn DiagnosticSink) -> Result<Document> {
        let kind = InputKind::from_path(path).ok_or_else(|| {
            ExtractionError::UnsupportedInput(path.display().to_string())
        })?;
        info!("Loading {} as {:?}", path.display(), kind);

        let pages: Vec<String> = match kind {
            InputKind::Text => {
                let text = std::fs::read_to_string(path)?;
                text.split(FORM_FEED).map(str::to_string).collect()
            }
            InputKind::Pdf => {
                let data = std::fs::read(path)?;
                self.pdf_pages(&data)?
            }
            InputKind::Image => {
                let image = image::open(path)?;
                vec![self.recognize(&image, &path.display().to_string())?]
            }
        };

        for (index, text) in pages.iter().enumerate() {
            sink.emit(&Diagnostic::PageText {
                page: index + 1,
                text: text.as_str(),
            });
        }

        let document = Document::from_pages(&pages);
        sink.emit(&Diagnostic::DocumentText {
            pages: document.page_count,
            text: document.text.as_str(),
        });
        Ok(document)
    }

    fn pdf_pages(&self, data: &[u8]) -> Result<Vec<String>> {
        let mut pdf = PdfExtractor::new().with_max_pages(self.pdf_config.max_pages);
        pdf.load(data)?;

        if self.pdf_config.prefer_embedded_text {
            if let (PdfKind::Text, Some(text)) = pdf.classify(self.pdf_config.min_text_length) {
                debug!("Using embedded PDF text");
                return Ok(vec![text]);
            }
        }

        let mut pages = Vec::new();
        for page in 1..=pdf.pages_to_process() {
            let images = pdf.page_images(page)?;
            if images.is_empty() {
                warn!("Page {} has no scanned image", page);
                continue;
            }
            let texts = images
                .iter()
                .map(|image| self.recognize(image, &format!("PDF page {}", page)))
                .collect::<Result<Vec<_>>>()?;
            pages.push(texts.join("\n"));
        }

        if pages.is_empty() {
            debug!("No page-level images, scanning all PDF objects");
            for image in pdf.all_images() {
                pages.push(self.recognize(&image, "PDF image")?);
            }
        }

        if pages.is_empty() {
            return Err(PdfError::ImageExtraction("no text or scanned pages found".to_string()).into());
        }
        Ok(pages)
    }

    fn recognize(&self, image: &DynamicImage, what: &str) -> Result<String> {
        let backend = self
            .ocr
            .ok_or_else(|| LabscanError::from(OcrError::Unavailable(what.to_string())))?;
        debug!("Running {} on {}", backend.name(), what);
        Ok(backend.recognize(image)?)
    }
}
