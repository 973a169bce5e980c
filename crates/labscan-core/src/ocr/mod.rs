//! Optical character recognition of scanned pages.
//!
//! Recognition itself is delegated to an [`OcrBackend`]. This module only
//! prepares page images and turns recognized boxes back into lines of text,
//! which is the shape the field rules expect.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::preprocess_page;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Something that turns a page image into text.
pub trait OcrBackend {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Recognize the text of one page, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

impl<B: OcrBackend + ?Sized> OcrBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        (**self).recognize(image)
    }
}

/// A recognized piece of text with its axis-aligned position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub height: f32,
}

impl TextBox {
    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Rebuild reading-order lines from recognized boxes.
///
/// Boxes whose vertical centers lie within half a box height of a line's
/// first box join that line, left to right, separated by a space. Lines
/// are emitted top to bottom.
pub fn assemble_lines(mut boxes: Vec<TextBox>) -> String {
    boxes.retain(|b| !b.text.trim().is_empty());
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut lines: Vec<Vec<TextBox>> = Vec::new();
    for text_box in boxes {
        match lines.last_mut() {
            Some(line)
                if (text_box.center_y() - line[0].center_y()).abs()
                    <= line[0].height.max(text_box.height) / 2.0 =>
            {
                line.push(text_box)
            }
            _ => lines.push(vec![text_box]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            line.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
