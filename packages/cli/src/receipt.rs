//! Receipt content extraction.
//!
//! Turns a receipt file into an ordered sequence of content blocks for the
//! completion model. The text-vs-vision choice made here decides which model
//! and prompt the parser uses downstream, so the threshold logic is kept as
//! a separate function with its own tests.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::prelude::*;

use crate::config::{DEFAULT_MIN_TEXT_CHARS, DEFAULT_VISION_DPI};
use crate::error::{CliError, Result};

const MIME_PDF: &str = "application/pdf";

/// Raster formats accepted as-is.
const RASTER_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// One piece of model input, tagged by modality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    Image { data_uri: String },
}

impl ContentBlock {
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text(_))
    }
}

/// Knobs for the extraction decision.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Extracted text shorter than this is not trusted as text input.
    pub min_text_chars: usize,
    /// Render resolution when pages go to the vision model.
    pub dpi: u32,
    /// Send page images even when a usable text layer exists.
    pub force_vision: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            dpi: DEFAULT_VISION_DPI,
            force_vision: false,
        }
    }
}

/// Read a receipt file into content blocks.
///
/// Raster images become a single image block. PDFs become either one text
/// block (enough extractable text, vision not forced) or one image block per
/// rendered page. Anything else is [`CliError::UnsupportedFileType`].
pub fn read_receipt(path: &Path, options: &ExtractOptions) -> Result<Vec<ContentBlock>> {
    let mime = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string());

    match mime.as_deref() {
        Some(mime) if RASTER_MIME_TYPES.contains(&mime) => {
            let bytes = fs::read(path)?;
            Ok(vec![ContentBlock::Image {
                data_uri: to_data_uri(&bytes, mime),
            }])
        }
        Some(MIME_PDF) => read_pdf(path, options),
        _ => Err(CliError::UnsupportedFileType(path.display().to_string())),
    }
}

fn read_pdf(path: &Path, options: &ExtractOptions) -> Result<Vec<ContentBlock>> {
    // A scanned PDF without a text layer may fail extraction outright;
    // treat that the same as empty text and fall through to rendering.
    let text = extract_pdf_text(path).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "text extraction failed, using page images");
        String::new()
    });

    if use_text_modality(&text, options) {
        tracing::debug!(chars = text.len(), "receipt has a usable text layer");
        return Ok(vec![ContentBlock::Text(text)]);
    }

    let pages = render_pdf_pages(path, options.dpi)?;
    tracing::debug!(pages = pages.len(), dpi = options.dpi, "rendered receipt pages");
    Ok(pages
        .into_iter()
        .map(|png| ContentBlock::Image {
            data_uri: to_data_uri(&png, "image/png"),
        })
        .collect())
}

/// The text-vs-vision decision, separated from the IO.
fn use_text_modality(text: &str, options: &ExtractOptions) -> bool {
    text.len() > options.min_text_chars && !options.force_vision
}

fn extract_pdf_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path).map_err(|e| receipt_error(path, &e))?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).map_err(|e| receipt_error(path, &e))
}

fn render_pdf_pages(path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>> {
    use pdf2image::{Pages, RenderOptionsBuilder, DPI, PDF};

    let pdf = PDF::from_file(path).map_err(|e| receipt_error(path, &e))?;
    let render_options = RenderOptionsBuilder::default()
        .resolution(DPI::Uniform(dpi))
        .build()
        .map_err(|e| receipt_error(path, &e))?;
    let pages = pdf
        .render(Pages::All, render_options)
        .map_err(|e| receipt_error(path, &e))?;

    let mut encoded = Vec::with_capacity(pages.len());
    for page in pages {
        let mut bytes = Vec::new();
        page.write_to(&mut Cursor::new(&mut bytes), pdf2image::image::ImageFormat::Png)
            .map_err(|e| receipt_error(path, &e))?;
        encoded.push(bytes);
    }
    Ok(encoded)
}

fn receipt_error(path: &Path, err: &dyn std::fmt::Display) -> CliError {
    CliError::ReceiptRead {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Package raw bytes as a base64 data URI.
#[must_use]
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_modality_threshold() {
        let options = ExtractOptions::default();
        let long_text = "A".repeat(60);
        assert!(use_text_modality(&long_text, &options));
        assert!(!use_text_modality("Short text", &options));
        // Exactly the threshold is not enough.
        assert!(!use_text_modality(&"A".repeat(50), &options));
    }

    #[test]
    fn test_force_vision_overrides_text_layer() {
        let options = ExtractOptions {
            force_vision: true,
            ..ExtractOptions::default()
        };
        assert!(!use_text_modality(&"A".repeat(500), &options));
    }

    #[test]
    fn test_image_file_becomes_single_image_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not really a png, content is opaque here").unwrap();

        let blocks = read_receipt(&path, &ExtractOptions::default()).unwrap();
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Image { data_uri } => {
                assert!(data_uri.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected image block, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_file_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.txt");
        fs::write(&path, "plain text").unwrap();

        let err = read_receipt(&path, &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_extension_without_mime_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt");
        fs::write(&path, "no extension at all").unwrap();

        let err = read_receipt(&path, &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_to_data_uri() {
        assert_eq!(
            to_data_uri(b"abc", "image/png"),
            "data:image/png;base64,YWJj"
        );
    }
}
