//! Page rasterisation: render a single-page document to a PNG artifact.
//!
//! Only the lattice flavor needs this; its grid-line detection runs over
//! pixels, while stream extraction works from text geometry alone. PNG is
//! used because lossless compression keeps thin ruling lines crisp.
//!
//! `max_pixels` caps the longest rendered edge regardless of physical page
//! size, keeping memory bounded for oversized pages; pdfium scales the
//! other dimension proportionally.

use crate::error::PrepError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

use super::materialize::open_document;

/// Render the (single) page of the document at `path` into `png_path`.
///
/// `page` is the 1-based page number in the original document, used only
/// for error reporting.
pub fn render_page_to_png(
    path: &Path,
    page: usize,
    password: Option<&str>,
    png_path: &Path,
    max_pixels: u32,
) -> Result<(), PrepError> {
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, path, password)?;

    let pdf_page = document
        .pages()
        .get(0)
        .map_err(|e| PrepError::RenderFailed {
            page,
            detail: format!("{:?}", e),
        })?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let bitmap = pdf_page
        .render_with_config(&render_config)
        .map_err(|e| PrepError::RenderFailed {
            page,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        page,
        image.width(),
        image.height()
    );

    image
        .save_with_format(png_path, image::ImageFormat::Png)
        .map_err(|e| PrepError::RenderFailed {
            page,
            detail: format!("PNG encoding failed: {}", e),
        })?;

    Ok(())
}
