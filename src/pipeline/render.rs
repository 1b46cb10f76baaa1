//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! Pages are rendered strictly one at a time, in page order, so the caller's
//! per-page progress hook fires in a deterministic sequence.

use crate::error::ConvertError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Rasterise all pages of a PDF, in order, at the given scale factor.
///
/// `on_page(page, total)` is invoked with 1-indexed page numbers just before
/// each page is rendered. It runs on the blocking worker thread, so it must
/// be `Send + 'static`.
pub async fn render_pages<F>(
    bytes: Vec<u8>,
    scale: f32,
    on_page: F,
) -> Result<Vec<DynamicImage>, ConvertError>
where
    F: Fn(usize, usize) + Send + 'static,
{
    tokio::task::spawn_blocking(move || render_pages_blocking(bytes, scale, on_page))
        .await
        .map_err(|e| ConvertError::Internal(format!("render task panicked: {e}")))?
}

fn render_pages_blocking<F>(
    bytes: Vec<u8>,
    scale: f32,
    on_page: F,
) -> Result<Vec<DynamicImage>, ConvertError>
where
    F: Fn(usize, usize),
{
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(|e| ConvertError::CorruptPdf {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages", total);

    let mut rendered = Vec::with_capacity(total);

    for index in 0..total {
        on_page(index + 1, total);

        let page = pages
            .get(index as u16)
            .map_err(|e| ConvertError::RenderFailed {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        // Target the page's natural size multiplied by the scale factor.
        let width = (page.width().value * scale) as i32;
        let height = (page.height().value * scale) as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ConvertError::RenderFailed {
                    page: index + 1,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        debug!(
            "rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        rendered.push(image);
    }

    Ok(rendered)
}

/// Page count of a PDF, without rendering anything.
pub async fn page_count(bytes: Vec<u8>) -> Result<usize, ConvertError> {
    tokio::task::spawn_blocking(move || {
        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| ConvertError::CorruptPdf {
                detail: format!("{e:?}"),
            })?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("page count task panicked: {e}")))?
}
