//! Plain-text extraction: per-page text segments via pdfium, assembled into
//! one artifact with `Page {i}:` headers.
//!
//! Runs in `spawn_blocking` for the same reason rendering does — pdfium is
//! not async-safe. Pages are processed strictly in order so the assembled
//! text and the progress sequence are deterministic.

use crate::error::ConvertError;
use pdfium_render::prelude::*;
use tracing::info;

/// Extract the text of every page, in order.
///
/// Each page contributes `Page {i}:\n{tokens}\n\n`, where `{tokens}` is the
/// page's text segments joined with single spaces. `on_page(page, total)` is
/// invoked with 1-indexed page numbers before each page is processed.
pub async fn extract_text<F>(bytes: Vec<u8>, on_page: F) -> Result<String, ConvertError>
where
    F: Fn(usize, usize) + Send + 'static,
{
    tokio::task::spawn_blocking(move || extract_text_blocking(bytes, on_page))
        .await
        .map_err(|e| ConvertError::Internal(format!("extract task panicked: {e}")))?
}

fn extract_text_blocking<F>(bytes: Vec<u8>, on_page: F) -> Result<String, ConvertError>
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
    info!("extracting text from {} pages", total);

    let mut full_text = String::new();

    for index in 0..total {
        on_page(index + 1, total);

        let page = pages
            .get(index as u16)
            .map_err(|e| ConvertError::ExtractFailed {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        let text_page = page.text().map_err(|e| ConvertError::ExtractFailed {
            page: index + 1,
            detail: format!("{e:?}"),
        })?;

        let tokens = join_segments(
            text_page
                .segments()
                .iter()
                .map(|segment| segment.text()),
        );

        full_text.push_str(&page_entry(index + 1, &tokens));
    }

    Ok(full_text)
}

/// Join text segments with single spaces, dropping empty ones.
fn join_segments(segments: impl Iterator<Item = String>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for segment in segments {
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }
    parts.join(" ")
}

/// Format one page's contribution to the assembled artifact.
fn page_entry(page_num: usize, tokens: &str) -> String {
    format!("Page {page_num}:\n{tokens}\n\n")
}
