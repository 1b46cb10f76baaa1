//! PDF assembly: staged images and text files → one new PDF via `printpdf`.
//!
//! printpdf 0.8 uses a data-oriented API: documents are built by constructing
//! `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
//! `PdfDocument::save()`. Each surviving staged file contributes exactly one
//! page, so page order mirrors staging order and no blank page precedes the
//! first content item.
//!
//! Image pages: the image is scaled to the full width between the margins,
//! shrunk further if the resulting height would overflow, and centred on the
//! page. Text pages: lines are word-wrapped to a fixed width and flowed from
//! a fixed top-left origin; lines past the bottom margin are dropped.

use crate::config::PageLayout;
use crate::error::ConvertError;
use crate::pipeline::input::{ContentKind, StagedFile};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, warn};

/// Assemble the staged files into a single PDF, in order.
///
/// `on_file(index, total, name)` is invoked with the 0-based index before each
/// file is processed; it runs on the blocking worker thread.
///
/// Returns the serialised PDF bytes.
pub async fn assemble_pdf<F>(
    files: Vec<StagedFile>,
    layout: PageLayout,
    title: String,
    on_file: F,
) -> Result<Vec<u8>, ConvertError>
where
    F: Fn(usize, usize, &str) + Send + 'static,
{
    tokio::task::spawn_blocking(move || assemble_blocking(&files, &layout, &title, on_file))
        .await
        .map_err(|e| ConvertError::Internal(format!("assemble task panicked: {e}")))?
}

fn assemble_blocking<F>(
    files: &[StagedFile],
    layout: &PageLayout,
    title: &str,
    on_file: F,
) -> Result<Vec<u8>, ConvertError>
where
    F: Fn(usize, usize, &str),
{
    let total = files.len();
    let mut doc = PdfDocument::new(title);
    let mut pages: Vec<PdfPage> = Vec::new();

    for (index, file) in files.iter().enumerate() {
        on_file(index, total, &file.name);

        match file.kind {
            ContentKind::Image => pages.push(image_page(&mut doc, file, layout)?),
            ContentKind::PlainText => pages.push(text_page(file, layout)),
            ContentKind::WordDocument => {
                // Excluded at conversion; skipping here is defensive only.
                debug!("skipping staged word document '{}'", file.name);
            }
        }
    }

    // Nothing survived: emit a single blank page rather than a zero-page PDF.
    if pages.is_empty() {
        pages.push(PdfPage::new(
            Mm(layout.page_width_mm),
            Mm(layout.page_height_mm),
            Vec::new(),
        ));
    }

    info!("assembled {} page(s) from {} staged file(s)", pages.len(), total);
    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    debug!("serialised PDF: {} bytes, {} warnings", bytes.len(), warnings.len());

    Ok(bytes)
}

// ── Image pages ──────────────────────────────────────────────────────────

/// Where an image lands on the page, plus the XObject scale that puts it there.
#[derive(Debug, PartialEq)]
struct ImagePlacement {
    x_mm: f32,
    y_mm: f32,
    width_mm: f32,
    height_mm: f32,
}

/// Fit an image within the page margins, preserving aspect ratio.
///
/// Scales to the full available width first, then shrinks to the available
/// height if that would overflow; the result is centred both ways.
fn fit_image(pixel_width: f32, pixel_height: f32, layout: &PageLayout) -> ImagePlacement {
    let available_w = layout.page_width_mm - 2.0 * layout.margin_mm;
    let available_h = layout.page_height_mm - 2.0 * layout.margin_mm;
    let ratio = pixel_width / pixel_height;

    let mut width = available_w;
    let mut height = width / ratio;
    if height > available_h {
        height = available_h;
        width = height * ratio;
    }

    ImagePlacement {
        x_mm: (layout.page_width_mm - width) / 2.0,
        y_mm: (layout.page_height_mm - height) / 2.0,
        width_mm: width,
        height_mm: height,
    }
}

fn image_page(
    doc: &mut PdfDocument,
    file: &StagedFile,
    layout: &PageLayout,
) -> Result<PdfPage, ConvertError> {
    let decoded =
        image::load_from_memory(&file.bytes).map_err(|e| ConvertError::ImageDecodeFailed {
            name: file.name.clone(),
            detail: e.to_string(),
        })?;

    let pixel_width = decoded.width() as usize;
    let pixel_height = decoded.height() as usize;

    let rgb = decoded.to_rgb8();
    let raw = RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: pixel_width,
        height: pixel_height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let xobject_id = doc.add_image(&raw);

    let placement = fit_image(pixel_width as f32, pixel_height as f32, layout);

    // The XObject's native size is its pixel size at `image_dpi`; a uniform
    // scale maps that onto the placement width (aspect ratio is already
    // preserved by the fit).
    let native_w_pt = pixel_width as f32 / layout.image_dpi * 72.0;
    let scale = Mm(placement.width_mm).into_pt().0 / native_w_pt;

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Mm(placement.x_mm).into_pt()),
            translate_y: Some(Mm(placement.y_mm).into_pt()),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(layout.image_dpi),
            rotate: None,
        },
    }];

    debug!(
        "placed '{}' at {:.1}x{:.1} mm on its page",
        file.name, placement.width_mm, placement.height_mm
    );

    Ok(PdfPage::new(
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        ops,
    ))
}

// ── Text pages ───────────────────────────────────────────────────────────

fn text_page(file: &StagedFile, layout: &PageLayout) -> PdfPage {
    let text = String::from_utf8_lossy(&file.bytes);
    let lines = wrap_text(&text, max_chars_per_line(layout));

    let page_h_pt = Mm(layout.page_height_mm).into_pt().0;
    let origin_x_pt = Mm(layout.text_origin_x_mm).into_pt().0;
    let top_y_pt = page_h_pt - Mm(layout.text_origin_y_mm).into_pt().0;
    let bottom_pt = Mm(layout.margin_mm).into_pt().0;

    let mut ops: Vec<Op> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let y_pt = top_y_pt - index as f32 * layout.line_height_pt;
        if y_pt < bottom_pt {
            warn!(
                "text from '{}' overflows its page; dropping {} line(s)",
                file.name,
                lines.len() - index
            );
            break;
        }
        if line.is_empty() {
            continue;
        }

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(origin_x_pt),
                y: Pt(y_pt),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(layout.font_size_pt),
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.clone())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
    }

    PdfPage::new(Mm(layout.page_width_mm), Mm(layout.page_height_mm), ops)
}

/// Characters that fit on one wrapped line, estimated from the average
/// Helvetica glyph width (roughly 0.50 × font size in pt; 1 pt = 0.3528 mm).
fn max_chars_per_line(layout: &PageLayout) -> usize {
    let avg_char_width_mm = 0.50 * layout.font_size_pt * 0.3528;
    ((layout.text_wrap_width_mm / avg_char_width_mm) as usize).max(1)
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then word-wraps within each paragraph.
/// Words longer than `max_width` are force-broken. Widths are measured in
/// characters, never bytes, so multi-byte text (e.g. unspaced CJK, which is
/// one "word" to the whitespace splitter) breaks on char boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::with_capacity(max_width);
        let mut current_chars = 0usize;

        for word in words {
            let word_chars = word.chars().count();
            if word_chars > max_width {
                if current_chars > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
                for ch in word.chars() {
                    current.push(ch);
                    current_chars += 1;
                    if current_chars == max_width {
                        lines.push(std::mem::take(&mut current));
                        current_chars = 0;
                    }
                }
            } else if current_chars == 0 {
                current.push_str(word);
                current_chars = word_chars;
            } else if current_chars + 1 + word_chars <= max_width {
                current.push(' ');
                current.push_str(word);
                current_chars += 1 + word_chars;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_chars = word_chars;
            }
        }

        if current_chars > 0 {
            lines.push(current);
        }
    }

    lines
}
