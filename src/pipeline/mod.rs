//! Pipeline stages for the two conversion directions.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! PDF → other formats:
//!   input ──▶ render ──▶ encode        (images)
//!   (bytes)   (pdfium)   (jpeg/png)
//!   input ──▶ extract                  (text)
//!             (pdfium segments)
//!
//! other formats → PDF:
//!   input ──▶ assemble
//!   (filter)  (printpdf pages)
//! ```
//!
//! 1. [`input`]    — intake filtering by content category; PDF magic check
//! 2. [`render`]   — rasterise pages in order; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`extract`]  — per-page text segments, joined and headed per page
//! 4. [`encode`]   — `DynamicImage` → JPEG/PNG bytes
//! 5. [`assemble`] — staged files → one printpdf page each → PDF bytes

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod input;
pub mod render;
