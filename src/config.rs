//! Configuration types for conversion runs.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across runs and to diff two runs to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::ConvertError;
use crate::progress::SharedProgressObserver;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page geometry used when assembling staged files into a new PDF.
///
/// Defaults describe an A4 portrait page with a 10 mm margin on all sides,
/// text flowed from a fixed top-left origin, and images placed at 150 DPI
/// native resolution before fit-scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width in millimetres. Default: 210 (A4).
    pub page_width_mm: f32,
    /// Page height in millimetres. Default: 297 (A4).
    pub page_height_mm: f32,
    /// Margin kept free on all four sides when placing images. Default: 10.
    pub margin_mm: f32,
    /// Horizontal origin of flowed text, from the left edge. Default: 10.
    pub text_origin_x_mm: f32,
    /// Vertical origin of flowed text, from the top edge. Default: 20.
    pub text_origin_y_mm: f32,
    /// Maximum line width for wrapped text. Default: 180.
    pub text_wrap_width_mm: f32,
    /// Font size for flowed text, in points. Default: 11.
    pub font_size_pt: f32,
    /// Baseline-to-baseline distance for flowed text, in points. Default: 14.
    pub line_height_pt: f32,
    /// DPI at which embedded images are considered native size. Default: 150.
    pub image_dpi: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            text_origin_x_mm: 10.0,
            text_origin_y_mm: 20.0,
            text_wrap_width_mm: 180.0,
            font_size_pt: 11.0,
            line_height_pt: 14.0,
            image_dpi: 150.0,
        }
    }
}

/// Configuration for a [`crate::controller::ConversionController`].
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pageforge::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .render_scale(2.0)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Scale factor applied to each page's natural size when rasterising.
    /// Range: 0.25–8.0. Default: 2.0.
    ///
    /// 2.0 doubles the pixel dimensions of every page, which keeps body text
    /// legible in the exported images without producing unwieldy files.
    pub render_scale: f32,

    /// JPEG encoding quality, 1–100. Default: 90. Ignored for PNG.
    pub jpeg_quality: u8,

    /// Delay between progress reaching 100 % and the readout being hidden,
    /// in milliseconds. Default: 500.
    ///
    /// Gives an observer time to display the final "complete" status before
    /// the readout disappears. Set to 0 in tests.
    pub settle_delay_ms: u64,

    /// Title metadata embedded in assembled PDFs. Default: "Converted Document".
    pub document_title: String,

    /// Page geometry for assembled PDFs.
    pub layout: PageLayout,

    /// Optional observer for progress events.
    pub progress_observer: Option<SharedProgressObserver>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            jpeg_quality: 90,
            settle_delay_ms: 500,
            document_title: "Converted Document".to_string(),
            layout: PageLayout::default(),
            progress_observer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("render_scale", &self.render_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("document_title", &self.document_title)
            .field("layout", &self.layout)
            .field(
                "progress_observer",
                &self.progress_observer.as_ref().map(|_| "<dyn ProgressObserver>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.25, 8.0);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.config.document_title = title.into();
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn progress_observer(mut self, observer: SharedProgressObserver) -> Self {
        self.config.progress_observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !c.render_scale.is_finite() || c.render_scale <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "render scale must be a positive number, got {}",
                c.render_scale
            )));
        }
        let layout = &c.layout;
        if layout.page_width_mm <= 0.0 || layout.page_height_mm <= 0.0 {
            return Err(ConvertError::InvalidConfig(
                "page dimensions must be positive".into(),
            ));
        }
        if layout.margin_mm * 2.0 >= layout.page_width_mm
            || layout.margin_mm * 2.0 >= layout.page_height_mm
        {
            return Err(ConvertError::InvalidConfig(format!(
                "margin {} mm leaves no usable area on a {}x{} mm page",
                layout.margin_mm, layout.page_width_mm, layout.page_height_mm
            )));
        }
        if layout.text_wrap_width_mm <= 0.0 {
            return Err(ConvertError::InvalidConfig(
                "text wrap width must be positive".into(),
            ));
        }
        Ok(self.config)
    }
}
