//! Configuration types for page preparation.
//!
//! All behaviour is controlled through [`PrepConfig`], built via its
//! [`PrepConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across requests, serialise them for logging, and diff
//! two runs to understand why their outputs differ.
//!
//! The password is normalised once, here, at config-ingestion time: an empty
//! string means "the document is not encrypted" and is treated identically
//! to no password at all. Nothing downstream ever re-interprets it.

use crate::error::PrepError;
use serde::{Deserialize, Serialize};

/// Configuration for one page-preparation request.
///
/// Built via [`PrepConfig::builder()`] or using [`PrepConfig::default()`].
///
/// # Example
/// ```rust
/// use pageprep::{Flavor, PrepConfig};
///
/// let config = PrepConfig::builder()
///     .pages("1,4-end")
///     .flavor(Flavor::Stream)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Comma-separated page selection expression. Default: `"1"`.
    ///
    /// Accepted forms: `"1"`, `"1,3,4"`, `"2-5"`, `"3-end"`, `"all"`.
    /// The default single-page form is a fast path that never opens the
    /// source document to count pages.
    pub pages: String,

    /// Password for encrypted documents. Empty or absent means the document
    /// is expected to be unencrypted.
    pub password: Option<String>,

    /// Extraction flavor of the downstream stage. Default: [`Flavor::Lattice`].
    ///
    /// Lattice detection works on rendered grid lines, so it additionally
    /// requires a PNG artifact per page; stream detection is text-geometry
    /// only and skips rasterisation entirely.
    pub flavor: Flavor,

    /// Layout-analysis options, passed to every analysis pass.
    pub layout: LayoutOptions,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum rendered image dimension (width or height) in pixels.
    /// Default: 2000.
    ///
    /// A safety cap independent of page size: a very large page could
    /// otherwise produce a raster that exhausts memory. Either dimension is
    /// capped, scaling the other proportionally.
    pub max_render_pixels: u32,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            pages: "1".to_string(),
            password: None,
            flavor: Flavor::default(),
            layout: LayoutOptions::default(),
            download_timeout_secs: 120,
            max_render_pixels: 2000,
        }
    }
}

impl PrepConfig {
    /// Create a new builder for `PrepConfig`.
    pub fn builder() -> PrepConfigBuilder {
        PrepConfigBuilder {
            config: Self::default(),
        }
    }

    /// The password in the form the PDF capability expects.
    ///
    /// Empty means "not encrypted" and maps to `None`.
    pub fn password_opt(&self) -> Option<&str> {
        match self.password.as_deref() {
            Some("") | None => None,
            Some(p) => Some(p),
        }
    }
}

/// Builder for [`PrepConfig`].
#[derive(Debug)]
pub struct PrepConfigBuilder {
    config: PrepConfig,
}

impl PrepConfigBuilder {
    pub fn pages(mut self, expr: impl Into<String>) -> Self {
        self.config.pages = expr.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.config.flavor = flavor;
        self
    }

    pub fn layout(mut self, options: LayoutOptions) -> Self {
        self.config.layout = options;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_render_pixels(mut self, px: u32) -> Self {
        self.config.max_render_pixels = px.max(100);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PrepConfig, PrepError> {
        let c = &self.config;
        if c.pages.trim().is_empty() {
            return Err(PrepError::InvalidConfig(
                "Page selection must not be empty".into(),
            ));
        }
        if c.max_render_pixels < 100 {
            return Err(PrepError::InvalidConfig(format!(
                "max_render_pixels must be ≥ 100, got {}",
                c.max_render_pixels
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The downstream extraction strategy the pages are prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flavor {
    /// Grid-line based detection; needs a rendered page image. (default)
    #[default]
    Lattice,
    /// Whitespace/geometry based detection; text only.
    Stream,
}

/// Options consumed by layout analysis.
///
/// The named fields are the knobs this crate's line-grouping actually reads.
/// `extra` is an opaque bag handed through untouched to the downstream
/// extraction stage; a fresh empty bag is the default on every construction,
/// never a shared instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Maximum baseline offset, as a fraction of glyph height (or width for
    /// vertical runs), for two characters to share a text line. Default: 0.5.
    pub line_overlap: f32,

    /// Maximum gap between adjacent characters, in multiples of the previous
    /// glyph's advance size, before a new text line starts. Default: 2.0.
    pub char_margin: f32,

    /// Whether to group vertically flowing characters into vertical text
    /// lines. Disabling it forces every run to be treated as horizontal.
    /// Default: true.
    pub detect_vertical: bool,

    /// Opaque pass-through options for the downstream extraction stage.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            char_margin: 2.0,
            detect_vertical: true,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_page_lattice() {
        let c = PrepConfig::default();
        assert_eq!(c.pages, "1");
        assert_eq!(c.flavor, Flavor::Lattice);
        assert!(c.password_opt().is_none());
    }

    #[test]
    fn empty_password_means_unencrypted() {
        let c = PrepConfig::builder().password("").build().unwrap();
        assert!(c.password_opt().is_none());

        let c = PrepConfig::builder().password("secret").build().unwrap();
        assert_eq!(c.password_opt(), Some("secret"));
    }

    #[test]
    fn empty_selection_rejected() {
        let err = PrepConfig::builder().pages("  ").build().unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }

    #[test]
    fn render_pixel_floor_is_clamped() {
        let c = PrepConfig::builder().max_render_pixels(10).build().unwrap();
        assert_eq!(c.max_render_pixels, 100);
    }

    #[test]
    fn layout_options_extra_is_fresh_per_construction() {
        let mut a = LayoutOptions::default();
        a.extra.insert("flag".into(), serde_json::Value::Bool(true));
        let b = LayoutOptions::default();
        assert!(b.extra.is_empty());
    }
}
