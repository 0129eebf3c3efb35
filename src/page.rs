//! Per-page records and the run-scoped layout cache.
//!
//! A [`PageInfo`] is created for every selected page at the start of a
//! request, mutated in place as materialisation completes, and discarded
//! with the scoped working directory. It carries no identity beyond a
//! single extraction run.
//!
//! [`LayoutCache`] is the shared contract between repeated requests within
//! one run: whatever geometry a previous pass computed is honoured (no
//! re-analysis, no re-rendering) and whatever this pass computes is written
//! back. The cache is never persisted across runs.

use crate::pipeline::layout::PageLayout;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-page record produced by the materialiser.
#[derive(Debug, Clone)]
pub struct PageInfo {
    /// 1-based page index in the source document.
    pub page: usize,
    /// Analysed layout, once computed or supplied by the cache.
    pub layout: Option<Arc<PageLayout>>,
    /// Page `(width, height)` in points.
    pub dimensions: Option<(f32, f32)>,
    /// Rendered PNG artifact, when the flavor needs one.
    pub image_path: Option<PathBuf>,
    /// Location of the single-page materialised document.
    pub file_path: PathBuf,
    /// Whether a fresh single-page document must be written.
    ///
    /// True whenever `layout` or `dimensions` is absent, and also, for
    /// lattice extraction, whenever `image_path` is absent.
    pub file_required: bool,
}

/// Caller-suppliable cache of per-page geometry, keyed by page number.
///
/// Scoped to a single extraction run.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    pub layouts: HashMap<usize, Arc<PageLayout>>,
    pub dimensions: HashMap<usize, (f32, f32)>,
    pub images: HashMap<usize, PathBuf>,
}

impl LayoutCache {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}
