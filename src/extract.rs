//! The boundary to the downstream table-extraction stage.
//!
//! [`PageGeometry`] adapts a [`PageInfo`] entry into the inputs a table
//! detector needs: upright page dimensions, the text-object partitions, and
//! a resolved image artifact path. Extractors implement [`TableExtractor`]
//! and consume pages only through this surface; they never touch the
//! document file or the cache directly.
//!
//! Hydration falls back to running layout analysis itself when an entry
//! arrives without cached geometry, so the pre-cached and on-demand paths
//! hand the extractor identical inputs.

use crate::config::LayoutOptions;
use crate::error::PrepError;
use crate::page::PageInfo;
use crate::pipeline::layout::{self, CharBox, PageLayout, Rect, TextLine};
use std::path::PathBuf;
use std::sync::Arc;

/// The per-page geometry handed to the table-extraction stage.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    /// 1-based page number in the source document.
    pub page: usize,
    /// The upright single-page document.
    pub file_path: PathBuf,
    /// The rendered page image; derived from the file root when the cache
    /// did not supply one.
    pub image_path: PathBuf,
    /// Upright page width in points.
    pub width: f32,
    /// Upright page height in points.
    pub height: f32,
    /// Analysed layout partitions.
    pub layout: Arc<PageLayout>,
}

impl PageGeometry {
    /// Hydrate geometry from a materialised page record.
    ///
    /// Uses the record's cached layout and dimensions when present,
    /// otherwise analyses the single-page document on demand.
    pub fn hydrate(
        info: &PageInfo,
        password: Option<&str>,
        options: &LayoutOptions,
    ) -> Result<Self, PrepError> {
        let (layout, dimensions) = match (info.layout.clone(), info.dimensions) {
            (Some(layout), Some(dimensions)) => (layout, dimensions),
            _ => {
                let (layout, dimensions) =
                    layout::analyze_page(&info.file_path, info.page, password, options)?;
                (Arc::new(layout), dimensions)
            }
        };
        let image_path = info
            .image_path
            .clone()
            .unwrap_or_else(|| info.file_path.with_extension("png"));

        Ok(Self {
            page: info.page,
            file_path: info.file_path.clone(),
            image_path,
            width: dimensions.0,
            height: dimensions.1,
            layout,
        })
    }

    pub fn chars(&self) -> &[CharBox] {
        &self.layout.chars
    }

    pub fn horizontal_text(&self) -> &[TextLine] {
        &self.layout.horizontal_text
    }

    pub fn vertical_text(&self) -> &[TextLine] {
        &self.layout.vertical_text
    }

    pub fn images(&self) -> &[Rect] {
        &self.layout.images
    }
}

/// A table-extraction strategy driven over prepared pages.
///
/// This trait is the sole interface the detection algorithms consume. The
/// pipeline hands every implementation the full, ordered page set; a
/// per-page error aborts the remaining pages.
pub trait TableExtractor {
    /// One extracted table (or whatever the strategy yields per hit).
    type Output;

    /// Extract all tables found on one prepared page.
    fn extract_tables(&self, page: &PageGeometry) -> Result<Vec<Self::Output>, PrepError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::PageLayout;

    fn cached_info(image: Option<&str>) -> PageInfo {
        PageInfo {
            page: 3,
            layout: Some(Arc::new(PageLayout::default())),
            dimensions: Some((612.0, 792.0)),
            image_path: image.map(PathBuf::from),
            file_path: PathBuf::from("/work/page-3.pdf"),
            file_required: false,
        }
    }

    #[test]
    fn hydrate_uses_cached_geometry_without_io() {
        let geometry =
            PageGeometry::hydrate(&cached_info(None), None, &LayoutOptions::default()).unwrap();
        assert_eq!(geometry.page, 3);
        assert_eq!(geometry.width, 612.0);
        assert_eq!(geometry.height, 792.0);
    }

    #[test]
    fn image_path_derives_from_file_root() {
        let geometry =
            PageGeometry::hydrate(&cached_info(None), None, &LayoutOptions::default()).unwrap();
        assert_eq!(geometry.image_path, PathBuf::from("/work/page-3.png"));
    }

    #[test]
    fn cached_image_path_wins_over_derivation() {
        let geometry = PageGeometry::hydrate(
            &cached_info(Some("/cache/earlier.png")),
            None,
            &LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(geometry.image_path, PathBuf::from("/cache/earlier.png"));
    }
}
