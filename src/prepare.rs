//! Request orchestration: from input string to a prepared page set.
//!
//! The pipeline is synchronous and strictly sequential: pages materialise
//! one at a time in ascending order, and the first failure aborts the
//! request. Each request owns its own working directory, created here as a
//! `TempDir` and removed by RAII on every exit path, error or not, so no
//! partial artifacts outlive a failed request.
//!
//! [`prepare`] stops at the boundary: the full ordered page set exists
//! before it returns. [`process`] additionally drives a caller-supplied
//! [`TableExtractor`] over the prepared pages and releases the working
//! directory before returning the aggregated outputs.

use crate::config::PrepConfig;
use crate::error::PrepError;
use crate::extract::{PageGeometry, TableExtractor};
use crate::page::{LayoutCache, PageInfo};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::materialize;
use crate::selection;
use pdfium_render::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

/// A fully materialised page set, alive until dropped.
///
/// Dropping this value removes the scoped working directory and with it
/// every single-page document and image artifact it contains.
#[derive(Debug)]
pub struct PreparedDocument {
    pages: Vec<PageInfo>,
    workdir: TempDir,
    source: ResolvedInput,
}

impl PreparedDocument {
    /// The ordered per-page records, one per selected page.
    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    /// The scoped working directory holding the materialised artifacts.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// The resolved source document path.
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }
}

/// Prepare all selected pages of a document for table extraction.
///
/// Equivalent to [`prepare_with_cache`] with a fresh, empty cache.
pub fn prepare(input_str: impl AsRef<str>, config: &PrepConfig) -> Result<PreparedDocument, PrepError> {
    let mut cache = LayoutCache::new();
    prepare_with_cache(input_str, config, &mut cache)
}

/// Prepare all selected pages, reusing and refreshing the supplied cache.
///
/// Geometry present in `cache` is honoured (no re-analysis, no re-render);
/// geometry computed here is written back, so a second call for the same
/// pages within one run performs layout analysis exactly once.
///
/// # Errors
/// Fails fast on the first page that cannot be materialised; the working
/// directory and any partial artifacts are removed before returning.
pub fn prepare_with_cache(
    input_str: impl AsRef<str>,
    config: &PrepConfig,
    cache: &mut LayoutCache,
) -> Result<PreparedDocument, PrepError> {
    let input_str = input_str.as_ref();
    info!("Preparing pages '{}' from {}", config.pages, input_str);

    let source = input::resolve_input(input_str, config.download_timeout_secs)?;
    let source_path = source.path().to_path_buf();
    let password = config.password_opt();

    // The page-count provider opens the source only when the selection
    // actually needs the last page number.
    let pages = selection::parse_page_selection(&config.pages, || {
        let pdfium = Pdfium::default();
        let document = materialize::open_document(&pdfium, &source_path, password)?;
        Ok(document.pages().len() as usize)
    })?;
    debug!("Selection resolved to {} page(s)", pages.len());

    let workdir = TempDir::new().map_err(|e| PrepError::Workspace {
        path: std::env::temp_dir(),
        source: e,
    })?;

    let mut infos = materialize::check_page_data(&pages, config.flavor, cache, workdir.path());
    for info in infos.iter_mut().filter(|i| i.file_required) {
        materialize::materialize_page(&source_path, info, config, cache)?;
    }

    info!("Prepared {} page(s)", infos.len());
    Ok(PreparedDocument {
        pages: infos,
        workdir,
        source,
    })
}

/// Prepare all selected pages and run a table extractor over them.
///
/// The whole page set is materialised before the first extractor call; the
/// outputs come back flattened in ascending page order. The working
/// directory is released before this function returns, on success and on
/// error alike.
pub fn process<E: TableExtractor>(
    input_str: impl AsRef<str>,
    config: &PrepConfig,
    extractor: &E,
) -> Result<Vec<E::Output>, PrepError> {
    let mut cache = LayoutCache::new();
    let prepared = prepare_with_cache(input_str, config, &mut cache)?;

    let mut outputs = Vec::new();
    for info in prepared.pages() {
        let geometry = PageGeometry::hydrate(info, config.password_opt(), &config.layout)?;
        outputs.extend(extractor.extract_tables(&geometry)?);
    }
    Ok(outputs)
}
