//! # pageprep
//!
//! Materialise normalised, upright single-page PDFs with cached layout
//! geometry, ready for a downstream table-extraction stage.
//!
//! ## Why this crate?
//!
//! Table detectors want to reason about exactly one page at a time, with
//! trustworthy geometry: upright text, known page dimensions, and (for
//! grid-line detection) a rendered image. Real inputs are multi-page,
//! sometimes encrypted, sometimes scanned sideways. This crate closes that
//! gap: it resolves a page selection, splits the source into one document
//! per page, detects and corrects quarter-turn skew from text geometry, and
//! caches per-page layout so it is computed at most once per run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (path or URL)
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Selection  "1,4-end" → explicit sorted page list
//!  ├─ 3. Split      one single-page PDF per selected page (pdfium)
//!  ├─ 4. Layout     character / text-line / image boxes + dimensions
//!  ├─ 5. Rotation   skew verdict from text flow; physical correction
//!  ├─ 6. Render     PNG artifact (lattice flavor only)
//!  └─ 7. Bootstrap  PageGeometry per page → your TableExtractor
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pageprep::{prepare, PrepConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PrepConfig::builder().pages("1,3-end").build()?;
//!     let prepared = prepare("document.pdf", &config)?;
//!     for page in prepared.pages() {
//!         println!("page {} → {}", page.page, page.file_path.display());
//!     }
//!     // Dropping `prepared` removes the working directory and artifacts.
//!     Ok(())
//! }
//! ```
//!
//! To run a detector over the pages, implement [`TableExtractor`] and use
//! [`process`]; the working directory is released before it returns.
//!
//! The pipeline is synchronous and strictly sequential. There is no
//! partial-success mode: the first failing page aborts the request, and the
//! scoped working directory is removed on every exit path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod page;
pub mod pipeline;
pub mod prepare;
pub mod selection;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Flavor, LayoutOptions, PrepConfig, PrepConfigBuilder};
pub use error::PrepError;
pub use extract::{PageGeometry, TableExtractor};
pub use page::{LayoutCache, PageInfo};
pub use pipeline::layout::{CharBox, Orientation, PageLayout, Rect, TextFlow, TextLine};
pub use pipeline::rotation::{detect_rotation, RotationVerdict};
pub use prepare::{prepare, prepare_with_cache, process, PreparedDocument};
pub use selection::parse_page_selection;
