//! Error types for the pageprep library.
//!
//! There is a single fatal error type, [`PrepError`]. The pipeline has no
//! partial-success mode: either every selected page is materialised and
//! handed to the extraction stage, or the request fails as a whole. A
//! half-materialised page set would silently skew any table extraction run
//! over it, so the first failing page aborts the request.
//!
//! Every variant carries enough context (path, page number, or offending
//! token) for the caller to identify what failed without string-parsing the
//! message.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pageprep library.
#[derive(Debug, Error)]
pub enum PrepError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Selection errors ──────────────────────────────────────────────────
    /// The page-range expression could not be parsed.
    ///
    /// Raised before any page is materialised; there is never a partial
    /// page list.
    #[error("Invalid page selection token '{token}'\nExpected forms: '1', '1,3,4', '2-5', '3-end', 'all'.")]
    InvalidPageSelection { token: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// A selected page number exceeds the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// A single-page document could not be written.
    #[error("Failed to write single-page PDF '{path}': {detail}")]
    PageWriteFailed { path: PathBuf, detail: String },

    // ── Layout / render errors ────────────────────────────────────────────
    /// Layout analysis could not produce geometry for a page.
    #[error("Layout analysis failed for page {page}: {detail}")]
    LayoutFailed { page: usize, detail: String },

    /// Rasterisation of a page image failed.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// I/O inside the scoped working directory failed.
    #[error("Working directory I/O failed at '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
