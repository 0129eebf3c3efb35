//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! pdfium requires a file-system path, so URL inputs are downloaded to a
//! `TempDir` first; the directory is cleaned up automatically when the
//! returned `ResolvedInput` is dropped, even if the process panics. The PDF
//! magic bytes (`%PDF`) are validated before returning so callers get a
//! meaningful error rather than a pdfium crash, and before any page
//! processing starts.

use crate::error::PrepError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; PDF downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Get the path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local PDF file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, PrepError> {
    if is_url(input) {
        download_url(input, timeout_secs)
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and PDF magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, PrepError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PrepError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PrepError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PrepError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PrepError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, PrepError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PrepError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            PrepError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PrepError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PrepError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| PrepError::Workspace {
        path: std::env::temp_dir(),
        source: e,
    })?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().map_err(|e| PrepError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PrepError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    std::fs::write(&file_path, &bytes).map_err(|e| PrepError::Workspace {
        path: file_path.clone(),
        source: e,
    })?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
