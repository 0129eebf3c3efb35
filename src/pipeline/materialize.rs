//! Page materialisation: one upright single-page document per selected page.
//!
//! For every page the caller selected, this module guarantees a usable
//! single-page PDF on disk inside the request's working directory, with
//! layout geometry either taken from the run cache or computed exactly
//! once, and with any quarter-turn skew physically corrected before the
//! geometry is cached.
//!
//! Decryption is not locally recovered: a password failure on the source
//! document propagates immediately, since every later stage would fail the
//! same way. All filesystem writes stay inside the caller-scoped working
//! directory.

use crate::config::{Flavor, PrepConfig};
use crate::error::PrepError;
use crate::page::{LayoutCache, PageInfo};
use crate::pipeline::layout;
use crate::pipeline::render;
use crate::pipeline::rotation::{detect_rotation, RotationVerdict};
use pdfium_render::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Open a document with pdfium, mapping password failures onto the error
/// taxonomy.
///
/// `password` of `None` means the document is expected to be unencrypted;
/// pdfium ignores a password supplied for an unencrypted document.
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PrepError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let detail = format!("{:?}", e);
        if detail.contains("Password") || detail.contains("password") {
            if password.is_some() {
                PrepError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                PrepError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            PrepError::CorruptPdf {
                path: path.to_path_buf(),
                detail,
            }
        }
    })
}

/// Build the initial [`PageInfo`] list for a selection, marking which pages
/// still need a materialised file.
///
/// A page needs a file when its layout or dimensions are not cached; the
/// lattice flavor additionally needs a rendered image per page, so a
/// missing cached image also marks the file as required.
pub fn check_page_data(
    pages: &[usize],
    flavor: Flavor,
    cache: &LayoutCache,
    workdir: &Path,
) -> Vec<PageInfo> {
    let check_image = flavor == Flavor::Lattice;
    pages
        .iter()
        .map(|&page| {
            let layout = cache.layouts.get(&page).cloned();
            let dimensions = cache.dimensions.get(&page).copied();
            let image_path = cache.images.get(&page).cloned();
            let mut file_required = layout.is_none() || dimensions.is_none();
            if check_image && image_path.is_none() {
                file_required = true;
            }
            PageInfo {
                page,
                layout,
                dimensions,
                image_path,
                file_path: workdir.join(format!("page-{page}.pdf")),
                file_required,
            }
        })
        .collect()
}

/// Materialise one page: split, normalise orientation, analyse, render,
/// and refresh the cache entry.
pub(crate) fn materialize_page(
    source: &Path,
    info: &mut PageInfo,
    config: &PrepConfig,
    cache: &mut LayoutCache,
) -> Result<(), PrepError> {
    let password = config.password_opt();
    split_single_page(source, info.page, password, &info.file_path)?;

    let (layout, dimensions) = match (info.layout.clone(), info.dimensions) {
        (Some(layout), Some(dimensions)) => {
            // Cached geometry is honoured: no re-analysis. The cached boxes
            // still decide whether the freshly split file needs correcting.
            let verdict = detect_rotation(
                &layout.chars,
                &layout.horizontal_text,
                &layout.vertical_text,
                dimensions,
            );
            if verdict != RotationVerdict::None {
                correct_rotation(&info.file_path, info.page, password, verdict)?;
            }
            (layout, dimensions)
        }
        _ => {
            let (layout, dimensions) =
                layout::analyze_page(&info.file_path, info.page, password, &config.layout)?;
            let verdict = detect_rotation(
                &layout.chars,
                &layout.horizontal_text,
                &layout.vertical_text,
                dimensions,
            );
            if verdict == RotationVerdict::None {
                (Arc::new(layout), dimensions)
            } else {
                debug!("page {} is skewed ({:?})", info.page, verdict);
                correct_rotation(&info.file_path, info.page, password, verdict)?;
                // Re-analyse so the cached geometry describes the upright page.
                let (layout, dimensions) =
                    layout::analyze_page(&info.file_path, info.page, password, &config.layout)?;
                (Arc::new(layout), dimensions)
            }
        }
    };

    if config.flavor == Flavor::Lattice && info.image_path.is_none() {
        let png_path = info.file_path.with_extension("png");
        render::render_page_to_png(
            &info.file_path,
            info.page,
            password,
            &png_path,
            config.max_render_pixels,
        )?;
        cache.images.insert(info.page, png_path.clone());
        info.image_path = Some(png_path);
    }

    cache.layouts.insert(info.page, layout.clone());
    cache.dimensions.insert(info.page, dimensions);
    info.layout = Some(layout);
    info.dimensions = Some(dimensions);
    Ok(())
}

/// Extract a single page from the source into an independent document at
/// `target`.
fn split_single_page(
    source: &Path,
    page: usize,
    password: Option<&str>,
    target: &Path,
) -> Result<(), PrepError> {
    let pdfium = Pdfium::default();
    let source_doc = open_document(&pdfium, source, password)?;

    let total = source_doc.pages().len() as usize;
    if page > total {
        return Err(PrepError::PageOutOfRange { page, total });
    }

    let mut single = pdfium
        .create_new_pdf()
        .map_err(|e| PrepError::PageWriteFailed {
            path: target.to_path_buf(),
            detail: format!("{:?}", e),
        })?;
    single
        .pages_mut()
        .copy_page_from_document(&source_doc, (page - 1) as u16, 0)
        .map_err(|e| PrepError::PageWriteFailed {
            path: target.to_path_buf(),
            detail: format!("{:?}", e),
        })?;
    single
        .save_to_file(target)
        .map_err(|e| PrepError::PageWriteFailed {
            path: target.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    debug!("materialised page {} at {}", page, target.display());
    Ok(())
}

/// Physically rotate the page at `target` so it reads upright.
///
/// The unrotated file is first renamed to a distinguishable intermediate
/// name, the corrected page is written back to the original target path,
/// and the intermediate is removed.
fn correct_rotation(
    target: &Path,
    page: usize,
    password: Option<&str>,
    verdict: RotationVerdict,
) -> Result<(), PrepError> {
    let workdir = target.parent().unwrap_or_else(|| Path::new("."));
    let intermediate = workdir.join(format!("p-{page}_rotated.pdf"));
    fs::rename(target, &intermediate).map_err(|e| PrepError::Workspace {
        path: intermediate.clone(),
        source: e,
    })?;

    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, &intermediate, password)?;
    {
        let mut pdf_page = document
            .pages()
            .get(0)
            .map_err(|e| PrepError::CorruptPdf {
                path: intermediate.clone(),
                detail: format!("{:?}", e),
            })?;
        let current = pdf_page.rotation().unwrap_or(PdfPageRenderRotation::None);
        let degrees = (rotation_to_degrees(current) + verdict.correction_degrees()) % 360;
        pdf_page.set_rotation(degrees_to_rotation(degrees));
    }
    document
        .save_to_file(target)
        .map_err(|e| PrepError::PageWriteFailed {
            path: target.to_path_buf(),
            detail: format!("{:?}", e),
        })?;
    fs::remove_file(&intermediate).map_err(|e| PrepError::Workspace {
        path: intermediate,
        source: e,
    })?;

    info!("corrected {:?} skew on page {}", verdict, page);
    Ok(())
}

fn rotation_to_degrees(rotation: PdfPageRenderRotation) -> u32 {
    match rotation {
        PdfPageRenderRotation::None => 0,
        PdfPageRenderRotation::Degrees90 => 90,
        PdfPageRenderRotation::Degrees180 => 180,
        PdfPageRenderRotation::Degrees270 => 270,
    }
}

fn degrees_to_rotation(degrees: u32) -> PdfPageRenderRotation {
    match degrees % 360 {
        90 => PdfPageRenderRotation::Degrees90,
        180 => PdfPageRenderRotation::Degrees180,
        270 => PdfPageRenderRotation::Degrees270,
        _ => PdfPageRenderRotation::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::PageLayout;
    use std::path::PathBuf;

    fn cache_with_page(page: usize, with_image: bool) -> LayoutCache {
        let mut cache = LayoutCache::new();
        cache.layouts.insert(page, Arc::new(PageLayout::default()));
        cache.dimensions.insert(page, (612.0, 792.0));
        if with_image {
            cache.images.insert(page, PathBuf::from(format!("page-{page}.png")));
        }
        cache
    }

    #[test]
    fn uncached_pages_require_files() {
        let infos = check_page_data(
            &[1, 3],
            Flavor::Stream,
            &LayoutCache::new(),
            Path::new("/tmp/work"),
        );
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.file_required));
        assert_eq!(infos[1].file_path, Path::new("/tmp/work/page-3.pdf"));
    }

    #[test]
    fn cached_geometry_satisfies_stream_flavor() {
        let cache = cache_with_page(2, false);
        let infos = check_page_data(&[2], Flavor::Stream, &cache, Path::new("/w"));
        assert!(!infos[0].file_required);
        assert!(infos[0].layout.is_some());
        assert_eq!(infos[0].dimensions, Some((612.0, 792.0)));
    }

    #[test]
    fn lattice_flavor_requires_cached_image_too() {
        let cache = cache_with_page(2, false);
        let infos = check_page_data(&[2], Flavor::Lattice, &cache, Path::new("/w"));
        assert!(infos[0].file_required, "missing image must force a file");

        let cache = cache_with_page(2, true);
        let infos = check_page_data(&[2], Flavor::Lattice, &cache, Path::new("/w"));
        assert!(!infos[0].file_required);
    }

    #[test]
    fn partially_cached_page_requires_file() {
        let mut cache = LayoutCache::new();
        cache.dimensions.insert(1, (612.0, 792.0));
        let infos = check_page_data(&[1], Flavor::Stream, &cache, Path::new("/w"));
        assert!(infos[0].file_required, "layout absent must force a file");
    }

    #[test]
    fn rotation_degree_roundtrip() {
        for (r, d) in [
            (PdfPageRenderRotation::None, 0),
            (PdfPageRenderRotation::Degrees90, 90),
            (PdfPageRenderRotation::Degrees180, 180),
            (PdfPageRenderRotation::Degrees270, 270),
        ] {
            assert_eq!(rotation_to_degrees(r), d);
            assert_eq!(rotation_to_degrees(degrees_to_rotation(d)), d);
        }
        assert_eq!(rotation_to_degrees(degrees_to_rotation(360)), 0);
    }
}
