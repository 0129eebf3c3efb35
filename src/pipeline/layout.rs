//! Layout analysis: geometric decomposition of a single-page document.
//!
//! Produces a [`PageLayout`]: owned character boxes, text lines partitioned
//! by orientation, and image boxes, plus the page dimensions. Everything is
//! copied out of pdfium into plain structs so the result can outlive the
//! document handle and be cached across the run.
//!
//! Text lines are grown greedily from characters in content order. Two
//! characters join the same line when their baselines overlap within
//! `line_overlap` and the gap between them stays under `char_margin`
//! advance sizes; the first pair of a run fixes its orientation. Characters
//! inside vertical runs carry the run's reading flow, which is what the
//! rotation detector votes on.
//!
//! Coordinates are PDF page coordinates: origin bottom-left, y up, units in
//! points.

use crate::config::LayoutOptions;
use crate::error::PrepError;
use crate::pipeline::materialize::open_document;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// ── Geometry types ───────────────────────────────────────────────────────

/// Axis-aligned bounding box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest rect covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Reading direction of a vertical text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFlow {
    /// Successive characters descend the page.
    TopToBottom,
    /// Successive characters climb the page.
    BottomToTop,
}

/// Orientation of a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A single character with its box and, for vertical runs, reading flow.
#[derive(Debug, Clone)]
pub struct CharBox {
    pub ch: char,
    pub bbox: Rect,
    /// `Some` only for characters that belong to a vertical text line.
    pub flow: Option<TextFlow>,
}

/// A grouped run of characters sharing one baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub bbox: Rect,
    pub text: String,
    pub orientation: Orientation,
    /// Reading flow; `Some` only for vertical lines.
    pub flow: Option<TextFlow>,
}

/// The analysed geometry of one page.
///
/// This is the opaque layout handle the cache carries; downstream consumers
/// receive it behind an [`Arc`] and never re-derive it.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub chars: Vec<CharBox>,
    pub horizontal_text: Vec<TextLine>,
    pub vertical_text: Vec<TextLine>,
    pub images: Vec<Rect>,
}

// ── Analysis ─────────────────────────────────────────────────────────────

/// Analyse the layout of a single-page document.
///
/// `page` is the 1-based page number in the original document, used only
/// for error reporting; the file at `path` always has exactly one page.
///
/// Returns the layout partitions and the page dimensions `(width, height)`
/// in points.
pub fn analyze_page(
    path: &Path,
    page: usize,
    password: Option<&str>,
    options: &LayoutOptions,
) -> Result<(PageLayout, (f32, f32)), PrepError> {
    let pdfium = Pdfium::default();
    let document = open_document(&pdfium, path, password)?;

    let pdf_page = document
        .pages()
        .get(0)
        .map_err(|e| PrepError::LayoutFailed {
            page,
            detail: format!("{:?}", e),
        })?;

    let dimensions = (pdf_page.width().value, pdf_page.height().value);

    let text_page = pdf_page.text().map_err(|e| PrepError::LayoutFailed {
        page,
        detail: format!("{:?}", e),
    })?;

    let mut glyphs: Vec<(char, Rect)> = Vec::new();
    for pdf_char in text_page.chars().iter() {
        let Some(ch) = pdf_char.unicode_char() else {
            continue;
        };
        let Ok(bounds) = pdf_char.loose_bounds() else {
            continue;
        };
        glyphs.push((
            ch,
            Rect::new(
                bounds.left().value,
                bounds.bottom().value,
                bounds.right().value,
                bounds.top().value,
            ),
        ));
    }

    let mut images = Vec::new();
    for object in pdf_page.objects().iter() {
        if let PdfPageObject::Image(_) = object {
            if let Ok(bounds) = object.bounds() {
                images.push(Rect::new(
                    bounds.left().value,
                    bounds.bottom().value,
                    bounds.right().value,
                    bounds.top().value,
                ));
            }
        }
    }

    let mut layout = partition_glyphs(glyphs, options);
    layout.images = images;

    debug!(
        page,
        chars = layout.chars.len(),
        horizontal = layout.horizontal_text.len(),
        vertical = layout.vertical_text.len(),
        images = layout.images.len(),
        "layout analysed"
    );

    Ok((layout, dimensions))
}

/// Group raw glyphs into oriented text lines and flowed character boxes.
pub(crate) fn partition_glyphs(glyphs: Vec<(char, Rect)>, options: &LayoutOptions) -> PageLayout {
    let mut runs: Vec<(Vec<(char, Rect)>, Orientation)> = Vec::new();
    let mut current: Vec<(char, Rect)> = Vec::new();
    let mut orientation: Option<Orientation> = None;

    for (ch, bbox) in glyphs {
        if current.is_empty() {
            current.push((ch, bbox));
            continue;
        }
        let prev = &current.last().unwrap().1;
        let fits = match orientation {
            Some(Orientation::Horizontal) => joins_horizontal(prev, &bbox, options),
            Some(Orientation::Vertical) => joins_vertical(prev, &bbox, options),
            None => {
                if joins_horizontal(prev, &bbox, options) {
                    orientation = Some(Orientation::Horizontal);
                    true
                } else if options.detect_vertical && joins_vertical(prev, &bbox, options) {
                    orientation = Some(Orientation::Vertical);
                    true
                } else {
                    false
                }
            }
        };
        if fits {
            current.push((ch, bbox));
        } else {
            runs.push((
                std::mem::take(&mut current),
                orientation.unwrap_or(Orientation::Horizontal),
            ));
            orientation = None;
            current.push((ch, bbox));
        }
    }
    if !current.is_empty() {
        runs.push((current, orientation.unwrap_or(Orientation::Horizontal)));
    }

    let mut layout = PageLayout::default();
    for (glyphs, orientation) in runs {
        let flow = match orientation {
            Orientation::Vertical => Some(run_flow(&glyphs)),
            Orientation::Horizontal => None,
        };
        let bbox = glyphs
            .iter()
            .skip(1)
            .fold(glyphs[0].1, |acc, (_, b)| acc.union(b));
        let text: String = glyphs.iter().map(|(c, _)| *c).collect();

        for (ch, bbox) in &glyphs {
            layout.chars.push(CharBox {
                ch: *ch,
                bbox: *bbox,
                flow,
            });
        }
        let line = TextLine {
            bbox,
            text,
            orientation,
            flow,
        };
        match orientation {
            Orientation::Horizontal => layout.horizontal_text.push(line),
            Orientation::Vertical => layout.vertical_text.push(line),
        }
    }
    layout
}

/// Two glyphs continue one horizontal line: overlapping baselines, small gap.
fn joins_horizontal(prev: &Rect, next: &Rect, options: &LayoutOptions) -> bool {
    let baseline_ok = (next.y0 - prev.y0).abs() <= options.line_overlap * prev.height().max(1.0);
    let gap = next.x0 - prev.x1;
    baseline_ok && gap <= options.char_margin * prev.width().max(1.0)
}

/// Two glyphs continue one vertical line: aligned centers, small gap in y.
fn joins_vertical(prev: &Rect, next: &Rect, options: &LayoutOptions) -> bool {
    let center_ok =
        (next.center_x() - prev.center_x()).abs() <= options.line_overlap * prev.width().max(1.0);
    let gap = if next.y1 <= prev.y0 {
        prev.y0 - next.y1
    } else if next.y0 >= prev.y1 {
        next.y0 - prev.y1
    } else {
        0.0
    };
    center_ok && gap <= options.char_margin * prev.height().max(1.0)
}

/// Reading flow of a vertical run, from the first and last glyph centers.
fn run_flow(glyphs: &[(char, Rect)]) -> TextFlow {
    let first = glyphs.first().map(|(_, b)| b.center_y()).unwrap_or(0.0);
    let last = glyphs.last().map(|(_, b)| b.center_y()).unwrap_or(0.0);
    if first >= last {
        TextFlow::TopToBottom
    } else {
        TextFlow::BottomToTop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A row of upright glyphs starting at `(x, y)`.
    fn horizontal_glyphs(text: &str, x: f32, y: f32) -> Vec<(char, Rect)> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f32 * 10.0;
                (c, Rect::new(x0, y, x0 + 9.0, y + 12.0))
            })
            .collect()
    }

    /// A column of glyphs descending (or climbing) from `(x, y)`.
    fn vertical_glyphs(text: &str, x: f32, y: f32, descending: bool) -> Vec<(char, Rect)> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let step = i as f32 * 13.0;
                let y0 = if descending { y - step } else { y + step };
                (c, Rect::new(x, y0, x + 9.0, y0 + 12.0))
            })
            .collect()
    }

    #[test]
    fn horizontal_row_groups_into_one_line() {
        let layout = partition_glyphs(horizontal_glyphs("table", 100.0, 700.0), &LayoutOptions::default());
        assert_eq!(layout.horizontal_text.len(), 1);
        assert!(layout.vertical_text.is_empty());
        assert_eq!(layout.horizontal_text[0].text, "table");
        assert!(layout.chars.iter().all(|c| c.flow.is_none()));
    }

    #[test]
    fn distant_rows_split_into_separate_lines() {
        let mut glyphs = horizontal_glyphs("ab", 100.0, 700.0);
        glyphs.extend(horizontal_glyphs("cd", 100.0, 650.0));
        let layout = partition_glyphs(glyphs, &LayoutOptions::default());
        assert_eq!(layout.horizontal_text.len(), 2);
    }

    #[test]
    fn descending_column_is_vertical_top_to_bottom() {
        let layout = partition_glyphs(
            vertical_glyphs("abc", 80.0, 700.0, true),
            &LayoutOptions::default(),
        );
        assert_eq!(layout.vertical_text.len(), 1);
        assert_eq!(layout.vertical_text[0].flow, Some(TextFlow::TopToBottom));
        assert!(layout
            .chars
            .iter()
            .all(|c| c.flow == Some(TextFlow::TopToBottom)));
    }

    #[test]
    fn climbing_column_is_vertical_bottom_to_top() {
        let layout = partition_glyphs(
            vertical_glyphs("abc", 500.0, 100.0, false),
            &LayoutOptions::default(),
        );
        assert_eq!(layout.vertical_text.len(), 1);
        assert_eq!(layout.vertical_text[0].flow, Some(TextFlow::BottomToTop));
    }

    #[test]
    fn detect_vertical_off_keeps_runs_horizontal() {
        let options = LayoutOptions {
            detect_vertical: false,
            ..LayoutOptions::default()
        };
        let layout = partition_glyphs(vertical_glyphs("abc", 80.0, 700.0, true), &options);
        assert!(layout.vertical_text.is_empty());
        assert_eq!(layout.horizontal_text.len(), 3);
    }

    #[test]
    fn line_bbox_covers_all_glyphs() {
        let layout = partition_glyphs(horizontal_glyphs("abc", 100.0, 700.0), &LayoutOptions::default());
        let bbox = layout.horizontal_text[0].bbox;
        assert_eq!(bbox.x0, 100.0);
        assert_eq!(bbox.x1, 129.0);
        assert_eq!(bbox.height(), 12.0);
    }
}
