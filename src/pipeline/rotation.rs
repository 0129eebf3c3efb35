//! Rotation detection: infer a page's physical skew from its text geometry.
//!
//! Scanned or generated pages sometimes arrive rotated a quarter turn. On
//! such pages nearly every text line comes out of layout analysis as a
//! vertical run, and the reading flow of those runs tells the two skews
//! apart: a page turned one way reads top-to-bottom starting at the left
//! edge, the other way reads bottom-to-top starting at the right edge.
//!
//! The detector is a pure function over the layout partitions. It performs
//! no I/O and always returns the same verdict for the same boxes; a page
//! with no text yields [`RotationVerdict::None`] since there is no evidence
//! to rotate on.

use crate::pipeline::layout::{CharBox, TextFlow, TextLine};

/// The inferred skew of a page's content relative to upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationVerdict {
    /// Content is upright (or there is no decisive signal).
    None,
    /// Content reads bottom-to-top along the right side of the page.
    Clockwise,
    /// Content reads top-to-bottom along the left side of the page.
    Anticlockwise,
}

impl RotationVerdict {
    /// The physical clockwise page rotation, in degrees, that restores
    /// upright reading orientation for this verdict.
    ///
    /// The mapping is easy to invert by accident; the contract is the net
    /// effect, pinned by test: after applying this correction, a second
    /// layout pass over the page yields `None`.
    pub fn correction_degrees(self) -> u32 {
        match self {
            RotationVerdict::None => 0,
            RotationVerdict::Clockwise => 90,
            RotationVerdict::Anticlockwise => 270,
        }
    }
}

/// Decide whether a page's content is rotated a quarter turn.
///
/// `dimensions` is the page `(width, height)` in the same coordinate space
/// as the boxes. Vertical text must strictly outnumber horizontal text
/// (counting only lines with non-blank text) before any verdict other than
/// `None` is possible; within that gate, characters vote by their reading
/// flow and which half of the page they sit in, and a strict majority wins.
pub fn detect_rotation(
    chars: &[CharBox],
    horizontal_text: &[TextLine],
    vertical_text: &[TextLine],
    dimensions: (f32, f32),
) -> RotationVerdict {
    let hlen = horizontal_text
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .count();
    let vlen = vertical_text
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .count();
    if vlen <= hlen {
        return RotationVerdict::None;
    }

    let mid = dimensions.0 / 2.0;
    let mut anticlockwise = 0usize;
    let mut clockwise = 0usize;
    for c in chars {
        match c.flow {
            Some(TextFlow::TopToBottom) if c.bbox.center_x() <= mid => anticlockwise += 1,
            Some(TextFlow::BottomToTop) if c.bbox.center_x() >= mid => clockwise += 1,
            _ => {}
        }
    }

    if anticlockwise > clockwise {
        RotationVerdict::Anticlockwise
    } else if clockwise > anticlockwise {
        RotationVerdict::Clockwise
    } else {
        RotationVerdict::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::{Orientation, Rect};

    fn line(text: &str, orientation: Orientation, flow: Option<TextFlow>) -> TextLine {
        TextLine {
            bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            text: text.to_string(),
            orientation,
            flow,
        }
    }

    /// A column of flowed chars centered at `x` on a 612 pt wide page.
    fn column(x: f32, count: usize, flow: TextFlow) -> Vec<CharBox> {
        (0..count)
            .map(|i| CharBox {
                ch: 'a',
                bbox: Rect::new(x - 4.0, 700.0 - i as f32 * 13.0, x + 4.0, 712.0 - i as f32 * 13.0),
                flow: Some(flow),
            })
            .collect()
    }

    const DIMS: (f32, f32) = (612.0, 792.0);

    #[test]
    fn empty_page_yields_none() {
        assert_eq!(detect_rotation(&[], &[], &[], DIMS), RotationVerdict::None);
    }

    #[test]
    fn horizontal_dominance_yields_none() {
        let horizontal = vec![
            line("alpha", Orientation::Horizontal, None),
            line("beta", Orientation::Horizontal, None),
        ];
        let vertical = vec![line("g", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let chars = column(100.0, 5, TextFlow::TopToBottom);
        assert_eq!(
            detect_rotation(&chars, &horizontal, &vertical, DIMS),
            RotationVerdict::None
        );
    }

    #[test]
    fn blank_lines_do_not_count_toward_dominance() {
        let horizontal = vec![
            line("  ", Orientation::Horizontal, None),
            line("  ", Orientation::Horizontal, None),
        ];
        let vertical = vec![line("g", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let chars = column(100.0, 3, TextFlow::TopToBottom);
        assert_eq!(
            detect_rotation(&chars, &horizontal, &vertical, DIMS),
            RotationVerdict::Anticlockwise
        );
    }

    #[test]
    fn left_top_to_bottom_flow_is_anticlockwise() {
        let vertical = vec![line("col", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let chars = column(100.0, 8, TextFlow::TopToBottom);
        assert_eq!(
            detect_rotation(&chars, &[], &vertical, DIMS),
            RotationVerdict::Anticlockwise
        );
    }

    #[test]
    fn right_bottom_to_top_flow_is_clockwise() {
        let vertical = vec![line("col", Orientation::Vertical, Some(TextFlow::BottomToTop))];
        let chars = column(500.0, 8, TextFlow::BottomToTop);
        assert_eq!(
            detect_rotation(&chars, &[], &vertical, DIMS),
            RotationVerdict::Clockwise
        );
    }

    #[test]
    fn off_side_flows_do_not_vote() {
        // Top-to-bottom on the right and bottom-to-top on the left match
        // neither skew signature.
        let vertical = vec![line("col", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let mut chars = column(500.0, 4, TextFlow::TopToBottom);
        chars.extend(column(100.0, 4, TextFlow::BottomToTop));
        assert_eq!(
            detect_rotation(&chars, &[], &vertical, DIMS),
            RotationVerdict::None
        );
    }

    #[test]
    fn tied_votes_yield_none() {
        let vertical = vec![line("col", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let mut chars = column(100.0, 4, TextFlow::TopToBottom);
        chars.extend(column(500.0, 4, TextFlow::BottomToTop));
        assert_eq!(
            detect_rotation(&chars, &[], &vertical, DIMS),
            RotationVerdict::None
        );
    }

    #[test]
    fn detector_is_deterministic() {
        let vertical = vec![line("col", Orientation::Vertical, Some(TextFlow::TopToBottom))];
        let chars = column(100.0, 8, TextFlow::TopToBottom);
        let first = detect_rotation(&chars, &[], &vertical, DIMS);
        for _ in 0..10 {
            assert_eq!(detect_rotation(&chars, &[], &vertical, DIMS), first);
        }
    }

    #[test]
    fn correction_restores_upright_mapping() {
        // Anticlockwise skew (reads down the left edge) is undone by a
        // counter-clockwise quarter turn, i.e. 270 clockwise; clockwise skew
        // by a 90 clockwise turn. Upright pages are untouched.
        assert_eq!(RotationVerdict::Anticlockwise.correction_degrees(), 270);
        assert_eq!(RotationVerdict::Clockwise.correction_degrees(), 90);
        assert_eq!(RotationVerdict::None.correction_degrees(), 0);
    }

    #[test]
    fn corrected_geometry_re_analyses_as_none() {
        // The post-correction page presents the same words as horizontal
        // lines; the detector must find no residual skew.
        let horizontal = vec![
            line("alpha", Orientation::Horizontal, None),
            line("beta", Orientation::Horizontal, None),
        ];
        let chars: Vec<CharBox> = (0..10)
            .map(|i| CharBox {
                ch: 'a',
                bbox: Rect::new(100.0 + i as f32 * 10.0, 700.0, 109.0 + i as f32 * 10.0, 712.0),
                flow: None,
            })
            .collect();
        assert_eq!(
            detect_rotation(&chars, &horizontal, &[], DIMS),
            RotationVerdict::None
        );
    }
}
