//! Page-range parsing: a selection expression → explicit list of pages.
//!
//! Grammar: comma-separated tokens, each either a bare 1-based integer `N`
//! or a range `A-B` where `B` may be the keyword `end` (last page of the
//! document). The whole expression may be the keyword `all`, equivalent to
//! `1-end`. Overlapping ranges and repeated indices deduplicate.
//!
//! The last-page number comes from a caller-supplied provider closure that
//! is invoked lazily and at most once. A bare-integer expression (including
//! the default `"1"`) never invokes it, so the common single-page case never
//! opens the source document just to parse the selection.

use crate::error::PrepError;
use std::collections::BTreeSet;

/// Parse a page selection expression into a sorted, deduplicated page list.
///
/// `last_page` is only called when the expression contains `all` or `end`,
/// and its result is memoised for the rest of the parse.
///
/// # Errors
/// [`PrepError::InvalidPageSelection`] for any token that is not a positive
/// integer or well-formed range, and for ranges whose lower bound exceeds
/// the upper bound after `end` substitution. No partial list is ever
/// returned.
pub fn parse_page_selection<F>(expr: &str, mut last_page: F) -> Result<Vec<usize>, PrepError>
where
    F: FnMut() -> Result<usize, PrepError>,
{
    let expr = expr.trim();
    let mut resolved_last: Option<usize> = None;
    let mut resolve = move |f: &mut F| -> Result<usize, PrepError> {
        if let Some(n) = resolved_last {
            return Ok(n);
        }
        let n = f()?;
        resolved_last = Some(n);
        Ok(n)
    };

    // Fast path: a bare page number needs no document access at all.
    if !expr.is_empty() && expr.bytes().all(|b| b.is_ascii_digit()) {
        let page = parse_index(expr)?;
        return Ok(vec![page]);
    }

    let mut pages = BTreeSet::new();

    if expr == "all" {
        let last = resolve(&mut last_page)?;
        pages.extend(1..=last);
        return Ok(pages.into_iter().collect());
    }

    if expr.is_empty() {
        return Err(PrepError::InvalidPageSelection {
            token: expr.to_string(),
        });
    }

    for token in expr.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start.trim())?;
                let end = if end.trim() == "end" {
                    resolve(&mut last_page)?
                } else {
                    parse_index(end.trim())?
                };
                if start > end {
                    return Err(PrepError::InvalidPageSelection {
                        token: token.to_string(),
                    });
                }
                pages.extend(start..=end);
            }
            None => {
                pages.insert(parse_index(token)?);
            }
        }
    }

    Ok(pages.into_iter().collect())
}

/// Parse a single 1-based page index. Zero and non-numeric tokens fail.
fn parse_index(token: &str) -> Result<usize, PrepError> {
    match token.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(PrepError::InvalidPageSelection {
            token: token.to_string(),
        }),
    }
}
