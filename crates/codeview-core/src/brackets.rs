//! Bounded, nesting-aware bracket matching over the line map.

use crate::line_map::LineMap;
use crate::tokeniser::Token;
use std::ops::Range;

/// Find the partner of the bracket that ends exactly at `location`.
///
/// Openers are matched forwards and closers backwards, counting nested brackets of the same
/// kind. Only lines in `bound_lines` are searched; the result is the absolute character range
/// of the partner, or `None` if `location` does not follow a bracket, the bracket's line lies
/// outside `bound_lines`, or no partner is found within them.
pub fn matching_bracket(
    map: &LineMap,
    location: usize,
    bound_lines: Range<usize>,
) -> Option<Range<usize>> {
    let line = map.line_of(location)?;
    if !bound_lines.contains(&line) {
        return None;
    }
    let line_start = map.lookup(line)?.range.start;
    let info = map.info_of(line)?;
    let column = location - line_start;
    let index = info
        .tokens
        .iter()
        .position(|t| t.range.end == column && t.kind.is_bracket())?;
    let bracket = info.tokens[index].kind;
    let partner = bracket.matching_bracket()?;

    let mut depth = 1_u32;
    let mut visit = |token: &Token| {
        if token.kind == bracket {
            depth += 1;
        } else if token.kind == partner {
            depth -= 1;
        }
        depth == 0
    };

    if bracket.is_opening_bracket() {
        let last = bound_lines.end.min(map.len());
        for current in line..last {
            let info = map.info_of(current)?;
            let skip = if current == line { index + 1 } else { 0 };
            if let Some(token) = info.tokens[skip..].iter().find(|&t| visit(t)) {
                return absolute(map, current, token);
            }
        }
    } else {
        for current in (bound_lines.start..=line).rev() {
            let info = map.info_of(current)?;
            let take = if current == line { index } else { info.tokens.len() };
            if let Some(token) = info.tokens[..take].iter().rev().find(|&t| visit(t)) {
                return absolute(map, current, token);
            }
        }
    }
    None
}

fn absolute(map: &LineMap, line: usize, token: &Token) -> Option<Range<usize>> {
    let start = map.lookup(line)?.range.start;
    Some(start + token.range.start..start + token.range.end)
}
