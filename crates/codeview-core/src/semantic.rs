//! Merging tokens from an external semantic token source.
//!
//! A language service may enrich lines with semantic tokens asynchronously. The host issues a
//! [`SemanticRequest`] for a line, hands it to the service, and later merges the answer back
//! with [`merge`] on the edit-processing context. If the line's range or content changed in
//! the meantime, the answer is stale and the merge is silently discarded.

use crate::highlight::StyleId;
use crate::line_map::LineMap;
use ropey::Rope;
use std::ops::Range;

/// A token supplied by a semantic token source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticToken {
    /// Line-local character range.
    pub range: Range<usize>,
    /// Style the renderer should apply.
    pub style_id: StyleId,
}

impl SemanticToken {
    /// Create a semantic token.
    pub fn new(range: Range<usize>, style_id: StyleId) -> Self {
        Self { range, style_id }
    }
}

/// Snapshot of a line taken when semantic tokens are requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticRequest {
    /// Line index at request time.
    pub line: usize,
    /// Character range of the line at request time.
    pub range: Range<usize>,
    /// Text of the line at request time.
    pub content: String,
}

/// Capture the current state of `line`.
pub fn request(map: &LineMap, buffer: &Rope, line: usize) -> Option<SemanticRequest> {
    let range = map.lookup(line)?.range.clone();
    Some(SemanticRequest {
        line,
        content: buffer.slice(range.clone()).to_string(),
        range,
    })
}

/// Store `tokens` on the requested line unless the request has gone stale.
///
/// Returns `true` if the tokens were merged. Tokens reaching past the end of the line are
/// dropped.
pub fn merge(
    map: &mut LineMap,
    buffer: &Rope,
    request: &SemanticRequest,
    mut tokens: Vec<SemanticToken>,
) -> bool {
    let Some(line) = map.lookup(request.line) else {
        return false;
    };
    if line.range != request.range || line.info.is_none() {
        return false;
    }
    if buffer.slice(line.range.clone()) != request.content.as_str() {
        return false;
    }

    let len = request.range.len();
    tokens.retain(|t| t.range.end <= len && !t.range.is_empty());
    match map.info_mut(request.line) {
        Some(Some(info)) => {
            info.semantic_tokens = Some(tokens);
            true
        }
        _ => false,
    }
}
