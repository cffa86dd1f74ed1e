//! Export of per-line metadata as absolute, styled character intervals.
//!
//! Style ids are only identifiers; the renderer maps them to colors.

use crate::line_map::LineMap;
use codeview_lang::TokenKind;
use std::ops::Range;

/// Style identifier.
pub type StyleId = u32;

/// Style for comment spans.
pub const STYLE_COMMENT: StyleId = 0x0100_0001;
/// Style for string literals.
pub const STYLE_STRING: StyleId = 0x0100_0002;
/// Style for character literals.
pub const STYLE_CHARACTER: StyleId = 0x0100_0003;
/// Style for numeric literals.
pub const STYLE_NUMBER: StyleId = 0x0100_0004;
/// Style for keywords.
pub const STYLE_KEYWORD: StyleId = 0x0100_0005;
/// Style for identifiers.
pub const STYLE_IDENTIFIER: StyleId = 0x0100_0006;
/// Style for operators.
pub const STYLE_OPERATOR: StyleId = 0x0100_0007;
/// Style for brackets.
pub const STYLE_BRACKET: StyleId = 0x0100_0008;

/// A styled half-open character interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    /// Start offset.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Style.
    pub style_id: StyleId,
}

impl Interval {
    /// Create an interval.
    pub fn new(start: usize, end: usize, style_id: StyleId) -> Self {
        Self {
            start,
            end,
            style_id,
        }
    }
}

/// Default style of a token kind. Comment markers are covered by comment spans instead.
pub fn style_for(kind: TokenKind) -> Option<StyleId> {
    match kind {
        TokenKind::String => Some(STYLE_STRING),
        TokenKind::Character => Some(STYLE_CHARACTER),
        TokenKind::Number => Some(STYLE_NUMBER),
        TokenKind::Keyword => Some(STYLE_KEYWORD),
        TokenKind::Identifier => Some(STYLE_IDENTIFIER),
        TokenKind::Operator => Some(STYLE_OPERATOR),
        kind if kind.is_bracket() => Some(STYLE_BRACKET),
        _ => None,
    }
}

/// Styled intervals for `lines`, sorted by start offset.
///
/// Comment spans come out as [`STYLE_COMMENT`]; tokens inside a comment span are skipped.
/// Semantic tokens are emitted in addition to the lexical ones so that a renderer can layer
/// them on top.
pub fn highlight_intervals(map: &LineMap, lines: Range<usize>) -> Vec<Interval> {
    let mut intervals = Vec::new();
    for line in lines {
        let Some(entry) = map.lookup(line) else {
            break;
        };
        let Some(info) = entry.info.as_ref() else {
            continue;
        };
        let base = entry.range.start;

        for span in &info.comment_spans {
            if !span.is_empty() {
                intervals.push(Interval::new(base + span.start, base + span.end, STYLE_COMMENT));
            }
        }
        for token in &info.tokens {
            if info.is_commented(token.range.start) {
                continue;
            }
            if let Some(style) = style_for(token.kind) {
                intervals.push(Interval::new(
                    base + token.range.start,
                    base + token.range.end,
                    style,
                ));
            }
        }
        for token in info.semantic_tokens.iter().flatten() {
            intervals.push(Interval::new(
                base + token.range.start,
                base + token.range.end,
                token.style_id,
            ));
        }
    }
    intervals.sort_by_key(|i| i.start);
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retokenizer::Retokenizer;
    use crate::semantic::SemanticToken;
    use crate::tokeniser::Tokeniser;
    use codeview_lang::LanguageConfiguration;
    use pretty_assertions::assert_eq;
    use ropey::Rope;

    fn lexed(text: &str) -> LineMap {
        let buffer = Rope::from_str(text);
        let mut map = LineMap::new(&buffer);
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::rust()).unwrap();
        Retokenizer::new(tokeniser).tokenize_all(&mut map, &buffer);
        map
    }

    #[test]
    fn test_intervals_skip_commented_tokens() {
        let map = lexed("let x = /* c */ 1; // t\n\"s\"");
        assert_eq!(
            highlight_intervals(&map, 0..map.len()),
            vec![
                Interval::new(0, 3, STYLE_KEYWORD),
                Interval::new(4, 5, STYLE_IDENTIFIER),
                Interval::new(6, 7, STYLE_OPERATOR),
                Interval::new(8, 15, STYLE_COMMENT),
                Interval::new(16, 17, STYLE_NUMBER),
                Interval::new(19, 23, STYLE_COMMENT),
                Interval::new(24, 27, STYLE_STRING),
            ]
        );
    }

    #[test]
    fn test_semantic_tokens_are_layered() {
        let mut map = lexed("a\nfoo");
        if let Some(Some(info)) = map.info_mut(1) {
            info.semantic_tokens = Some(vec![SemanticToken::new(0..3, 99)]);
        }
        assert_eq!(
            highlight_intervals(&map, 1..5),
            vec![
                Interval::new(2, 5, STYLE_IDENTIFIER),
                Interval::new(2, 5, 99),
            ]
        );
    }

    #[test]
    fn test_comment_markers_have_no_style() {
        assert_eq!(style_for(TokenKind::NestedCommentOpen), None);
        assert_eq!(style_for(TokenKind::SingleLineComment), None);
        assert_eq!(style_for(TokenKind::CurlyBracketClose), Some(STYLE_BRACKET));
    }
}
