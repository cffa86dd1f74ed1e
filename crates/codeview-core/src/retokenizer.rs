//! Incremental retokenization.
//!
//! After an edit, only the rescanned lines are lexed unconditionally. Lexing then continues
//! line by line while the state flowing into a line differs from the state recorded for it:
//!
//! - a different incoming comment depth means the line has to be re-lexed;
//! - an equal comment depth but a different incoming curly depth only shifts the line's curly
//!   depths, which are recomputed from its stored tokens;
//! - once both agree, the line and everything after it is unaffected, since lexing a line only
//!   depends on its content and its incoming state.
//!
//! An unterminated nested comment therefore re-lexes up to the end of the document, while a
//! typical edit touches a single line.

use crate::edit::TextEdit;
use crate::line_map::{LineInfo, LineMap};
use crate::tokeniser::{Token, Tokeniser, TokeniserState};
use codeview_lang::TokenKind;
use ropey::Rope;
use std::ops::Range;

/// What a retokenization pass touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retokenized {
    /// Character range of all lines whose metadata was recomputed.
    pub affected: Range<usize>,
    /// Those lines.
    pub lines: Range<usize>,
    /// Number of lines that were lexed.
    pub relexed: usize,
    /// Number of lines whose curly depths were adjusted without lexing.
    pub adjusted: usize,
}

impl Retokenized {
    /// Number of lines touched.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Keeps the lexical metadata of a [`LineMap`] in sync with its buffer.
#[derive(Debug, Clone)]
pub struct Retokenizer {
    tokeniser: Tokeniser,
}

impl Retokenizer {
    /// Create a retokenizer driving `tokeniser`.
    pub fn new(tokeniser: Tokeniser) -> Self {
        Self { tokeniser }
    }

    /// The underlying tokeniser.
    pub fn tokeniser(&self) -> &Tokeniser {
        &self.tokeniser
    }

    /// Lex every line of the map.
    pub fn tokenize_all(&self, map: &mut LineMap, buffer: &Rope) -> Retokenized {
        self.retokenize(map, buffer, 0..map.len(), true)
    }

    /// Update the line map and its metadata for `edit`, which has already been applied to
    /// `buffer`.
    pub fn apply_edit(&self, map: &mut LineMap, buffer: &Rope, edit: &TextEdit) -> Retokenized {
        let rescanned = map.update_after_edit(buffer, edit.new_range(), edit.len_delta());
        self.retokenize(map, buffer, rescanned, true)
    }

    /// Re-lex `lines` whose content is unchanged, then propagate as after an edit.
    ///
    /// Running this over lines whose metadata is current reproduces it exactly.
    pub fn relex(&self, map: &mut LineMap, buffer: &Rope, lines: Range<usize>) -> Retokenized {
        self.retokenize(map, buffer, lines, false)
    }

    fn retokenize(
        &self,
        map: &mut LineMap,
        buffer: &Rope,
        lines: Range<usize>,
        content_changed: bool,
    ) -> Retokenized {
        let lines = lines.start.min(map.len())..lines.end.min(map.len());
        let (mut state, mut curly) = incoming_state(map, lines.start);

        for line in lines.clone() {
            let info = self.lex_line(map, buffer, line, state, curly, content_changed);
            state = TokeniserState::from_comment_depth(info.comment_depth_end);
            curly = info.curly_bracket_depth_end;
            map.set_info_of(line, info);
        }

        let mut relexed = lines.len();
        let mut adjusted = 0;
        let mut line = lines.end;
        while line < map.len() {
            let next = match map.info_of(line) {
                Some(recorded) if recorded.comment_depth_start == state.comment_depth() => {
                    if recorded.curly_bracket_depth_start == curly {
                        break;
                    }
                    adjusted += 1;
                    LineInfo {
                        curly_bracket_depth_start: curly,
                        curly_bracket_depth_end: curly_depth_after(&recorded.tokens, curly),
                        ..recorded.clone()
                    }
                }
                _ => {
                    relexed += 1;
                    self.lex_line(map, buffer, line, state, curly, false)
                }
            };
            tracing::trace!(
                line,
                comment_depth = next.comment_depth_end,
                curly_depth = next.curly_bracket_depth_end,
                "retokenize.propagate"
            );
            state = TokeniserState::from_comment_depth(next.comment_depth_end);
            curly = next.curly_bracket_depth_end;
            map.set_info_of(line, next);
            line += 1;
        }

        let touched = lines.start..line;
        let affected = map.char_range_of(touched.clone()).unwrap_or_else(|| {
            let at = map
                .lookup(touched.start)
                .map_or(map.end(), |l| l.range.start);
            at..at
        });
        tracing::debug!(
            first_line = touched.start,
            line_count = touched.len(),
            relexed,
            adjusted,
            "retokenized"
        );

        Retokenized {
            affected,
            lines: touched,
            relexed,
            adjusted,
        }
    }

    fn lex_line(
        &self,
        map: &LineMap,
        buffer: &Rope,
        line: usize,
        state: TokeniserState,
        curly: u32,
        content_changed: bool,
    ) -> LineInfo {
        let content = map.content_range(buffer, line).unwrap_or(0..0);
        let text = buffer.slice(content).to_string();
        let mut info = lex_text(&self.tokeniser, &text, state, curly);

        if let Some(previous) = map.info_of(line) {
            info.messages = previous.messages.clone();
            if !content_changed {
                info.semantic_tokens = previous.semantic_tokens.clone();
            }
        }
        info
    }
}

fn incoming_state(map: &LineMap, line: usize) -> (TokeniserState, u32) {
    line.checked_sub(1)
        .and_then(|previous| map.info_of(previous))
        .map_or((TokeniserState::Code, 0), |info| {
            (
                TokeniserState::from_comment_depth(info.comment_depth_end),
                info.curly_bracket_depth_end,
            )
        })
}

fn curly_depth_after(tokens: &[Token], start: u32) -> u32 {
    tokens.iter().fold(start, |depth, token| match token.kind {
        TokenKind::CurlyBracketOpen => depth + 1,
        TokenKind::CurlyBracketClose => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Lex the content of one line (without terminator).
pub(crate) fn lex_text(
    tokeniser: &Tokeniser,
    text: &str,
    start: TokeniserState,
    curly_start: u32,
) -> LineInfo {
    let len = text.chars().count();
    let mut info = LineInfo {
        comment_depth_start: start.comment_depth(),
        curly_bracket_depth_start: curly_start,
        ..LineInfo::default()
    };
    let mut curly = curly_start;
    let mut state = start;
    let mut span_start = (start.comment_depth() > 0).then_some(0);

    for (token, next) in tokeniser.tokenize(text, start) {
        match token.kind {
            TokenKind::SingleLineComment => {
                // The rest of the line is inert.
                info.comment_spans.push(token.range.start..len);
                info.tokens.push(token);
                break;
            }
            TokenKind::NestedCommentOpen
                if state.comment_depth() == 0 && next.comment_depth() > 0 =>
            {
                span_start = Some(token.range.start);
            }
            TokenKind::NestedCommentClose
                if state.comment_depth() > 0 && next.comment_depth() == 0 =>
            {
                if let Some(start) = span_start.take() {
                    info.comment_spans.push(start..token.range.end);
                }
            }
            TokenKind::RoundBracketOpen => info.round_bracket_diff += 1,
            TokenKind::RoundBracketClose => info.round_bracket_diff -= 1,
            TokenKind::SquareBracketOpen => info.square_bracket_diff += 1,
            TokenKind::SquareBracketClose => info.square_bracket_diff -= 1,
            TokenKind::CurlyBracketOpen => curly += 1,
            TokenKind::CurlyBracketClose => curly = curly.saturating_sub(1),
            _ => {}
        }
        state = next;
        info.tokens.push(token);
    }

    if let Some(start) = span_start {
        info.comment_spans.push(start..len);
    }
    info.comment_depth_end = state.comment_depth();
    info.curly_bracket_depth_end = curly;
    info
}
