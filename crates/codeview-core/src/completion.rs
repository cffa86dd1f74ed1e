//! Automatic bracket completion.
//!
//! Closing brackets are inserted as soon as their opener is typed, with the caret left between
//! the two. The engine remembers the opener whose closer it inserted, so that the next keystroke
//! at the same spot can be interpreted:
//!
//! - typing the matching closer overtypes the inserted one;
//! - typing another opener nests a completed pair inside;
//! - a line break after `{` opens a blank line between the braces;
//! - a keystroke that merges the opener into a longer lexeme (`{-` in Haskell) retracts the
//!   inserted closer.
//!
//! Only single character bracket lexemes are completed. Decisions are returned as
//! [`FollowUp`]s, which the document executes once the triggering edit has been applied.

use crate::edit::TextEdit;
use crate::line_map::LineMap;
use crate::tokeniser::{Token, Tokeniser};
use codeview_lang::TokenKind;
use ropey::Rope;
use std::ops::Range;

/// An edit to perform after the current one has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Insert `text` at `at`, keeping a caret positioned at `at` in place.
    Insert {
        /// Insertion point.
        at: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove a previously inserted closer.
    Remove {
        /// Removed range.
        range: Range<usize>,
    },
}

impl FollowUp {
    /// The follow-up as a plain edit.
    pub fn to_edit(&self) -> TextEdit {
        match self {
            Self::Insert { at, text } => TextEdit::insert(*at, text.clone()),
            Self::Remove { range } => TextEdit::delete(range.start, range.len()),
        }
    }
}

/// The opener typed last, whose closer was inserted right behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCloser {
    opener: TokenKind,
    /// Position right after the opener, where the closer starts.
    end: usize,
}

/// Tracks typed brackets and decides which closers to insert or remove.
#[derive(Debug, Clone, Default)]
pub struct CompletionEngine {
    pending: Option<PendingCloser>,
}

impl CompletionEngine {
    /// Create an engine without history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last typed opener.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// The opener whose closer was inserted last, if it is still waiting for input.
    pub fn pending_opener(&self) -> Option<TokenKind> {
        self.pending.map(|p| p.opener)
    }

    /// Decide the follow-ups for `edit`.
    ///
    /// `edit` has already been applied to `buffer`, and `map` has been retokenized for it.
    pub fn note_edit(
        &mut self,
        map: &LineMap,
        buffer: &Rope,
        tokeniser: &Tokeniser,
        edit: &TextEdit,
    ) -> Vec<FollowUp> {
        let pending = self.pending.take();
        if edit.old_len != 0 || edit.text.is_empty() {
            return Vec::new();
        }
        let location = edit.location;
        let pending = pending.filter(|p| p.end == location);

        if is_line_break(&edit.text) {
            return match pending {
                Some(p) if p.opener == TokenKind::CurlyBracketOpen => {
                    tracing::debug!(at = location, "completion.open_block");
                    vec![FollowUp::Insert {
                        at: location + edit.new_len(),
                        text: edit.text.clone(),
                    }]
                }
                _ => Vec::new(),
            };
        }
        if edit.single_char_insertion().is_none() {
            return Vec::new();
        }

        let end = location + 1;
        let Some(current) = typed_token(map, end) else {
            return Vec::new();
        };

        if let Some(p) = pending {
            let closer = p.opener.matching_bracket().and_then(|k| single_char(tokeniser, k));
            let Some(closer) = closer else {
                return Vec::new();
            };
            if current.range.len() == 1 && Some(current.kind) == p.opener.matching_bracket() {
                if followed_by(buffer, end, closer) {
                    tracing::debug!(at = end, "completion.overtype");
                    return vec![FollowUp::Remove { range: end..end + 1 }];
                }
                return Vec::new();
            }
            if current.range.len() > 1 && followed_by(buffer, end, closer) {
                tracing::debug!(at = end, "completion.retract");
                return vec![FollowUp::Remove { range: end..end + 1 }];
            }
        }

        match closer_for(tokeniser, &current) {
            Some(closer) => {
                self.pending = Some(PendingCloser {
                    opener: current.kind,
                    end,
                });
                tracing::debug!(at = end, closer, "completion.insert");
                vec![FollowUp::Insert {
                    at: end,
                    text: closer.to_owned(),
                }]
            }
            None => Vec::new(),
        }
    }
}

fn is_line_break(text: &str) -> bool {
    matches!(text, "\n" | "\r\n" | "\r")
}

/// The token that ends exactly at the absolute position `end`, as an absolute token.
fn typed_token(map: &LineMap, end: usize) -> Option<Token> {
    let line = map.line_of(end - 1)?;
    let start = map.lookup(line)?.range.start;
    let token = map.info_of(line)?.token_ending_at(end - start)?;
    Some(Token::new(
        token.kind,
        start + token.range.start..start + token.range.end,
    ))
}

/// The closer to insert for a freshly typed single character opener.
fn closer_for<'t>(tokeniser: &'t Tokeniser, token: &Token) -> Option<&'t str> {
    if token.range.len() != 1 || !token.kind.is_opening_bracket() {
        return None;
    }
    single_char(tokeniser, token.kind)?;
    single_char(tokeniser, token.kind.matching_bracket()?)
}

fn single_char(tokeniser: &Tokeniser, kind: TokenKind) -> Option<&str> {
    tokeniser
        .literal_lexeme(kind)
        .filter(|lexeme| lexeme.chars().count() == 1)
}

fn followed_by(buffer: &Rope, at: usize, text: &str) -> bool {
    let mut expected = text.chars();
    match (buffer.get_char(at), expected.next()) {
        (Some(actual), Some(c)) => actual == c,
        _ => false,
    }
}
