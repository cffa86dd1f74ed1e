//! The edit loop tying buffer, line map and engines together.

use crate::brackets;
use crate::completion::{CompletionEngine, FollowUp};
use crate::edit::{TextEdit, map_position};
use crate::highlight::{Interval, highlight_intervals};
use crate::line_map::LineMap;
use crate::messages::{self, BundleId, LocatedMessage, MessageBundle, MessageId};
use crate::retokenizer::{Retokenized, Retokenizer};
use crate::semantic::{self, SemanticRequest, SemanticToken};
use crate::tokeniser::{Tokeniser, TokeniserError};
use codeview_lang::LanguageConfiguration;
use ropey::Rope;
use std::collections::VecDeque;
use std::ops::Range;
use thiserror::Error;

/// Errors of [`CodeDocument::apply_edit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The replaced range does not lie inside the buffer.
    #[error("range {start}..{end} is outside the buffer of length {len}")]
    OutOfBounds {
        /// Start of the rejected range.
        start: usize,
        /// End of the rejected range.
        end: usize,
        /// Buffer length in characters.
        len: usize,
    },
}

/// Everything an edit changed, including the completions it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Character range whose metadata was recomputed, in the final buffer.
    pub affected: Range<usize>,
    /// Number of lines in `affected`.
    pub affected_lines: usize,
    /// Message bundles whose positions can no longer be trusted.
    pub invalidated_bundles: Vec<BundleId>,
    /// Characters inserted by bracket completion.
    pub completion_inserted: usize,
    /// Characters removed by bracket completion.
    pub completion_removed: usize,
    /// Caret position after the edit and its follow-ups.
    pub caret: usize,
}

/// A buffer with live line map, lexical metadata and diagnostics.
///
/// Edits are processed one at a time through [`CodeDocument::apply_edit`]; by the time it
/// returns, the line map describes the buffer exactly and any completion it triggered has been
/// carried out.
#[derive(Debug, Clone)]
pub struct CodeDocument {
    buffer: Rope,
    line_map: LineMap,
    retokenizer: Retokenizer,
    completion: CompletionEngine,
    caret: usize,
}

impl CodeDocument {
    /// Create a document for `text` in `language`.
    pub fn new(text: &str, language: &LanguageConfiguration) -> Result<Self, TokeniserError> {
        Ok(Self::with_tokeniser(text, Tokeniser::for_language(language)?))
    }

    /// Create a document lexed by `tokeniser`.
    pub fn with_tokeniser(text: &str, tokeniser: Tokeniser) -> Self {
        let buffer = Rope::from_str(text);
        let mut line_map = LineMap::new(&buffer);
        let retokenizer = Retokenizer::new(tokeniser);
        retokenizer.tokenize_all(&mut line_map, &buffer);
        Self {
            buffer,
            line_map,
            retokenizer,
            completion: CompletionEngine::new(),
            caret: 0,
        }
    }

    /// The buffer.
    pub fn buffer(&self) -> &Rope {
        &self.buffer
    }

    /// The buffer as a string.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Buffer length in characters.
    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// The line map with its per-line metadata.
    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// The tokeniser lexing this document.
    pub fn tokeniser(&self) -> &Tokeniser {
        self.retokenizer.tokeniser()
    }

    /// Current caret position.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret. Any pending completion is forgotten.
    pub fn set_caret(&mut self, offset: usize) -> Result<(), EditError> {
        let len = self.buffer.len_chars();
        if offset > len {
            return Err(EditError::OutOfBounds {
                start: offset,
                end: offset,
                len,
            });
        }
        self.caret = offset;
        self.completion.reset();
        Ok(())
    }

    /// Apply `edit`, retokenize, and run the completions it triggers.
    ///
    /// An edit reaching outside the buffer is rejected before anything changes. Replacing the
    /// whole non-empty buffer rebuilds the line map from scratch.
    pub fn apply_edit(&mut self, edit: TextEdit) -> Result<EditOutcome, EditError> {
        let len = self.buffer.len_chars();
        if edit.location > len || edit.old_len > len - edit.location {
            return Err(EditError::OutOfBounds {
                start: edit.location,
                end: edit.location.saturating_add(edit.old_len),
                len,
            });
        }
        if len > 0 && edit.old_len == len {
            return Ok(self.replace_all(&edit.text));
        }

        let mut caret = map_position(self.caret, &edit);
        let (result, mut invalidated) = self.commit(&edit);
        let mut affected = result.affected;
        let mut reaches_last_line = result.lines.end == self.line_map.len();

        let mut queue: VecDeque<FollowUp> = self
            .completion
            .note_edit(
                &self.line_map,
                &self.buffer,
                self.retokenizer.tokeniser(),
                &edit,
            )
            .into();
        let mut completion_inserted = 0;
        let mut completion_removed = 0;

        while let Some(follow_up) = queue.pop_front() {
            let follow_edit = follow_up.to_edit();
            if follow_edit.location + follow_edit.old_len > self.buffer.len_chars() {
                tracing::warn!(?follow_up, "dropping follow-up outside the buffer");
                continue;
            }
            tracing::debug!(?follow_up, "completion.follow_up");
            caret = match &follow_up {
                FollowUp::Insert { at, .. } if *at == caret => caret,
                _ => map_position(caret, &follow_edit),
            };
            match &follow_up {
                FollowUp::Insert { .. } => completion_inserted += follow_edit.new_len(),
                FollowUp::Remove { range } => completion_removed += range.len(),
            }

            let previous = map_position(affected.start, &follow_edit)
                ..map_position(affected.end, &follow_edit);
            let (result, more) = self.commit(&follow_edit);
            for id in more {
                if !invalidated.contains(&id) {
                    invalidated.push(id);
                }
            }
            affected = previous.start.min(result.affected.start)
                ..previous.end.max(result.affected.end);
            reaches_last_line |= result.lines.end == self.line_map.len();
        }

        self.caret = caret;
        Ok(EditOutcome {
            affected_lines: self.line_count_of(&affected, reaches_last_line),
            affected,
            invalidated_bundles: invalidated,
            completion_inserted,
            completion_removed,
            caret,
        })
    }

    /// Replace the whole buffer with `text`, rebuilding every line.
    ///
    /// All messages are dropped and reported as invalidated.
    pub fn replace_all(&mut self, text: &str) -> EditOutcome {
        let invalidated = self
            .line_map
            .lines()
            .iter()
            .filter_map(|l| l.info.as_ref()?.messages.as_ref().map(|b| b.id))
            .collect();

        self.buffer = Rope::from_str(text);
        self.line_map = LineMap::new(&self.buffer);
        let result = self
            .retokenizer
            .tokenize_all(&mut self.line_map, &self.buffer);
        self.completion.reset();
        self.caret = self.caret.min(self.buffer.len_chars());
        tracing::debug!(lines = result.line_count(), "document.replace_all");

        EditOutcome {
            affected_lines: result.line_count(),
            affected: result.affected,
            invalidated_bundles: invalidated,
            completion_inserted: 0,
            completion_removed: 0,
            caret: self.caret,
        }
    }

    fn commit(&mut self, edit: &TextEdit) -> (Retokenized, Vec<BundleId>) {
        let invalidated = messages::invalidated_bundles(&self.line_map, edit);
        self.buffer.remove(edit.old_range());
        self.buffer.insert(edit.location, &edit.text);
        let result = self
            .retokenizer
            .apply_edit(&mut self.line_map, &self.buffer, edit);
        (result, invalidated)
    }

    /// Lines spanned by `range`. The empty line after a trailing terminator shares its start
    /// with the buffer end, so it only counts when `reaches_last_line` says it was touched.
    fn line_count_of(&self, range: &Range<usize>, reaches_last_line: bool) -> usize {
        let Some(first) = self.line_map.line_of(range.start) else {
            return 0;
        };
        let last = if reaches_last_line {
            self.line_map.len() - 1
        } else if range.is_empty() {
            first
        } else {
            self.line_map.line_of(range.end - 1).unwrap_or(first)
        };
        last + 1 - first
    }

    /// Partner of the bracket ending at `location`, searching at most `bound_lines`.
    pub fn matching_bracket(
        &self,
        location: usize,
        bound_lines: Range<usize>,
    ) -> Option<Range<usize>> {
        brackets::matching_bracket(&self.line_map, location, bound_lines)
    }

    /// Attach `message` to `line`.
    pub fn add_message(&mut self, line: usize, message: LocatedMessage) -> Option<BundleId> {
        messages::add(&mut self.line_map, message, line)
    }

    /// Remove the message `id`, returning the line it was attached to.
    pub fn remove_message(&mut self, id: MessageId) -> Option<usize> {
        messages::remove(&mut self.line_map, id)
    }

    /// Snapshot of the messages attached to `line`.
    pub fn messages_at(&self, line: usize) -> Option<MessageBundle> {
        messages::messages_at(&self.line_map, line)
    }

    /// Remove every message of `line`.
    pub fn remove_all_messages(&mut self, line: usize) -> Option<BundleId> {
        messages::remove_all(&mut self.line_map, line)
    }

    /// Current line and contents of the bundle `id`.
    pub fn find_bundle(&self, id: BundleId) -> Option<(usize, &MessageBundle)> {
        messages::find_bundle(&self.line_map, id)
    }

    /// Capture `line` for a semantic token request.
    pub fn semantic_request(&self, line: usize) -> Option<SemanticRequest> {
        semantic::request(&self.line_map, &self.buffer, line)
    }

    /// Merge the answer to `request` unless it has gone stale.
    pub fn merge_semantic_tokens(
        &mut self,
        request: &SemanticRequest,
        tokens: Vec<SemanticToken>,
    ) -> bool {
        semantic::merge(&mut self.line_map, &self.buffer, request, tokens)
    }

    /// Styled intervals for `lines`.
    pub fn highlight_intervals(&self, lines: Range<usize>) -> Vec<Interval> {
        highlight_intervals(&self.line_map, lines)
    }
}
