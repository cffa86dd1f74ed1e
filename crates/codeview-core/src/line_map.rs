//! Line map: the authoritative line index ↔ character range mapping.
//!
//! Every line owns a half-open character range that includes its terminator (`\n`, `\r\n` or
//! a lone `\r`). Ranges are contiguous, strictly increasing and cover the whole buffer. There
//! is always at least one line; a trailing terminator produces an extra empty line.
//!
//! Per-line metadata ([`LineInfo`]) is attached by the retokenizer and read by the bracket
//! matcher, the completion engine and the message tracker. Consumers only ever see shared
//! borrows or clones of it.

use crate::messages::MessageBundle;
use crate::semantic::SemanticToken;
use crate::tokeniser::Token;
use ropey::Rope;
use std::ops::Range;

/// Lexical metadata of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineInfo {
    /// Nested comment depth at the start of the line.
    pub comment_depth_start: u32,
    /// Nested comment depth at the end of the line.
    pub comment_depth_end: u32,
    /// Number of `(` minus number of `)` on this line.
    pub round_bracket_diff: i32,
    /// Number of `[` minus number of `]` on this line.
    pub square_bracket_diff: i32,
    /// Curly bracket nesting depth at the start of the line.
    pub curly_bracket_depth_start: u32,
    /// Curly bracket nesting depth at the end of the line.
    pub curly_bracket_depth_end: u32,
    /// Tokens of the line, in line-local character ranges.
    pub tokens: Vec<Token>,
    /// Commented parts of the line, in line-local character ranges.
    pub comment_spans: Vec<Range<usize>>,
    /// Diagnostics attached to this line.
    pub messages: Option<MessageBundle>,
    /// Tokens merged in from an external semantic token source.
    pub semantic_tokens: Option<Vec<SemanticToken>>,
}

impl LineInfo {
    /// The token whose range ends exactly at the line-local `column`.
    pub fn token_ending_at(&self, column: usize) -> Option<&Token> {
        self.tokens.iter().find(|t| t.range.end == column)
    }

    /// Returns `true` if `column` lies inside one of the comment spans.
    pub fn is_commented(&self, column: usize) -> bool {
        self.comment_spans.iter().any(|s| s.contains(&column))
    }
}

/// A line: its character range and optional metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Character range, including the line terminator.
    pub range: Range<usize>,
    /// Metadata, absent until the line has been lexed.
    pub info: Option<LineInfo>,
}

impl Line {
    fn new(range: Range<usize>) -> Self {
        Self { range, info: None }
    }
}

/// Ordered sequence of lines covering a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    lines: Vec<Line>,
}

impl LineMap {
    /// Build the line map of `buffer`. All lines start without metadata.
    pub fn new(buffer: &Rope) -> Self {
        let lines = scan_lines(buffer, 0..buffer.len_chars(), true)
            .into_iter()
            .map(Line::new)
            .collect();
        Self { lines }
    }

    /// Number of lines (never zero).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`: even an empty buffer has one line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines, in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Character length of the covered buffer.
    pub fn end(&self) -> usize {
        self.lines.last().map_or(0, |l| l.range.end)
    }

    /// The line containing character `index`.
    ///
    /// The end-of-buffer index belongs to the last line; anything beyond is not found.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        let end = self.end();
        if index > end {
            return None;
        }
        if index == end {
            return Some(self.lines.len() - 1);
        }
        let line = self.lines.partition_point(|l| l.range.end <= index);
        (line < self.lines.len()).then_some(line)
    }

    /// Range and metadata of `line`.
    pub fn lookup(&self, line: usize) -> Option<&Line> {
        self.lines.get(line)
    }

    /// Metadata of `line`, if the line exists and has been lexed.
    pub fn info_of(&self, line: usize) -> Option<&LineInfo> {
        self.lines.get(line)?.info.as_ref()
    }

    /// The minimal contiguous range of lines overlapping `range`.
    ///
    /// An empty `range` selects the line containing its start.
    pub fn lines_containing(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.start > range.end || range.end > self.end() {
            return None;
        }
        let first = self.line_of(range.start)?;
        let last = if range.is_empty() {
            first
        } else {
            self.line_of(range.end - 1)?
        };
        Some(first..last + 1)
    }

    /// The character range spanned by a non-empty, in-bounds range of lines.
    pub fn char_range_of(&self, lines: Range<usize>) -> Option<Range<usize>> {
        if lines.is_empty() || lines.end > self.lines.len() {
            return None;
        }
        Some(self.lines[lines.start].range.start..self.lines[lines.end - 1].range.end)
    }

    /// The range of `line` without its terminator.
    pub fn content_range(&self, buffer: &Rope, line: usize) -> Option<Range<usize>> {
        let range = self.lines.get(line)?.range.clone();
        let mut end = range.end;
        if end > range.start && buffer.char(end - 1) == '\n' {
            end -= 1;
        }
        if end > range.start && buffer.char(end - 1) == '\r' {
            end -= 1;
        }
        Some(range.start..end)
    }

    /// Overwrite the metadata of `line`. Returns `false` if the line does not exist.
    pub fn set_info_of(&mut self, line: usize, info: LineInfo) -> bool {
        match self.lines.get_mut(line) {
            Some(entry) => {
                entry.info = Some(info);
                true
            }
            None => false,
        }
    }

    pub(crate) fn info_mut(&mut self, line: usize) -> Option<&mut Option<LineInfo>> {
        self.lines.get_mut(line).map(|l| &mut l.info)
    }

    /// Bring the map up to date after `buffer` was edited.
    ///
    /// `edited` is the range of the replacement text in the post-edit buffer and `delta` the
    /// change in buffer length. Lines overlapping the replaced region are dropped and only that
    /// region is rescanned; lines before are untouched, lines after are shifted by `delta`.
    /// Message bundles of dropped lines move to the rescanned line containing the mapped start
    /// of their old line, with message columns mapped through the edit.
    ///
    /// Returns the range of rescanned lines; none of them carries tokens until retokenized.
    pub fn update_after_edit(
        &mut self,
        buffer: &Rope,
        edited: Range<usize>,
        delta: isize,
    ) -> Range<usize> {
        let old_end = shift(edited.end, -delta);
        let last_line = self.lines.len() - 1;

        let mut first = self.line_of(edited.start).unwrap_or(last_line);
        // A `\r` ending the previous line may pair up with a `\n` at the start of the edit.
        if first > 0
            && self.lines[first].range.start == edited.start
            && buffer.char(edited.start - 1) == '\r'
        {
            first -= 1;
        }
        let last = self.line_of(old_end).unwrap_or(last_line);

        let scan_start = self.lines[first].range.start;
        let scan_end = shift(self.lines[last].range.end, delta);
        let fresh: Vec<Line> = scan_lines(buffer, scan_start..scan_end, last == last_line)
            .into_iter()
            .map(Line::new)
            .collect();
        let fresh_count = fresh.len();

        let removed: Vec<Line> = self.lines.splice(first..=last, fresh).collect();
        for line in &mut self.lines[first + fresh_count..] {
            line.range = shift(line.range.start, delta)..shift(line.range.end, delta);
        }

        let edit_old_len = old_end - edited.start;
        for line in removed {
            let Some(mut bundle) = line.info.and_then(|info| info.messages) else {
                continue;
            };
            let anchor = map_old_position(line.range.start, edited.start, edit_old_len, delta);
            let target = (first..first + fresh_count)
                .find(|&i| self.lines[i].range.end > anchor)
                .unwrap_or(first + fresh_count - 1);
            let target_start = self.lines[target].range.start;
            for located in &mut bundle.messages {
                let position = map_old_position(
                    line.range.start + located.column,
                    edited.start,
                    edit_old_len,
                    delta,
                );
                located.column = position.saturating_sub(target_start);
            }
            let info = self.lines[target].info.get_or_insert_with(LineInfo::default);
            match &mut info.messages {
                Some(existing) => existing.messages.extend(bundle.messages),
                None => info.messages = Some(bundle),
            }
        }

        first..first + fresh_count
    }
}

fn map_old_position(position: usize, location: usize, old_len: usize, delta: isize) -> usize {
    if position < location {
        position
    } else if position >= location + old_len {
        shift(position, delta)
    } else {
        location
    }
}

pub(crate) fn shift(value: usize, delta: isize) -> usize {
    (value as isize + delta) as usize
}

/// Split `range` of `buffer` into line ranges.
///
/// A trailing empty line is produced only when `range` replaces the last line of the map.
fn scan_lines(buffer: &Rope, range: Range<usize>, replaces_last: bool) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut line_start = range.start;
    let mut pos = range.start;
    let mut chars = buffer.slice(range.clone()).chars().peekable();

    while let Some(c) = chars.next() {
        pos += 1;
        match c {
            '\n' => {
                lines.push(line_start..pos);
                line_start = pos;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    pos += 1;
                }
                lines.push(line_start..pos);
                line_start = pos;
            }
            _ => {}
        }
    }

    if line_start < range.end || replaces_last {
        lines.push(line_start..range.end);
    }
    lines
}
