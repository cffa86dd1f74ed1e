//! Edit descriptions.
//!
//! Edits arrive from the host editing surface as `(location, old length, new length, text)`,
//! all in character offsets (Unicode scalar values).

use std::ops::Range;

/// A single replacement in the buffer.
///
/// Semantics:
/// - `location` is a character offset in the document **before** the edit is applied.
/// - `old_len` characters starting at `location` are replaced by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start character offset of the edit.
    pub location: usize,
    /// Number of characters replaced.
    pub old_len: usize,
    /// Replacement text (may be empty).
    pub text: String,
}

impl TextEdit {
    /// Replace `old_len` characters at `location` by `text`.
    pub fn replace(location: usize, old_len: usize, text: impl Into<String>) -> Self {
        Self {
            location,
            old_len,
            text: text.into(),
        }
    }

    /// Insert `text` at `location`.
    pub fn insert(location: usize, text: impl Into<String>) -> Self {
        Self::replace(location, 0, text)
    }

    /// Delete `len` characters at `location`.
    pub fn delete(location: usize, len: usize) -> Self {
        Self::replace(location, len, String::new())
    }

    /// Length of `text` in characters.
    pub fn new_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Change in buffer length caused by the edit.
    pub fn len_delta(&self) -> isize {
        self.new_len() as isize - self.old_len as isize
    }

    /// Replaced range in the pre-edit document.
    pub fn old_range(&self) -> Range<usize> {
        self.location..self.location + self.old_len
    }

    /// Range of the replacement text in the post-edit document.
    pub fn new_range(&self) -> Range<usize> {
        self.location..self.location + self.new_len()
    }

    /// The inserted character, if this edit inserts exactly one character and removes nothing.
    pub fn single_char_insertion(&self) -> Option<char> {
        if self.old_len != 0 {
            return None;
        }
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// Map a pre-edit position through `edit`.
///
/// Positions before the edit are unchanged, positions after the replaced range shift by the
/// length delta, and positions inside the replaced range collapse onto the edit location.
pub(crate) fn map_position(position: usize, edit: &TextEdit) -> usize {
    if position < edit.location {
        position
    } else if position >= edit.location + edit.old_len {
        (position as isize + edit.len_delta()) as usize
    } else {
        edit.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_count_chars() {
        let edit = TextEdit::replace(2, 3, "你好");
        assert_eq!(edit.new_len(), 2);
        assert_eq!(edit.len_delta(), -1);
        assert_eq!(edit.old_range(), 2..5);
        assert_eq!(edit.new_range(), 2..4);
    }

    #[test]
    fn test_single_char_insertion() {
        assert_eq!(TextEdit::insert(0, "(").single_char_insertion(), Some('('));
        assert_eq!(TextEdit::insert(0, "()").single_char_insertion(), None);
        assert_eq!(TextEdit::replace(0, 1, "(").single_char_insertion(), None);
        assert_eq!(TextEdit::delete(0, 1).single_char_insertion(), None);
    }

    #[test]
    fn test_map_position() {
        let edit = TextEdit::replace(4, 2, "abc");
        assert_eq!(map_position(3, &edit), 3);
        assert_eq!(map_position(4, &edit), 4);
        assert_eq!(map_position(5, &edit), 4);
        assert_eq!(map_position(6, &edit), 7);
    }
}
