//! Message tracking.
//!
//! Diagnostics are grouped per line into a [`MessageBundle`] stored in the line's
//! [`LineInfo`](crate::line_map::LineInfo). A bundle has a process-wide unique [`BundleId`]
//! that does not depend on the line number, so a bundle stays addressable while edits move it
//! around. After each edit, [`invalidated_bundles`] reports which bundles may now sit at a
//! wrong position.

use crate::edit::TextEdit;
use crate::line_map::{LineInfo, LineMap};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUNDLE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a message bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(u64);

impl BundleId {
    fn fresh() -> Self {
        Self(NEXT_BUNDLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable identity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    fn fresh() -> Self {
        Self(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Message categories, ordered by increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageCategory {
    /// Live (evaluation) output.
    Live,
    /// Informational message.
    Informational,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identity used for replacement and removal.
    pub id: MessageId,
    /// Category.
    pub category: MessageCategory,
    /// Number of characters the message refers to.
    pub length: usize,
    /// One-line summary.
    pub summary: String,
    /// Optional longer description.
    pub description: Option<String>,
}

impl Message {
    /// A new message with a fresh identity.
    pub fn new(category: MessageCategory, summary: impl Into<String>) -> Self {
        Self {
            id: MessageId::fresh(),
            category,
            length: 1,
            summary: summary.into(),
            description: None,
        }
    }

    /// Set the referenced length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A message at a column of its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedMessage {
    /// Character column within the line.
    pub column: usize,
    /// The message.
    pub message: Message,
}

impl LocatedMessage {
    /// Locate `message` at `column`.
    pub fn new(column: usize, message: Message) -> Self {
        Self { column, message }
    }
}

/// All messages of one line, under a stable identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBundle {
    /// Stable identity.
    pub id: BundleId,
    /// The messages.
    pub messages: Vec<LocatedMessage>,
}

impl MessageBundle {
    /// A bundle with a fresh identity.
    pub fn new(messages: Vec<LocatedMessage>) -> Self {
        Self {
            id: BundleId::fresh(),
            messages,
        }
    }

    /// Returns `true` if the bundle holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most severe category in the bundle.
    pub fn severity(&self) -> Option<MessageCategory> {
        self.messages.iter().map(|m| m.message.category).max()
    }
}

/// Attach `message` to `line`.
///
/// Creates the line's bundle on first use. A message with the same identity is replaced in
/// place, otherwise the message is appended. Returns the bundle id, or `None` if the line does
/// not exist.
pub fn add(map: &mut LineMap, message: LocatedMessage, line: usize) -> Option<BundleId> {
    let info = map.info_mut(line)?.get_or_insert_with(LineInfo::default);
    let bundle = info
        .messages
        .get_or_insert_with(|| MessageBundle::new(Vec::new()));
    match bundle
        .messages
        .iter_mut()
        .find(|m| m.message.id == message.message.id)
    {
        Some(existing) => *existing = message,
        None => bundle.messages.push(message),
    }
    Some(bundle.id)
}

/// Remove the message with identity `id` from whichever line holds it.
///
/// Scans all lines. The bundle stays in place even when it becomes empty. Returns the line the
/// message was removed from.
pub fn remove(map: &mut LineMap, id: MessageId) -> Option<usize> {
    for line in 0..map.len() {
        let Some(Some(info)) = map.info_mut(line) else {
            continue;
        };
        let Some(bundle) = info.messages.as_mut() else {
            continue;
        };
        if let Some(position) = bundle.messages.iter().position(|m| m.message.id == id) {
            bundle.messages.remove(position);
            return Some(line);
        }
    }
    None
}

/// Snapshot of the bundle attached to `line`.
pub fn messages_at(map: &LineMap, line: usize) -> Option<MessageBundle> {
    map.info_of(line)?.messages.clone()
}

/// Remove all messages of `line`, keeping its (now empty) bundle and identity.
pub fn remove_all(map: &mut LineMap, line: usize) -> Option<BundleId> {
    let bundle = map.info_mut(line)?.as_mut()?.messages.as_mut()?;
    bundle.messages.clear();
    Some(bundle.id)
}

/// Drop the bundle of `line` entirely.
pub fn clear(map: &mut LineMap, line: usize) -> Option<MessageBundle> {
    map.info_mut(line)?.as_mut()?.messages.take()
}

/// Locate a bundle by identity. Scans all lines.
pub fn find_bundle(map: &LineMap, id: BundleId) -> Option<(usize, &MessageBundle)> {
    map.lines().iter().enumerate().find_map(|(line, entry)| {
        let bundle = entry.info.as_ref()?.messages.as_ref()?;
        (bundle.id == id).then_some((line, bundle))
    })
}

/// Bundles whose position can no longer be trusted after `edit`.
///
/// Must be called before the line map is updated. Covers every line from the one holding the
/// edit's location through the one holding the end of the replaced text, so a removed
/// terminator also touches the line it joins. On the first line a bundle is invalidated only
/// if one of its messages sits at or after the edit's column; on every further line the bundle
/// is always invalidated.
pub fn invalidated_bundles(map: &LineMap, edit: &TextEdit) -> Vec<BundleId> {
    let (Some(first), Some(last)) = (
        map.line_of(edit.location),
        map.line_of(edit.location + edit.old_len),
    ) else {
        return Vec::new();
    };
    let mut invalidated = Vec::new();
    for line in first..=last {
        let Some(entry) = map.lookup(line) else {
            continue;
        };
        let Some(bundle) = entry.info.as_ref().and_then(|i| i.messages.as_ref()) else {
            continue;
        };
        if line == first {
            let column = edit.location - entry.range.start;
            if bundle.messages.iter().any(|m| m.column >= column) {
                invalidated.push(bundle.id);
            }
        } else {
            invalidated.push(bundle.id);
        }
    }
    invalidated
}
