#![warn(missing_docs)]
//! Codeview Core - incremental tokenization and line tracking for code editor views
//!
//! # Overview
//!
//! `codeview-core` keeps a live mapping between buffer positions and logical lines and keeps
//! per-line lexical metadata up to date while the buffer is edited. Only the lines touched by an
//! edit are re-lexed, plus however many following lines a changed multi-line state (an opened or
//! closed nested comment, a changed curly bracket depth) reaches.
//!
//! Rendering, the host text view and language services are outside this crate; it exposes
//! affected ranges, styled intervals and diagnostics for them to consume.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  CodeDocument (edit loop)                   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Brackets · Completion · Messages · Semantic│  ← Consumers of line metadata
//! ├─────────────────────────────────────────────┤
//! │  Retokenizer (fixed-point propagation)      │  ← Incremental lexing
//! ├─────────────────────────────────────────────┤
//! │  Tokeniser (per-state rule tables)          │  ← Lexing
//! ├─────────────────────────────────────────────┤
//! │  Line Map (Rope-based)                      │  ← Line access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use codeview_core::{CodeDocument, LanguageConfiguration, TextEdit};
//!
//! let mut document = CodeDocument::new("/* a\nb */ c", &LanguageConfiguration::rust()).unwrap();
//! assert_eq!(document.line_map().info_of(1).unwrap().comment_depth_start, 1);
//!
//! // Closing the comment early uncomments the second line.
//! let outcome = document.apply_edit(TextEdit::insert(4, " */")).unwrap();
//! assert_eq!(outcome.affected_lines, 2);
//! assert_eq!(document.line_map().info_of(1).unwrap().comment_depth_start, 0);
//! ```
//!
//! # Module Description
//!
//! - [`line_map`] - Line index ↔ character range mapping with per-line metadata
//! - [`tokeniser`] - Stateful, table driven lexer
//! - [`retokenizer`] - Incremental re-lexing after edits
//! - [`brackets`] - Bracket matching
//! - [`completion`] - Automatic bracket completion
//! - [`messages`] - Diagnostics attached to lines
//! - [`semantic`] - Merging tokens from an external semantic token source
//! - [`highlight`] - Styled intervals for renderers
//! - [`document`] - The edit loop

pub mod brackets;
pub mod completion;
pub mod document;
pub mod edit;
pub mod highlight;
pub mod line_map;
pub mod messages;
pub mod retokenizer;
pub mod semantic;
pub mod tokeniser;

pub use brackets::matching_bracket;
pub use codeview_lang::{
    CommentLexemes, LanguageConfigError, LanguageConfiguration, Lexeme, StateTag, TokenKind,
    TokenRuleDefinition, TokenTable, Transition,
};
pub use completion::{CompletionEngine, FollowUp};
pub use document::{CodeDocument, EditError, EditOutcome};
pub use edit::TextEdit;
pub use highlight::{Interval, StyleId, highlight_intervals};
pub use line_map::{Line, LineInfo, LineMap};
pub use messages::{
    BundleId, LocatedMessage, Message, MessageBundle, MessageCategory, MessageId,
};
pub use retokenizer::{Retokenized, Retokenizer};
pub use semantic::{SemanticRequest, SemanticToken};
pub use tokeniser::{StateTransition, Token, TokenRule, Tokeniser, TokeniserError, TokeniserState};
