#![warn(missing_docs)]
//! `codeview-lang` - data-driven language configuration for `codeview-core`.
//!
//! A [`LanguageConfiguration`] describes everything the tokenization engine needs to know about
//! a language: string/number/identifier patterns, reserved words, and the single-line and
//! nested comment lexemes. It expands into an ordered token table per tokeniser state via
//! [`LanguageConfiguration::token_table`].
//!
//! This crate stays free of any regex engine; patterns are carried as source strings and are
//! compiled by the consumer.
//!
//! Configurations can be built in code (see the presets such as
//! [`LanguageConfiguration::swift`]) or loaded from YAML:
//!
//! ```rust
//! use codeview_lang::LanguageConfiguration;
//!
//! let yaml = r##"
//! name: Mini
//! comments:
//!   single_line: "#"
//! identifier_pattern: "[a-z]+"
//! reserved_identifiers: [let, in]
//! "##;
//!
//! let language = LanguageConfiguration::from_yaml(yaml).unwrap();
//! assert_eq!(language.name, "Mini");
//! assert!(language.comments.has_single_line());
//! ```

mod comment;
mod config;
mod error;
mod rules;
mod token;

pub use comment::CommentLexemes;
pub use config::{LanguageConfiguration, TokenTable};
pub use error::LanguageConfigError;
pub use rules::{Lexeme, StateTag, TokenRuleDefinition, Transition};
pub use token::TokenKind;
