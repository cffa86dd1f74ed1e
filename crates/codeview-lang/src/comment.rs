use serde::Deserialize;

/// Comment lexemes for a language.
///
/// Either kind may be absent. Nested comments are only recognised when both the open and the
/// close lexeme are configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CommentLexemes {
    /// Lexeme starting a comment that runs to the end of the line (e.g. `//`, `--`).
    pub single_line: Option<String>,
    /// Opening lexeme of a nested comment (e.g. `/*`, `{-`).
    pub nested_open: Option<String>,
    /// Closing lexeme of a nested comment (e.g. `*/`, `-}`).
    pub nested_close: Option<String>,
}

impl CommentLexemes {
    /// Single-line comments only.
    pub fn single_line(lexeme: impl Into<String>) -> Self {
        Self {
            single_line: Some(lexeme.into()),
            nested_open: None,
            nested_close: None,
        }
    }

    /// Nested comments only.
    pub fn nested(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            single_line: None,
            nested_open: Some(open.into()),
            nested_close: Some(close.into()),
        }
    }

    /// Both single-line and nested comments.
    pub fn single_line_and_nested(
        single_line: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        Self {
            single_line: Some(single_line.into()),
            nested_open: Some(open.into()),
            nested_close: Some(close.into()),
        }
    }

    /// Returns `true` if a non-empty single-line comment lexeme is configured.
    pub fn has_single_line(&self) -> bool {
        self.single_line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both nested comment lexemes are configured and non-empty.
    pub fn has_nested(&self) -> bool {
        self.nested_open.as_deref().is_some_and(|s| !s.is_empty())
            && self.nested_close.as_deref().is_some_and(|s| !s.is_empty())
    }
}
