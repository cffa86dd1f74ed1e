use serde::Deserialize;

/// The closed set of token kinds produced by the tokeniser.
///
/// Bracket kinds know their partner through [`TokenKind::matching_bracket`], which is all the
/// bracket matcher and the completion engine need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `(`
    RoundBracketOpen,
    /// `)`
    RoundBracketClose,
    /// `[`
    SquareBracketOpen,
    /// `]`
    SquareBracketClose,
    /// `{`
    CurlyBracketOpen,
    /// `}`
    CurlyBracketClose,
    /// A string literal.
    String,
    /// A character literal.
    Character,
    /// A numeric literal.
    Number,
    /// Start of a comment that extends to the end of the line.
    SingleLineComment,
    /// Opening lexeme of a (possibly nested) block comment.
    NestedCommentOpen,
    /// Closing lexeme of a (possibly nested) block comment.
    NestedCommentClose,
    /// A plain identifier.
    Identifier,
    /// A reserved identifier.
    Keyword,
    /// An operator symbol.
    Operator,
}

impl TokenKind {
    /// Returns `true` for `(`, `[` and `{`.
    pub fn is_opening_bracket(self) -> bool {
        matches!(
            self,
            Self::RoundBracketOpen | Self::SquareBracketOpen | Self::CurlyBracketOpen
        )
    }

    /// Returns `true` for `)`, `]` and `}`.
    pub fn is_closing_bracket(self) -> bool {
        matches!(
            self,
            Self::RoundBracketClose | Self::SquareBracketClose | Self::CurlyBracketClose
        )
    }

    /// Returns `true` for any bracket kind.
    pub fn is_bracket(self) -> bool {
        self.is_opening_bracket() || self.is_closing_bracket()
    }

    /// The partner of a bracket kind, or `None` for non-bracket kinds.
    pub fn matching_bracket(self) -> Option<Self> {
        match self {
            Self::RoundBracketOpen => Some(Self::RoundBracketClose),
            Self::RoundBracketClose => Some(Self::RoundBracketOpen),
            Self::SquareBracketOpen => Some(Self::SquareBracketClose),
            Self::SquareBracketClose => Some(Self::SquareBracketOpen),
            Self::CurlyBracketOpen => Some(Self::CurlyBracketClose),
            Self::CurlyBracketClose => Some(Self::CurlyBracketOpen),
            _ => None,
        }
    }

    /// Returns `true` for the comment marker kinds.
    pub fn is_comment_marker(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment | Self::NestedCommentOpen | Self::NestedCommentClose
        )
    }
}
