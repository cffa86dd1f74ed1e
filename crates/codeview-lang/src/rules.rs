use crate::TokenKind;
use serde::Deserialize;

/// How a token rule recognises its lexeme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lexeme {
    /// An exact string.
    Literal(String),
    /// A regular expression, anchored at the scan position by the tokeniser.
    Pattern(String),
}

impl Lexeme {
    /// The literal text, if this is a literal lexeme.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            Self::Pattern(_) => None,
        }
    }
}

/// Tag of a tokeniser state. Each tag owns one token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    /// Lexing regular code.
    #[default]
    Code,
    /// Lexing inside a nested comment (at any depth).
    NestedComment,
}

/// A named state transition attached to a token rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Increase the nested comment depth by one.
    EnterNestedComment,
    /// Decrease the nested comment depth by one, saturating at code.
    LeaveNestedComment,
}

/// One entry of a token table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenRuleDefinition {
    /// The state whose table this rule belongs to.
    #[serde(default)]
    pub state: StateTag,
    /// What the rule matches.
    #[serde(flatten)]
    pub lexeme: Lexeme,
    /// The kind of token produced.
    pub kind: TokenKind,
    /// Optional state change applied after the match.
    #[serde(default)]
    pub transition: Option<Transition>,
}

impl TokenRuleDefinition {
    /// A literal rule in the code state.
    pub fn literal(lexeme: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            state: StateTag::Code,
            lexeme: Lexeme::Literal(lexeme.into()),
            kind,
            transition: None,
        }
    }

    /// A pattern rule in the code state.
    pub fn pattern(pattern: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            state: StateTag::Code,
            lexeme: Lexeme::Pattern(pattern.into()),
            kind,
            transition: None,
        }
    }

    /// Move the rule into another state's table.
    pub fn in_state(mut self, state: StateTag) -> Self {
        self.state = state;
        self
    }

    /// Attach a state transition.
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}
