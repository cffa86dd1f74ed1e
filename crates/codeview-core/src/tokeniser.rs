//! Stateful, table-driven tokeniser.
//!
//! Each [`TokeniserState`] tag owns an ordered table of rules. At every scan position all rules
//! of the current state are tried; the longest lexeme wins and equal lengths resolve to the
//! rule declared first. Characters no rule matches are skipped without producing a token.
//!
//! Literal lexemes are kept in a per-state prefix trie. Interior trie nodes are marked
//! as body steps: they continue a multi-character lexeme but never terminate one.

use codeview_lang::{
    LanguageConfigError, LanguageConfiguration, Lexeme, StateTag, TokenKind, TokenTable,
    Transition,
};
use regex::Regex;
use std::ops::Range;
use thiserror::Error;

/// A token: kind plus a character range local to the lexed text (usually one line).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Character range.
    pub range: Range<usize>,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, range: Range<usize>) -> Self {
        Self { kind, range }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns `true` for a zero-length token (never produced by the tokeniser).
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Carry-over context of the tokeniser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokeniserState {
    /// Lexing code.
    #[default]
    Code,
    /// Lexing inside a nested comment; the depth is always at least one.
    NestedComment(u32),
}

impl TokeniserState {
    /// The state corresponding to a comment depth (`0` is [`TokeniserState::Code`]).
    pub fn from_comment_depth(depth: u32) -> Self {
        match depth {
            0 => Self::Code,
            n => Self::NestedComment(n),
        }
    }

    /// Current nested comment depth.
    pub fn comment_depth(self) -> u32 {
        match self {
            Self::Code => 0,
            Self::NestedComment(n) => n,
        }
    }

    /// The tag selecting the active token table.
    pub fn tag(self) -> StateTag {
        match self {
            Self::Code => StateTag::Code,
            Self::NestedComment(_) => StateTag::NestedComment,
        }
    }

    /// One level deeper into a nested comment.
    pub fn enter_nested_comment(self) -> Self {
        Self::NestedComment(self.comment_depth().saturating_add(1))
    }

    /// One level out of a nested comment; a no-op when already lexing code.
    pub fn leave_nested_comment(self) -> Self {
        Self::from_comment_depth(self.comment_depth().saturating_sub(1))
    }
}

/// State transition applied after a rule matched.
pub type StateTransition = fn(TokeniserState) -> TokeniserState;

/// A token rule with an arbitrary transition function.
#[derive(Debug, Clone)]
pub struct TokenRule {
    /// What the rule matches.
    pub lexeme: Lexeme,
    /// Kind of the produced token.
    pub kind: TokenKind,
    /// Optional state transition.
    pub transition: Option<StateTransition>,
}

fn transition_fn(transition: Transition) -> StateTransition {
    match transition {
        Transition::EnterNestedComment => TokeniserState::enter_nested_comment,
        Transition::LeaveNestedComment => TokeniserState::leave_nested_comment,
    }
}

#[derive(Debug, Error)]
/// Errors produced while building a [`Tokeniser`].
pub enum TokeniserError {
    #[error("regex compile error for pattern '{pattern}': {source}")]
    /// A pattern failed to compile.
    Regex {
        /// The offending pattern.
        pattern: String,
        /// The compiler error.
        #[source]
        source: regex::Error,
    },

    #[error("empty literal lexeme for {0:?}")]
    /// A literal rule had an empty lexeme.
    EmptyLiteral(TokenKind),

    #[error("invalid language configuration: {0}")]
    /// The language configuration failed validation.
    Config(#[from] LanguageConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Interior of a longer literal.
    Body,
    /// A complete literal of the rule with this declaration index.
    Accept(usize),
}

#[derive(Debug, Clone)]
struct TrieNode {
    children: Vec<(char, usize)>,
    step: Step,
}

impl TrieNode {
    fn body() -> Self {
        Self {
            children: Vec::new(),
            step: Step::Body,
        }
    }

    fn child(&self, c: char) -> Option<usize> {
        self.children.iter().find(|(k, _)| *k == c).map(|(_, n)| *n)
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    kind: TokenKind,
    transition: Option<StateTransition>,
    literal: Option<String>,
}

#[derive(Debug, Clone)]
struct StateTable {
    rules: Vec<CompiledRule>,
    trie: Vec<TrieNode>,
    patterns: Vec<(usize, Regex)>,
}

/// A lexeme match: rule index, length in chars and in bytes.
#[derive(Debug, Clone, Copy)]
struct Match {
    rule: usize,
    chars: usize,
    bytes: usize,
}

impl StateTable {
    fn new() -> Self {
        Self {
            rules: Vec::new(),
            trie: vec![TrieNode::body()],
            patterns: Vec::new(),
        }
    }

    fn push(&mut self, rule: TokenRule) -> Result<(), TokeniserError> {
        let index = self.rules.len();
        let literal = match rule.lexeme {
            Lexeme::Literal(text) => {
                if text.is_empty() {
                    return Err(TokeniserError::EmptyLiteral(rule.kind));
                }
                self.insert_literal(&text, index);
                Some(text)
            }
            Lexeme::Pattern(pattern) => {
                let regex = Regex::new(&format!(r"\A(?:{pattern})"))
                    .map_err(|source| TokeniserError::Regex { pattern, source })?;
                self.patterns.push((index, regex));
                None
            }
        };
        self.rules.push(CompiledRule {
            kind: rule.kind,
            transition: rule.transition,
            literal,
        });
        Ok(())
    }

    fn insert_literal(&mut self, text: &str, rule: usize) {
        let mut node = 0;
        for c in text.chars() {
            node = match self.trie[node].child(c) {
                Some(next) => next,
                None => {
                    self.trie.push(TrieNode::body());
                    let next = self.trie.len() - 1;
                    self.trie[node].children.push((c, next));
                    next
                }
            };
        }
        // The first declaration of a literal keeps it.
        if self.trie[node].step == Step::Body {
            self.trie[node].step = Step::Accept(rule);
        }
    }

    fn longest_literal(&self, rest: &str) -> Option<Match> {
        let mut node = 0;
        let mut best = None;
        for (chars, (offset, c)) in rest.char_indices().enumerate() {
            let Some(next) = self.trie[node].child(c) else {
                break;
            };
            node = next;
            if let Step::Accept(rule) = self.trie[node].step {
                best = Some(Match {
                    rule,
                    chars: chars + 1,
                    bytes: offset + c.len_utf8(),
                });
            }
        }
        best
    }

    fn longest_match(&self, rest: &str) -> Option<Match> {
        let mut best = self.longest_literal(rest);
        for (rule, regex) in &self.patterns {
            let Some(m) = regex.find(rest) else {
                continue;
            };
            if m.end() == 0 {
                continue;
            }
            let candidate = Match {
                rule: *rule,
                chars: rest[..m.end()].chars().count(),
                bytes: m.end(),
            };
            best = match best {
                Some(current)
                    if current.chars > candidate.chars
                        || (current.chars == candidate.chars && current.rule < candidate.rule) =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }
        best
    }
}

/// A compiled, immutable tokeniser.
#[derive(Debug, Clone)]
pub struct Tokeniser {
    code: StateTable,
    nested_comment: StateTable,
}

impl Tokeniser {
    /// Compile the token tables of a language configuration.
    pub fn for_language(language: &LanguageConfiguration) -> Result<Self, TokeniserError> {
        language.validate()?;
        Self::new(&language.token_table())
    }

    /// Compile declarative token tables.
    pub fn new(table: &TokenTable) -> Result<Self, TokeniserError> {
        let rules = [StateTag::Code, StateTag::NestedComment]
            .into_iter()
            .flat_map(|tag| {
                table.rules(tag).iter().map(move |rule| {
                    (
                        tag,
                        TokenRule {
                            lexeme: rule.lexeme.clone(),
                            kind: rule.kind,
                            transition: rule.transition.map(transition_fn),
                        },
                    )
                })
            });
        Self::from_rules(rules)
    }

    /// Compile rules with arbitrary transition functions, in declaration order.
    pub fn from_rules(
        rules: impl IntoIterator<Item = (StateTag, TokenRule)>,
    ) -> Result<Self, TokeniserError> {
        let mut tokeniser = Self {
            code: StateTable::new(),
            nested_comment: StateTable::new(),
        };
        for (tag, rule) in rules {
            tokeniser.table_mut(tag).push(rule)?;
        }
        Ok(tokeniser)
    }

    fn table(&self, tag: StateTag) -> &StateTable {
        match tag {
            StateTag::Code => &self.code,
            StateTag::NestedComment => &self.nested_comment,
        }
    }

    fn table_mut(&mut self, tag: StateTag) -> &mut StateTable {
        match tag {
            StateTag::Code => &mut self.code,
            StateTag::NestedComment => &mut self.nested_comment,
        }
    }

    /// Lex `text` starting in `state`.
    ///
    /// The returned iterator is lazy and finite, and can be cloned to restart from any point.
    /// Each item pairs a token with the state in effect after it.
    pub fn tokenize<'a>(&'a self, text: &'a str, state: TokeniserState) -> Tokens<'a> {
        Tokens {
            tokeniser: self,
            text,
            byte: 0,
            column: 0,
            state,
        }
    }

    /// The literal lexeme registered for `kind` in the code table, if any.
    pub fn literal_lexeme(&self, kind: TokenKind) -> Option<&str> {
        self.code
            .rules
            .iter()
            .find(|r| r.kind == kind && r.literal.is_some())
            .and_then(|r| r.literal.as_deref())
    }
}

/// Lazy token stream produced by [`Tokeniser::tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    tokeniser: &'a Tokeniser,
    text: &'a str,
    byte: usize,
    column: usize,
    state: TokeniserState,
}

impl Tokens<'_> {
    /// The state the next token will be lexed in.
    pub fn state(&self) -> TokeniserState {
        self.state
    }

    /// The character offset the scan has reached.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Iterator for Tokens<'_> {
    type Item = (Token, TokeniserState);

    fn next(&mut self) -> Option<Self::Item> {
        while self.byte < self.text.len() {
            let rest = &self.text[self.byte..];
            let table = self.tokeniser.table(self.state.tag());

            let Some(found) = table.longest_match(rest) else {
                // Gap character: belongs to no lexeme.
                let c = rest.chars().next()?;
                self.byte += c.len_utf8();
                self.column += 1;
                continue;
            };

            let rule = &table.rules[found.rule];
            let token = Token::new(rule.kind, self.column..self.column + found.chars);
            self.byte += found.bytes;
            self.column += found.chars;
            if let Some(transition) = rule.transition {
                self.state = transition(self.state);
            }
            return Some((token, self.state));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeview_lang::TokenRuleDefinition;
    use pretty_assertions::assert_eq;

    fn kinds(tokeniser: &Tokeniser, text: &str) -> Vec<(TokenKind, Range<usize>)> {
        tokeniser
            .tokenize(text, TokeniserState::Code)
            .map(|(t, _)| (t.kind, t.range))
            .collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::haskell()).unwrap();
        let (token, state) = tokeniser
            .tokenize("{- x", TokeniserState::Code)
            .next()
            .unwrap();
        assert_eq!(token, Token::new(TokenKind::NestedCommentOpen, 0..2));
        assert_eq!(state, TokeniserState::NestedComment(1));
    }

    #[test]
    fn test_equal_length_prefers_declaration_order() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::swift()).unwrap();
        assert_eq!(
            kinds(&tokeniser, "let letter"),
            vec![(TokenKind::Keyword, 0..3), (TokenKind::Identifier, 4..10)]
        );

        let mut table = TokenTable::default();
        table.push(TokenRuleDefinition::pattern("[a-z]+", TokenKind::Identifier));
        table.push(TokenRuleDefinition::literal("if", TokenKind::Keyword));
        let identifier_first = Tokeniser::new(&table).unwrap();
        assert_eq!(
            kinds(&identifier_first, "if"),
            vec![(TokenKind::Identifier, 0..2)]
        );
    }

    #[test]
    fn test_gap_characters_are_skipped() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::none()).unwrap();
        assert_eq!(
            kinds(&tokeniser, "a (b) é]"),
            vec![
                (TokenKind::RoundBracketOpen, 2..3),
                (TokenKind::RoundBracketClose, 4..5),
                (TokenKind::SquareBracketClose, 7..8),
            ]
        );
    }

    #[test]
    fn test_body_prefix_is_not_a_token() {
        let mut table = TokenTable::default();
        table.push(TokenRuleDefinition::literal("=>", TokenKind::Operator));
        let tokeniser = Tokeniser::new(&table).unwrap();
        assert!(kinds(&tokeniser, "= =").is_empty());
        assert_eq!(kinds(&tokeniser, "==>"), vec![(TokenKind::Operator, 1..3)]);
    }

    #[test]
    fn test_nested_depth_and_stray_close() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::rust()).unwrap();
        let states: Vec<_> = tokeniser
            .tokenize("*/ /* /* */", TokeniserState::Code)
            .map(|(_, s)| s)
            .collect();
        assert_eq!(
            states,
            vec![
                TokeniserState::Code,
                TokeniserState::NestedComment(1),
                TokeniserState::NestedComment(2),
                TokeniserState::NestedComment(1),
            ]
        );
    }

    #[test]
    fn test_comment_state_ignores_code_rules() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::rust()).unwrap();
        let tokens: Vec<_> = tokeniser
            .tokenize("(x) */ (", TokeniserState::NestedComment(1))
            .map(|(t, _)| t.kind)
            .collect();
        assert_eq!(
            tokens,
            vec![TokenKind::NestedCommentClose, TokenKind::RoundBracketOpen]
        );
    }

    #[test]
    fn test_tokens_are_restartable() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::swift()).unwrap();
        let mut tokens = tokeniser.tokenize("a /* b */ c", TokeniserState::Code);
        tokens.next();
        tokens.next();
        let checkpoint = tokens.clone();
        assert_eq!(checkpoint.state(), TokeniserState::NestedComment(1));
        let rest: Vec<_> = tokens.collect();
        let again: Vec<_> = checkpoint.collect();
        assert_eq!(rest, again);
    }

    #[test]
    fn test_multibyte_columns_are_chars() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::swift()).unwrap();
        assert_eq!(
            kinds(&tokeniser, "\"你好\" x"),
            vec![(TokenKind::String, 0..4), (TokenKind::Identifier, 5..6)]
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut table = TokenTable::default();
        table.push(TokenRuleDefinition::pattern("(", TokenKind::Operator));
        assert!(matches!(
            Tokeniser::new(&table),
            Err(TokeniserError::Regex { .. })
        ));
    }

    #[test]
    fn test_custom_transition_function() {
        fn always_deep(_: TokeniserState) -> TokeniserState {
            TokeniserState::NestedComment(5)
        }
        let tokeniser = Tokeniser::from_rules([(
            StateTag::Code,
            TokenRule {
                lexeme: Lexeme::Literal("#[".to_string()),
                kind: TokenKind::NestedCommentOpen,
                transition: Some(always_deep),
            },
        )])
        .unwrap();
        let (_, state) = tokeniser
            .tokenize("#[", TokeniserState::Code)
            .next()
            .unwrap();
        assert_eq!(state.comment_depth(), 5);
    }

    #[test]
    fn test_literal_lexeme_lookup() {
        let tokeniser = Tokeniser::for_language(&LanguageConfiguration::swift()).unwrap();
        assert_eq!(
            tokeniser.literal_lexeme(TokenKind::CurlyBracketClose),
            Some("}")
        );
        assert_eq!(tokeniser.literal_lexeme(TokenKind::String), None);
    }
}
