use crate::{
    CommentLexemes, LanguageConfigError, Lexeme, StateTag, TokenKind, TokenRuleDefinition,
    Transition,
};
use serde::Deserialize;

/// Ordered token tables, one per [`StateTag`].
///
/// Order matters: when two rules match lexemes of the same length at the same position, the
/// rule declared first wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenTable {
    /// Rules active while lexing code.
    pub code: Vec<TokenRuleDefinition>,
    /// Rules active inside a nested comment.
    pub nested_comment: Vec<TokenRuleDefinition>,
}

impl TokenTable {
    /// The rules for a state tag.
    pub fn rules(&self, tag: StateTag) -> &[TokenRuleDefinition] {
        match tag {
            StateTag::Code => &self.code,
            StateTag::NestedComment => &self.nested_comment,
        }
    }

    /// Append a rule to the table of its own state.
    pub fn push(&mut self, rule: TokenRuleDefinition) {
        match rule.state {
            StateTag::Code => self.code.push(rule),
            StateTag::NestedComment => self.nested_comment.push(rule),
        }
    }
}

/// Static description of a language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanguageConfiguration {
    /// Display name.
    pub name: String,
    /// Comment lexemes.
    pub comments: CommentLexemes,
    /// Pattern for string literals.
    pub string_pattern: Option<String>,
    /// Pattern for character literals.
    pub character_pattern: Option<String>,
    /// Pattern for numeric literals.
    pub number_pattern: Option<String>,
    /// Pattern for identifiers.
    pub identifier_pattern: Option<String>,
    /// Pattern for operators.
    pub operator_pattern: Option<String>,
    /// Identifiers lexed as [`TokenKind::Keyword`].
    pub reserved_identifiers: Vec<String>,
    /// Extra rules, placed after the comment rules and before keywords and identifiers.
    pub rules: Vec<TokenRuleDefinition>,
}

impl Default for LanguageConfiguration {
    fn default() -> Self {
        Self::none()
    }
}

const BRACKETS: [(&str, TokenKind); 6] = [
    ("(", TokenKind::RoundBracketOpen),
    (")", TokenKind::RoundBracketClose),
    ("[", TokenKind::SquareBracketOpen),
    ("]", TokenKind::SquareBracketClose),
    ("{", TokenKind::CurlyBracketOpen),
    ("}", TokenKind::CurlyBracketClose),
];

const NUMBER_PATTERN: &str = r"[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9]+)?|0x[0-9A-Fa-f_]+";
const C_STRING_PATTERN: &str = r#""(?:\\.|[^"\\])*""#;
const C_IDENTIFIER_PATTERN: &str = r"[A-Za-z_][A-Za-z0-9_]*";

impl LanguageConfiguration {
    /// Plain text: brackets only.
    pub fn none() -> Self {
        Self {
            name: "Text".to_string(),
            comments: CommentLexemes::default(),
            string_pattern: None,
            character_pattern: None,
            number_pattern: None,
            identifier_pattern: None,
            operator_pattern: None,
            reserved_identifiers: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Swift.
    pub fn swift() -> Self {
        Self {
            name: "Swift".to_string(),
            comments: CommentLexemes::single_line_and_nested("//", "/*", "*/"),
            string_pattern: Some(C_STRING_PATTERN.to_string()),
            character_pattern: None,
            number_pattern: Some(NUMBER_PATTERN.to_string()),
            identifier_pattern: Some(C_IDENTIFIER_PATTERN.to_string()),
            operator_pattern: Some(r"[+\-*/%=<>!&|^~?]".to_string()),
            reserved_identifiers: words(&[
                "associatedtype", "class", "deinit", "enum", "extension", "func", "import",
                "init", "inout", "let", "operator", "protocol", "static", "struct", "subscript",
                "typealias", "var", "break", "case", "continue", "default", "do", "else",
                "fallthrough", "for", "guard", "if", "in", "repeat", "return", "switch", "where",
                "while", "as", "catch", "false", "is", "nil", "self", "Self", "super", "throw",
                "throws", "true", "try",
            ]),
            rules: Vec::new(),
        }
    }

    /// Haskell (nested `{- -}` comments).
    pub fn haskell() -> Self {
        Self {
            name: "Haskell".to_string(),
            comments: CommentLexemes::single_line_and_nested("--", "{-", "-}"),
            string_pattern: Some(C_STRING_PATTERN.to_string()),
            character_pattern: Some(r"'(?:\\.|[^'\\])'".to_string()),
            number_pattern: Some(NUMBER_PATTERN.to_string()),
            identifier_pattern: Some(r"[A-Za-z_][A-Za-z0-9_']*".to_string()),
            operator_pattern: Some(r"[!#$%&*+./<=>?@\\^|\-~:]".to_string()),
            reserved_identifiers: words(&[
                "case", "class", "data", "default", "deriving", "do", "else", "foreign", "if",
                "import", "in", "infix", "infixl", "infixr", "instance", "let", "module",
                "newtype", "of", "then", "type", "where",
            ]),
            rules: Vec::new(),
        }
    }

    /// Rust (block comments nest).
    pub fn rust() -> Self {
        Self {
            name: "Rust".to_string(),
            comments: CommentLexemes::single_line_and_nested("//", "/*", "*/"),
            string_pattern: Some(C_STRING_PATTERN.to_string()),
            character_pattern: Some(r"'(?:\\.|[^'\\])'".to_string()),
            number_pattern: Some(NUMBER_PATTERN.to_string()),
            identifier_pattern: Some(C_IDENTIFIER_PATTERN.to_string()),
            operator_pattern: Some(r"[+\-*/%=<>!&|^~?@]".to_string()),
            reserved_identifiers: words(&[
                "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
                "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
                "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
                "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
            ]),
            rules: Vec::new(),
        }
    }

    /// Load a configuration from YAML and validate it.
    pub fn from_yaml(text: &str) -> Result<Self, LanguageConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for lexemes the tokeniser could never use.
    pub fn validate(&self) -> Result<(), LanguageConfigError> {
        let comments = &self.comments;
        if comments.nested_open.is_some() != comments.nested_close.is_some() {
            return Err(LanguageConfigError::IncompleteNestedComment);
        }

        for rule in &self.rules {
            match &rule.lexeme {
                Lexeme::Literal(s) if s.is_empty() => {
                    return Err(LanguageConfigError::EmptyLexeme(format!("{:?}", rule.kind)));
                }
                Lexeme::Pattern(p) if p.is_empty() => {
                    return Err(LanguageConfigError::EmptyPattern(format!("{:?}", rule.kind)));
                }
                _ => {}
            }
        }

        if self.reserved_identifiers.iter().any(|w| w.is_empty()) {
            return Err(LanguageConfigError::EmptyLexeme(format!(
                "{:?}",
                TokenKind::Keyword
            )));
        }

        Ok(())
    }

    /// Expand the configuration into ordered token tables.
    ///
    /// Code state order: brackets, string, character, number, comment lexemes, extra rules,
    /// reserved identifiers, identifier, operator. Reserved identifiers precede the identifier
    /// pattern so that an equal-length match resolves to [`TokenKind::Keyword`].
    pub fn token_table(&self) -> TokenTable {
        let mut table = TokenTable::default();

        for (lexeme, kind) in BRACKETS {
            table.push(TokenRuleDefinition::literal(lexeme, kind));
        }

        let patterns = [
            (&self.string_pattern, TokenKind::String),
            (&self.character_pattern, TokenKind::Character),
            (&self.number_pattern, TokenKind::Number),
        ];
        for (pattern, kind) in patterns {
            if let Some(p) = pattern.as_deref().filter(|p| !p.is_empty()) {
                table.push(TokenRuleDefinition::pattern(p, kind));
            }
        }

        if let Some(lexeme) = self.comments.single_line.as_deref().filter(|s| !s.is_empty()) {
            table.push(TokenRuleDefinition::literal(lexeme, TokenKind::SingleLineComment));
        }

        if self.comments.has_nested()
            && let (Some(open), Some(close)) = (
                self.comments.nested_open.as_deref(),
                self.comments.nested_close.as_deref(),
            )
        {
            for state in [StateTag::Code, StateTag::NestedComment] {
                table.push(
                    TokenRuleDefinition::literal(open, TokenKind::NestedCommentOpen)
                        .in_state(state)
                        .with_transition(Transition::EnterNestedComment),
                );
                table.push(
                    TokenRuleDefinition::literal(close, TokenKind::NestedCommentClose)
                        .in_state(state)
                        .with_transition(Transition::LeaveNestedComment),
                );
            }
        }

        for rule in &self.rules {
            table.push(rule.clone());
        }

        for word in &self.reserved_identifiers {
            table.push(TokenRuleDefinition::literal(word.as_str(), TokenKind::Keyword));
        }

        let trailing = [
            (&self.identifier_pattern, TokenKind::Identifier),
            (&self.operator_pattern, TokenKind::Operator),
        ];
        for (pattern, kind) in trailing {
            if let Some(p) = pattern.as_deref().filter(|p| !p.is_empty()) {
                table.push(TokenRuleDefinition::pattern(p, kind));
            }
        }

        table
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_none_has_only_brackets() {
        let table = LanguageConfiguration::none().token_table();
        assert_eq!(table.code.len(), 6);
        assert!(table.nested_comment.is_empty());
    }

    #[test]
    fn test_keywords_precede_identifier_pattern() {
        let table = LanguageConfiguration::swift().token_table();
        let keyword = table
            .code
            .iter()
            .position(|r| r.kind == TokenKind::Keyword)
            .unwrap();
        let identifier = table
            .code
            .iter()
            .position(|r| r.kind == TokenKind::Identifier)
            .unwrap();
        assert!(keyword < identifier);
    }

    #[test]
    fn test_nested_comment_rules_in_both_states() {
        let table = LanguageConfiguration::haskell().token_table();
        let in_comment: Vec<_> = table
            .nested_comment
            .iter()
            .map(|r| (r.lexeme.clone(), r.transition))
            .collect();
        assert_eq!(
            in_comment,
            vec![
                (
                    Lexeme::Literal("{-".to_string()),
                    Some(Transition::EnterNestedComment)
                ),
                (
                    Lexeme::Literal("-}".to_string()),
                    Some(Transition::LeaveNestedComment)
                ),
            ]
        );
        assert!(
            table
                .code
                .iter()
                .any(|r| r.kind == TokenKind::NestedCommentOpen)
        );
    }

    #[test]
    fn test_validate_rejects_half_nested_comment() {
        let mut config = LanguageConfiguration::none();
        config.comments.nested_open = Some("/*".to_string());
        assert!(matches!(
            config.validate(),
            Err(LanguageConfigError::IncompleteNestedComment)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_rule_lexeme() {
        let mut config = LanguageConfiguration::none();
        config
            .rules
            .push(TokenRuleDefinition::literal("", TokenKind::Operator));
        assert!(matches!(
            config.validate(),
            Err(LanguageConfigError::EmptyLexeme(_))
        ));
    }
}
