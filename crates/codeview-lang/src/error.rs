use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or validating a [`LanguageConfiguration`](crate::LanguageConfiguration).
pub enum LanguageConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("nested comment needs both an open and a close lexeme")]
    /// Only one half of the nested comment pair was configured.
    IncompleteNestedComment,

    #[error("empty literal lexeme for token kind {0}")]
    /// A literal rule had an empty lexeme, which could never advance the scanner.
    EmptyLexeme(String),

    #[error("empty pattern for token kind {0}")]
    /// A pattern rule had an empty pattern.
    EmptyPattern(String),
}
