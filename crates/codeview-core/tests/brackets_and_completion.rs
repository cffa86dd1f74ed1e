use codeview_core::{
    CodeDocument, LanguageConfiguration, TextEdit, TokenKind, TokenRuleDefinition, TokenTable,
    Tokeniser,
};
use pretty_assertions::assert_eq;

fn rust(text: &str) -> CodeDocument {
    CodeDocument::new(text, &LanguageConfiguration::rust()).unwrap()
}

fn type_char(document: &mut CodeDocument, text: &str) -> usize {
    let caret = document.caret();
    let outcome = document.apply_edit(TextEdit::insert(caret, text)).unwrap();
    outcome.completion_inserted
}

#[test]
fn test_bracket_symmetry() {
    let text = "fn f(a: [u8; 2]) {\n    if (a[0]) { g({}) }\n    // ) not a bracket\n}\n";
    let document = rust(text);
    let map = document.line_map();
    let all = 0..map.len();

    let mut pairs = 0;
    for (line, entry) in map.lines().iter().enumerate() {
        let info = entry.info.as_ref().unwrap();
        for token in info.tokens.iter().filter(|t| t.kind.is_opening_bracket()) {
            let end = entry.range.start + token.range.end;
            let partner = document
                .matching_bracket(end, all.clone())
                .unwrap_or_else(|| panic!("no partner for bracket ending at {end} on line {line}"));
            let back = document.matching_bracket(partner.end, all.clone());
            assert_eq!(back, Some(end - 1..end));
            pairs += 1;
        }
    }
    assert_eq!(pairs, 8);
}

#[test]
fn test_typing_round_bracket() {
    let mut document = rust("");
    assert_eq!(type_char(&mut document, "("), 1);
    assert_eq!(document.text(), "()");
    assert_eq!(document.caret(), 1);

    assert_eq!(type_char(&mut document, ")"), 0);
    assert_eq!(document.text(), "()");
    assert_eq!(document.caret(), 2);
}

#[test]
fn test_typing_nested_brackets() {
    let mut document = rust("");
    type_char(&mut document, "(");
    type_char(&mut document, "(");
    assert_eq!(document.text(), "(())");
    assert_eq!(document.caret(), 2);

    type_char(&mut document, "[");
    assert_eq!(document.text(), "(([]))");
    assert_eq!(document.caret(), 3);
}

#[test]
fn test_typing_line_break_in_braces() {
    let mut document = rust("fn f() ");
    document.set_caret(7).unwrap();
    type_char(&mut document, "{");
    assert_eq!(document.text(), "fn f() {}");

    let outcome = document
        .apply_edit(TextEdit::insert(document.caret(), "\n"))
        .unwrap();
    assert_eq!(document.text(), "fn f() {\n\n}");
    assert_eq!(outcome.caret, 9);
    assert_eq!(outcome.completion_inserted, 1);
    assert_eq!(document.line_map().line_of(outcome.caret), Some(1));
    assert_eq!(document.line_map().info_of(1).unwrap().curly_bracket_depth_start, 1);
    assert_eq!(document.line_map().info_of(2).unwrap().curly_bracket_depth_end, 0);
}

#[test]
fn test_moving_caret_cancels_continuation() {
    let mut document = rust("");
    type_char(&mut document, "(");
    document.set_caret(1).unwrap();
    type_char(&mut document, ")");
    assert_eq!(document.text(), "())");
}

#[test]
fn test_no_completion_without_single_char_closer() {
    let mut table = TokenTable::default();
    table.push(TokenRuleDefinition::literal("(", TokenKind::RoundBracketOpen));
    table.push(TokenRuleDefinition::literal("#)", TokenKind::RoundBracketClose));
    let tokeniser = Tokeniser::new(&table).unwrap();
    let mut document = CodeDocument::with_tokeniser("", tokeniser);

    assert_eq!(type_char(&mut document, "("), 0);
    assert_eq!(document.text(), "(");
}
