use codeview_core::{
    CodeDocument, LanguageConfiguration, LineMap, Retokenizer, TextEdit, Tokeniser,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ropey::Rope;

const FRAGMENTS: &[&str] = &[
    "", "a", "x y", " ", "(", ")", "[", "]", "{", "}", "/*", "*/", "//", "\n", "\r\n", "\"",
    "'c'", "42", "/* a\n b */", "fn f() {\n", "}\n", "{-", "-}", "--", "\r",
];

fn fresh_map(text: &str, language: &LanguageConfiguration) -> LineMap {
    CodeDocument::new(text, language)
        .unwrap()
        .line_map()
        .clone()
}

fn assert_coverage(map: &LineMap, len: usize) {
    assert!(!map.is_empty());
    let lines = map.lines();
    assert_eq!(lines[0].range.start, 0);
    assert_eq!(lines[lines.len() - 1].range.end, len);
    for pair in lines.windows(2) {
        assert_eq!(pair[0].range.end, pair[1].range.start);
        assert!(pair[0].range.start < pair[0].range.end);
    }
}

fn random_edit(rng: &mut StdRng, len: usize) -> TextEdit {
    let location = rng.gen_range(0..=len);
    let old_len = rng.gen_range(0..=(len - location).min(4));
    let text = FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())];
    TextEdit::replace(location, old_len, text)
}

fn run_random_session(language: &LanguageConfiguration, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut document = CodeDocument::new("fn main() {\n    /* x */ (1)\n}\n", language).unwrap();

    for step in 0..300 {
        let edit = random_edit(&mut rng, document.len_chars());
        document.apply_edit(edit.clone()).unwrap();

        let text = document.text();
        assert_coverage(document.line_map(), document.len_chars());
        assert_eq!(
            document.line_map(),
            &fresh_map(&text, language),
            "seed {seed}, step {step}, edit {edit:?}, text {text:?}"
        );
    }
}

#[test]
fn test_incremental_matches_full_rust() {
    for seed in 0..8 {
        run_random_session(&LanguageConfiguration::rust(), seed);
    }
}

#[test]
fn test_incremental_matches_full_haskell() {
    for seed in 100..104 {
        run_random_session(&LanguageConfiguration::haskell(), seed);
    }
}

#[test]
fn test_coverage_of_terminators() {
    for text in ["", "a", "a\n", "a\r\nb", "a\rb\r", "\n\n", "\r\n\r\n"] {
        let map = LineMap::new(&Rope::from_str(text));
        assert_coverage(&map, text.chars().count());
    }
    assert_eq!(LineMap::new(&Rope::from_str("a\n")).len(), 2);
    assert_eq!(LineMap::new(&Rope::from_str("a\r\nb")).len(), 2);
    assert_eq!(LineMap::new(&Rope::from_str("a\rb\r")).len(), 3);
    assert_eq!(LineMap::new(&Rope::from_str("")).len(), 1);
}

#[test]
fn test_relex_is_idempotent() {
    let text = "/* a /* b\n*/ c */ {\n  (d) // }\n}\n";
    let buffer = Rope::from_str(text);
    let tokeniser = Tokeniser::for_language(&LanguageConfiguration::rust()).unwrap();
    let retokenizer = Retokenizer::new(tokeniser);
    let mut map = LineMap::new(&buffer);
    retokenizer.tokenize_all(&mut map, &buffer);

    let before = map.clone();
    for line in 0..map.len() {
        retokenizer.relex(&mut map, &buffer, line..line + 1);
        assert_eq!(map, before);
    }
}

#[test]
fn test_comment_propagation() {
    let text: String = (0..100).map(|i| format!("line {i}\n")).collect();
    let mut document = CodeDocument::new(&text, &LanguageConfiguration::rust()).unwrap();
    let line_start = |document: &CodeDocument, line: usize| {
        document.line_map().lookup(line).unwrap().range.start
    };

    let at = line_start(&document, 10);
    let outcome = document.apply_edit(TextEdit::insert(at, "/*")).unwrap();
    assert_eq!(outcome.affected_lines, document.line_map().len() - 10);
    for line in 10..document.line_map().len() {
        assert_eq!(document.line_map().info_of(line).unwrap().comment_depth_end, 1);
    }
    for line in 0..10 {
        assert_eq!(document.line_map().info_of(line).unwrap().comment_depth_end, 0);
    }

    let at = line_start(&document, 20);
    let outcome = document.apply_edit(TextEdit::insert(at, "*/")).unwrap();
    assert_eq!(outcome.affected_lines, document.line_map().len() - 20);
    for line in 20..document.line_map().len() {
        let info = document.line_map().info_of(line).unwrap();
        assert_eq!(info.comment_depth_end, 0);
    }
    assert_eq!(
        document.line_map().info_of(20).unwrap().comment_spans,
        vec![0..2]
    );

    // Editing inside the now balanced comment leaves every other line alone.
    let at = line_start(&document, 15);
    let outcome = document.apply_edit(TextEdit::insert(at, "x")).unwrap();
    assert_eq!(outcome.affected_lines, 1);
}
