use std::sync::Arc;

use cognilens::config::LanguageAliases;
use cognilens::parsing::has_parse_errors;
use cognilens::{
    ContentChange, DocumentTreeCache, Error, Language, Position, Range, Result, SyntaxParser,
    TreeSitterParsers,
};
use pretty_assertions::assert_eq;
use tree_sitter::Tree;

const URI: &str = "file:///project/test.ts";

fn cache() -> DocumentTreeCache {
    DocumentTreeCache::new(Arc::new(TreeSitterParsers::new().unwrap()))
}

fn range(l1: u32, c1: u32, l2: u32, c2: u32) -> Range {
    Range::new(Position::new(l1, c1), Position::new(l2, c2))
}

/// Tree text as tree-sitter sees it, to check the stored tree matches the text.
fn root_text<'a>(tree: &Tree, text: &'a str) -> &'a str {
    let root = tree.root_node();
    &text[root.start_byte()..root.end_byte()]
}

/// Parser that refuses any text containing `@@fail`.
struct FlakyParser {
    inner: TreeSitterParsers,
}

impl SyntaxParser for FlakyParser {
    fn parse(&self, language: Language, text: &str, previous: Option<&Tree>) -> Result<Tree> {
        if text.contains("@@fail") {
            return Err(Error::parse("", "refused"));
        }
        self.inner.parse(language, text, previous)
    }

    fn supports(&self, language: Language) -> bool {
        self.inner.supports(language)
    }
}

#[test]
fn test_open_tracks_tree_and_version() {
    let mut cache = cache();
    cache
        .open(URI, "typescript", 1, "function test() { return 1; }")
        .unwrap();

    assert!(cache.contains(URI));
    assert_eq!(cache.version(URI), Some(1));
    assert_eq!(cache.language(URI), Some(Language::TypeScript));
    assert_eq!(cache.get(URI).unwrap().language_id(), "typescript");
    let tree = cache.tree(URI).unwrap();
    assert_eq!(tree.root_node().kind(), "program");
    assert!(!has_parse_errors(tree));
}

#[test]
fn test_open_unknown_language_leaves_no_entry() {
    let mut cache = cache();
    let err = cache.open(URI, "cobol", 1, "DISPLAY 'HI'.").unwrap_err();

    assert!(matches!(err, Error::ParserUnavailable { .. }));
    assert!(!cache.contains(URI));
    assert!(cache.is_empty());
}

#[test]
fn test_language_id_matching_ignores_case() {
    let mut cache = cache();
    cache.open(URI, "TypeScript", 1, "let a = 1;").unwrap();
    assert_eq!(cache.language(URI), Some(Language::TypeScript));
}

#[test]
fn test_aliases_resolve_extra_language_ids() {
    let mut aliases = LanguageAliases::default();
    aliases
        .aliases
        .insert("cs".to_string(), "csharp".to_string());
    let mut cache =
        DocumentTreeCache::with_aliases(Arc::new(TreeSitterParsers::new().unwrap()), aliases);

    cache.open("file:///a.cs", "cs", 1, "class A {}").unwrap();
    assert_eq!(cache.language("file:///a.cs"), Some(Language::CSharp));
}

#[test]
fn test_full_change_replaces_text() {
    let mut cache = cache();
    cache.open(URI, "typescript", 1, "let a = 1;").unwrap();
    cache
        .change(URI, 2, &[ContentChange::full("function b() {}")])
        .unwrap();

    assert_eq!(cache.text(URI), Some("function b() {}"));
    assert_eq!(cache.version(URI), Some(2));
    let tree = cache.tree(URI).unwrap();
    assert_eq!(root_text(tree, "function b() {}"), "function b() {}");
}

#[test]
fn test_incremental_edit_produces_valid_tree() {
    let mut cache = cache();
    cache
        .open(URI, "typescript", 1, "function test() { return 1; }")
        .unwrap();
    cache
        .change(
            URI,
            2,
            &[ContentChange::ranged(range(0, 9, 0, 13), "renamed")],
        )
        .unwrap();

    let expected = "function renamed() { return 1; }";
    assert_eq!(cache.text(URI), Some(expected));
    assert_eq!(cache.version(URI), Some(2));

    let tree = cache.tree(URI).unwrap();
    assert!(!has_parse_errors(tree));
    let function = tree.root_node().named_child(0).unwrap();
    let name = function.child_by_field_name("name").unwrap();
    assert_eq!(&expected[name.byte_range()], "renamed");
}

#[test]
fn test_sequential_edits_in_one_batch() {
    let mut cache = cache();
    cache.open(URI, "typescript", 1, "let a = 1;\nlet b = 2;\n").unwrap();
    cache
        .change(
            URI,
            2,
            &[
                // Insert a new first line, then edit what is now line 2.
                ContentChange::ranged(range(0, 0, 0, 0), "let z = 0;\n"),
                ContentChange::ranged(range(2, 8, 2, 9), "42"),
            ],
        )
        .unwrap();

    let expected = "let z = 0;\nlet a = 1;\nlet b = 42;\n";
    assert_eq!(cache.text(URI), Some(expected));
    let tree = cache.tree(URI).unwrap();
    assert!(!has_parse_errors(tree));
    assert_eq!(tree.root_node().named_child_count(), 3);
}

#[test]
fn test_multiline_edit_with_utf16_positions() {
    let mut cache = cache();
    cache
        .open(URI, "typescript", 1, "const s = \"😀\"; let x = 1;")
        .unwrap();
    // The emoji counts as two UTF-16 units, so `x` sits at character 20.
    cache
        .change(URI, 2, &[ContentChange::ranged(range(0, 20, 0, 21), "y")])
        .unwrap();

    assert_eq!(cache.text(URI), Some("const s = \"😀\"; let y = 1;"));
    assert!(!has_parse_errors(cache.tree(URI).unwrap()));
}

#[test]
fn test_malformed_edit_falls_back_to_full_reparse() {
    let mut cache = cache();
    cache.open(URI, "typescript", 1, "let a = 1;").unwrap();
    cache
        .change(
            URI,
            2,
            &[ContentChange::ranged(range(9, 0, 9, 0), "\nlet b = 2;")],
        )
        .unwrap();

    let expected = "let a = 1;\nlet b = 2;";
    assert_eq!(cache.text(URI), Some(expected));
    assert_eq!(cache.version(URI), Some(2));
    let tree = cache.tree(URI).unwrap();
    assert!(!has_parse_errors(tree));
    assert_eq!(tree.root_node().end_byte(), expected.len());
}

#[test]
fn test_change_for_unknown_document() {
    let mut cache = cache();
    let err = cache
        .change(URI, 2, &[ContentChange::full("let a = 1;")])
        .unwrap_err();
    assert!(matches!(err, Error::UnknownDocument(uri) if uri == URI));
}

#[test]
fn test_failed_reparse_keeps_last_good_entry() {
    let parser = FlakyParser {
        inner: TreeSitterParsers::new().unwrap(),
    };
    let mut cache = DocumentTreeCache::new(Arc::new(parser));
    cache.open(URI, "typescript", 1, "let a = 1;").unwrap();

    let err = cache
        .change(URI, 2, &[ContentChange::full("let @@fail = 1;")])
        .unwrap_err();

    assert!(matches!(err, Error::Parse { ref uri, .. } if uri == URI));
    assert_eq!(cache.version(URI), Some(1));
    assert_eq!(cache.text(URI), Some("let a = 1;"));
    assert!(!has_parse_errors(cache.tree(URI).unwrap()));
}

#[test]
fn test_failed_open_leaves_no_entry() {
    let parser = FlakyParser {
        inner: TreeSitterParsers::new().unwrap(),
    };
    let mut cache = DocumentTreeCache::new(Arc::new(parser));
    cache.open(URI, "typescript", 1, "let a = 1;").unwrap();

    assert!(cache.open(URI, "typescript", 2, "@@fail").is_err());
    assert!(!cache.contains(URI));
}

#[test]
fn test_reopen_replaces_entry() {
    let mut cache = cache();
    cache.open(URI, "typescript", 3, "let a = 1;").unwrap();
    cache.open(URI, "javascript", 1, "var b = 2;").unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.version(URI), Some(1));
    assert_eq!(cache.language(URI), Some(Language::JavaScript));
}

#[test]
fn test_reparse_recovers_from_stored_text() {
    let mut cache = cache();
    cache.open(URI, "typescript", 4, "let a = 1;").unwrap();
    cache.reparse(URI).unwrap();

    assert_eq!(cache.version(URI), Some(4));
    assert!(!has_parse_errors(cache.tree(URI).unwrap()));
    assert!(matches!(
        cache.reparse("file:///missing.ts"),
        Err(Error::UnknownDocument(_))
    ));
}

#[test]
fn test_close_releases_entry() {
    let mut cache = cache();
    cache.open(URI, "typescript", 1, "let a = 1;").unwrap();

    assert!(cache.close(URI));
    assert!(!cache.close(URI));
    assert!(cache.tree(URI).is_none());
    assert_eq!(cache.version(URI), None);
}

#[test]
fn test_with_document_borrows_entry() {
    let mut cache = cache();
    cache.open(URI, "typescript", 7, "let a = 1;").unwrap();

    let summary = cache.with_document(URI, |doc| (doc.version(), doc.text().len()));
    assert_eq!(summary, Some((7, 10)));
    assert_eq!(cache.with_document("file:///none.ts", |doc| doc.version()), None);
}
