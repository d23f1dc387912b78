use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};

use bmx::{Document, ErrorKind, GLOBAL_BLOCK, ParseError};
use pretty_assertions::assert_eq;

fn load(source: &str) -> Document {
    bmx::load(source).expect("load failed")
}

fn load_err(source: &str) -> ParseError {
    bmx::load(source).expect_err("load unexpectedly succeeded")
}

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn attribute_block_with_empty_declaration() {
    let doc = load("[@meta]\n@title: Hello\n@flag!\n");
    assert_eq!(doc.attributes["meta"], map(&[("title", "Hello"), ("flag", "")]));
    assert!(!doc.texts.contains_key("meta"));
}

#[test]
fn prefix_empty_declaration() {
    let doc = load("[@meta]\n@!flag\n");
    assert_eq!(doc.attribute("meta", "flag"), Some(""));
}

#[test]
fn text_block_keeps_lines() {
    let doc = load("[body]\nline one\nline two\n");
    assert_eq!(doc.text("body"), Some("line one\nline two\n"));
}

#[test]
fn text_block_keeps_blank_lines_and_padding() {
    let doc = load("[body]\n  indented\n\n@not an attribute\n\ttab\n");
    assert_eq!(doc.text("body"), Some("  indented\n\n@not an attribute\n\ttab\n"));
}

#[test]
fn comment_block_is_discarded() {
    let doc = load("[#skip]\nthis is ignored\n[real]\nkept\n");
    assert_eq!(doc.texts, map(&[("real", "kept\n")]));
    assert!(doc.attributes.is_empty());
    assert!(!doc.contains_block("skip"));
}

#[test]
fn empty_blocks_are_registered() {
    let doc = load("[empty]\n[@none]\n");
    assert_eq!(doc.text("empty"), Some(""));
    assert_eq!(doc.attribute_block("none"), Some(&BTreeMap::new()));
}

#[test]
fn top_level_attributes_go_to_global_block() {
    let doc = load("@name: demo\nfree text is skipped\n\n[body]\nx\n");
    assert_eq!(doc.attributes[GLOBAL_BLOCK], map(&[("name", "demo")]));
    assert_eq!(doc.text("body"), Some("x\n"));
}

#[test]
fn global_block_is_created_lazily() {
    let doc = load("just some prose\n[body]\nx\n");
    assert!(!doc.attributes.contains_key(GLOBAL_BLOCK));
}

#[test]
fn lines_inside_attribute_block_without_marker_are_skipped() {
    let doc = load("[@meta]\n\nplain words\n@a: 1\n");
    assert_eq!(doc.attributes["meta"], map(&[("a", "1")]));
}

#[test]
fn header_markers_are_plain_text_in_other_positions() {
    let doc = load("[@meta]\n@a: x]y[z\n[body]\n #[not a header]\n");
    assert_eq!(doc.attribute("meta", "a"), Some("x]y[z"));
    assert_eq!(doc.text("body"), Some(" #[not a header]\n"));
}

#[test]
fn crlf_line_endings() {
    let doc = load("[@meta]\r\n@a: 1\r\n[body]\r\nline\r\n");
    assert_eq!(doc.attribute("meta", "a"), Some("1"));
    assert_eq!(doc.text("body"), Some("line\n"));
}

#[test]
fn final_line_without_terminator() {
    let doc = load("[body]\nlast");
    assert_eq!(doc.text("body"), Some("last\n"));
}

#[test]
fn duplicate_block() {
    let err = load_err("[x]\n[x]\n");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "block \"x\" already exists");
    assert_eq!(err.position().map(|p| p.line), Some(2));
}

#[test]
fn duplicate_block_across_kinds() {
    for source in ["[x]\n[@x]\n", "[@x]\n[x]\n", "[x]\nbody\n[#x]\n"] {
        let err = load_err(source);
        assert_eq!(err.message(), "block \"x\" already exists", "source: {:?}", source);
    }

    let err = load_err("@a: 1\n[@x]\n\n[__global__]\n");
    assert_eq!(err.message(), "block \"__global__\" already exists");
    assert_eq!(err.position().map(|p| p.line), Some(4));
}

#[test]
fn comment_names_are_not_registered() {
    let doc = load("[#x]\n[#x]\n[x]\nbody\n");
    assert_eq!(doc.text("x"), Some("body\n"));
}

#[test]
fn duplicate_attribute() {
    let err = load_err("[@meta]\n@a: 1\n@b: 2\n@a!\n");
    assert_eq!(err.message(), "attribute \"a\" already exists");
    assert_eq!(err.position().map(|p| p.line), Some(4));
}

#[test]
fn unclosed_header() {
    let err = load_err("[@a\n@k: v\n");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "block declaration isn't closed");
    let position = err.position().copied().unwrap();
    assert_eq!((position.line, position.column), (1, 2));
    assert_eq!(err.hint(), Some("[@a\n~~^"));
}

#[test]
fn syntax_errors_report_line_and_column() {
    let cases = [
        ("[body]\n[a[b]\n", 2, 2, "unexpected bracket in block declaration"),
        ("\n\n[   ]\n", 3, 4, "block's name cannot be empty"),
        ("[@m]\n@novalue\n", 2, 7, "failed to find separator after attribute's key"),
        ("[@m]\n@ : v\n", 2, 2, "attribute's key is empty"),
        ("[@m]\n@k:\n", 2, 2, "attribute's value is empty"),
        ("[@m]\n@!\n", 2, 1, "attribute key is empty"),
    ];
    for (source, line, column, message) in cases {
        let err = load_err(source);
        assert_eq!(err.message(), message, "source: {:?}", source);
        let position = err.position().copied().unwrap();
        assert_eq!((position.line, position.column), (line, column), "source: {:?}", source);
    }
}

#[test]
fn whitespace_only_value_is_accepted_as_empty() {
    let doc = load("[@m]\n@k:   \n");
    assert_eq!(doc.attribute("m", "k"), Some(""));
}

#[test]
fn trailing_garbage_after_header_is_accepted() {
    let doc = load("[body] anything here\ntext\n");
    assert_eq!(doc.text("body"), Some("text\n"));
}

#[test]
fn empty_string_is_an_input_error() {
    let err = load_err("");
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.position().is_none());
    assert!(err.hint().is_none());
}

#[test]
fn whitespace_only_string_is_a_valid_empty_document() {
    assert!(load("\n\n").is_empty());
}

#[test]
fn empty_stream_is_an_empty_document() {
    let doc = bmx::loads(&b""[..]).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn stream_and_string_agree() {
    let source = "@v: 2\n[@meta]\n@title: Hello\n[#c]\nignored\n[body]\none\n\ntwo\n";
    let from_stream = bmx::loads(source.as_bytes()).unwrap();
    assert_eq!(from_stream, load(source));
}

#[test]
fn stream_from_file() {
    let mut file = tempfile::tempfile().unwrap();
    write!(file, "[@server]\n@host: localhost\n@port: 8080\n[motd]\nwelcome\n").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let doc = bmx::loads(std::io::BufReader::new(file)).unwrap();
    assert_eq!(doc.attribute("server", "port"), Some("8080"));
    assert_eq!(doc.text("motd"), Some("welcome\n"));
}

#[test]
fn stream_syntax_error_carries_line_number() {
    let err = bmx::loads("[a]\n\n[a]\n".as_bytes()).unwrap_err();
    assert_eq!(err.position().map(|p| p.line), Some(3));
}

#[test]
fn unreadable_stream_is_an_input_error() {
    // Invalid UTF-8 makes the line reader fail.
    let err = bmx::loads(&b"[body]\n\xff\xfe\n"[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
}
