use super::*;
use crate::tracing_config::LogFormat;

#[test]
fn test_span_merge_ignores_empty_spans() {
    let a = Span::new(4, 10);
    assert_eq!(a.merge(Span::SYNTHETIC), a);
    assert_eq!(Span::SYNTHETIC.merge(a), a);
    assert_eq!(a.merge(Span::new(2, 6)), Span::new(2, 10));
}

#[test]
fn test_span_slice_out_of_range_is_empty() {
    let src = "let x = 1;";
    assert_eq!(Span::new(4, 5).slice(src), "x");
    assert_eq!(Span::new(8, 40).slice(src), "");
    assert!(Span::new(4, 5).contains(4));
    assert!(!Span::new(4, 5).contains(5));
    assert_eq!(Span::new(7, 3).len(), 0);
}

#[test]
fn test_comment_source_and_absorb() {
    assert_eq!(Comment::block(" a ").to_source(), "/* a */");
    assert_eq!(Comment::line(" b").to_source(), "// b");

    let mut comments = NodeComments::default();
    assert!(comments.is_empty());
    comments.absorb(NodeComments {
        leading: vec![Comment::line("x")],
        ..NodeComments::default()
    });
    assert_eq!(comments.leading.len(), 1);
    assert!(!comments.is_empty());
}

#[test]
fn test_comments_serialize_without_empty_lists() {
    let comments = NodeComments {
        trailing: vec![Comment::block("t")],
        ..NodeComments::default()
    };
    let json = serde_json::to_value(&comments).unwrap();
    assert!(json.get("leading").is_none());
    assert_eq!(json["trailing"][0]["value"], "t");
    assert_eq!(json["trailing"][0]["kind"], "Block");
}

#[test]
fn test_log_format_parse() {
    assert_eq!(LogFormat::parse("TREE"), LogFormat::Tree);
    assert_eq!(LogFormat::parse(" json "), LogFormat::Json);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
}
