use super::*;
use crate::transform::{DirectiveScope, bind_directives};

fn parse_with_directives_emitted(doc: &str) -> Vec<Segment> {
    let mut settings = Settings::default();
    settings.emit_directive_segments = true;
    parse_with(doc, &settings)
}

#[test]
fn directive_line_splits_namespace_verb_args() {
    let d = Directive::parse("ajis mode value=lax verbose").unwrap();
    assert_eq!(d.namespace, "ajis");
    assert_eq!(d.canonical_namespace(), "AJIS");
    assert_eq!(d.verb.as_deref(), Some("mode"));
    assert_eq!(d.args.len(), 2);
    assert_eq!(d.args[0].key.as_deref(), Some("value"));
    assert_eq!(d.args[0].value, "lax");
    assert_eq!(d.args[1].key, None);
    assert_eq!(d.args[1].value, "verbose");

    assert!(Directive::parse("").is_none());
}

#[test]
fn binder_scopes_document_target_trailer() {
    let doc = "\
#doc header\n\
{\n\
\"a\": 1,\n\
#tgt before-b\n\
\"b\": [\n\
10,\n\
#tgt before-item\n\
20\n\
]\n\
}\n\
#trail footer\n";
    let segs = parse_with_directives_emitted(doc);
    let bound = bind_directives(&segs);
    assert_eq!(bound.len(), 4);

    assert_eq!(bound[0].scope, DirectiveScope::Document);
    assert_eq!(bound[0].directive.namespace, "doc");
    assert_eq!(bound[0].target.to_string(), "$");

    assert_eq!(bound[1].scope, DirectiveScope::Target);
    assert_eq!(bound[1].target.to_string(), "$.b");

    assert_eq!(bound[2].scope, DirectiveScope::Target);
    assert_eq!(bound[2].target.to_string(), "$.b.1");

    assert_eq!(bound[3].scope, DirectiveScope::Trailer);
    assert_eq!(bound[3].directive.namespace, "trail");
}

#[test]
fn binder_before_root_value_targets_root() {
    // A directive between the document scope and the value itself: the
    // first one precedes any value, later ones target the next value.
    let doc = "#first\n[1]";
    let segs = parse_with_directives_emitted(doc);
    let bound = bind_directives(&segs);
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].scope, DirectiveScope::Document);
}

#[test]
fn with_directives_merges_mode_override() {
    let doc = "#ajis mode value=lax\n{ unquoted: 'single', }";
    // Plainly parsing this in Ajis mode fails on the single-quote-free
    // trailing comma; the directive flips the document to Lax first.
    assert!(parse_segments(doc, &Settings::default()).is_err());
    let segs = parse_segments_with_directives(doc, &Settings::default()).unwrap();
    assert_eq!(segs.len(), 4);
}

#[test]
fn with_directives_accepts_lex_spelling() {
    let doc = "#ajis mode value=lex\n[1,]";
    let segs = parse_segments_with_directives(doc, &Settings::default()).unwrap();
    assert_eq!(segs.len(), 3);
}

#[test]
fn with_directives_stops_scanning_at_first_value() {
    // A directive after the value must not rewrite settings.
    let doc = "[1,]\n#ajis mode value=lax";
    assert!(parse_segments_with_directives(doc, &Settings::default()).is_err());
}

#[test]
fn unknown_namespace_directives_are_inert() {
    let doc = "#custom anything goes\n{\"a\":1}";
    let segs = parse_segments_with_directives(doc, &Settings::default()).unwrap();
    assert_eq!(segs.len(), 4);
}
