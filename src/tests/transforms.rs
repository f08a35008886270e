use super::*;
use crate::emit::segments_to_string;
use crate::transform::{
    drop_property_by_name, drop_property_by_path, filter_array_items, rename_properties,
    replace_property_value, select_root_property_value, select_root_property_wrapped, value_end,
};

#[test]
fn value_end_skips_balanced_subsequences() {
    let segs = parse(r#"{"a":[1,{"b":2}],"c":3}"#);
    // segs[2] is the array enter; its subsequence runs to the matching exit.
    assert!(matches!(segs[2], Segment::EnterContainer { .. }));
    let end = value_end(&segs, 2);
    assert!(matches!(segs[end - 1], Segment::ExitContainer { depth: 1, .. }));
    assert!(matches!(segs[end], Segment::PropertyName { .. }));
}

#[test]
fn rename_recomputes_flags() {
    let segs = parse(r#"{"snake_case":1}"#);
    let renamed = rename_properties(&segs, |n| n.to_ascii_uppercase());
    assert!(matches!(
        &renamed[1],
        Segment::PropertyName { name, .. }
            if name.as_str() == "SNAKE_CASE"
                && name.flags.contains(SliceFlags::IDENTIFIER_STYLE)
    ));

    let renamed = rename_properties(&segs, |_| "naïve name".to_string());
    assert!(matches!(
        &renamed[1],
        Segment::PropertyName { name, .. }
            if name.flags.contains(SliceFlags::HAS_NON_ASCII)
                && !name.flags.contains(SliceFlags::IDENTIFIER_STYLE)
    ));
}

#[test]
fn drop_by_name_works_at_any_depth() {
    let segs = parse(r#"{"secret":1,"nested":{"secret":[1,2],"keep":2}}"#);
    let dropped = drop_property_by_name(&segs, "secret");
    check_invariants(&dropped);
    assert_eq!(segments_to_string(&dropped), r#"{"nested":{"keep":2}}"#);
}

#[test]
fn drop_by_path_only_hits_the_exact_path() {
    let segs = parse(r#"{"a":{"x":1},"b":{"x":2}}"#);
    let dropped = drop_property_by_path(&segs, "$.b.x").unwrap();
    check_invariants(&dropped);
    assert_eq!(segments_to_string(&dropped), r#"{"a":{"x":1},"b":{}}"#);
}

#[test]
fn drop_by_path_through_array_indices() {
    let segs = parse(r#"{"items":[{"x":1},{"x":2}]}"#);
    let dropped = drop_property_by_path(&segs, "$.items.1.x").unwrap();
    check_invariants(&dropped);
    assert_eq!(segments_to_string(&dropped), r#"{"items":[{"x":1},{}]}"#);
}

#[test]
fn invalid_path_pointer_fails_fast() {
    let segs = parse("{}");
    assert!(drop_property_by_path(&segs, "a.b").is_err());
    assert!(drop_property_by_path(&segs, "$..x").is_err());
}

#[test]
fn filter_keeps_matching_items_and_brackets() {
    let segs = parse("[1,2,3,4]");
    let kept = filter_array_items(&segs, |item| {
        matches!(
            item.first(),
            Some(Segment::Value { value: Some(v), .. })
                if v.as_str().parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
        )
    });
    check_invariants(&kept);
    assert_eq!(segments_to_string(&kept), "[2,4]");
}

#[test]
fn filter_applies_to_nested_arrays() {
    let segs = parse(r#"{"rows":[[1,2],[3,4]]}"#);
    let kept = filter_array_items(&segs, |item| {
        // Drop bare odd numbers; container items always pass.
        match item.first() {
            Some(Segment::Value { value: Some(v), .. }) => {
                v.as_str().parse::<i64>().map(|n| n % 2 == 0).unwrap_or(true)
            }
            _ => true,
        }
    });
    check_invariants(&kept);
    assert_eq!(segments_to_string(&kept), r#"{"rows":[[2],[4]]}"#);
}

#[test]
fn filter_passes_comments_between_items() {
    let mut settings = Settings::default();
    settings.emit_comment_segments = true;
    let segs = parse_with("[1, // keep me\n 2]", &settings);
    let kept = filter_array_items(&segs, |_| true);
    assert!(kept.iter().any(|s| matches!(s, Segment::Comment { .. })));
    check_invariants(&kept);
}

#[test]
fn replace_value_splices_a_balanced_subsequence() {
    let segs = parse(r#"{"cfg":{"old":true},"z":1}"#);
    let replacement = parse("[0]");
    let replaced = replace_property_value(&segs, "cfg", &replacement);
    check_invariants(&replaced);
    assert_eq!(segments_to_string(&replaced), r#"{"cfg":[0],"z":1}"#);

    // Depths of the spliced segments were re-based to the member's depth.
    assert!(matches!(
        replaced[2],
        Segment::EnterContainer { depth: 1, .. }
    ));
}

#[test]
fn replace_primitive_with_primitive() {
    let segs = parse(r#"{"n":1,"m":2}"#);
    let replacement = vec![Segment::Value {
        kind: ValueKind::String,
        value: Some(slice("redacted")),
        offset: 0,
        depth: 0,
    }];
    let replaced = replace_property_value(&segs, "n", &replacement);
    check_invariants(&replaced);
    assert_eq!(
        segments_to_string(&replaced),
        r#"{"n":"redacted","m":2}"#
    );
}

#[test]
fn select_root_value_strips_the_outer_object() {
    let segs = parse(r#"{"user":{"name":"ada"},"other":1}"#);
    let selected = select_root_property_value(&segs, "user");
    check_invariants(&selected);
    assert_eq!(segments_to_string(&selected), r#"{"name":"ada"}"#);
    assert_eq!(selected[0].depth(), 0);

    assert!(select_root_property_value(&segs, "missing").is_empty());
}

#[test]
fn select_root_wrapped_keeps_one_member() {
    let segs = parse(r#"{"user":{"name":"ada"},"other":1}"#);
    let wrapped = select_root_property_wrapped(&segs, "user");
    check_invariants(&wrapped);
    assert_eq!(segments_to_string(&wrapped), r#"{"user":{"name":"ada"}}"#);
}

#[test]
fn select_on_primitive_member() {
    let segs = parse(r#"{"a":41,"b":42}"#);
    let selected = select_root_property_value(&segs, "b");
    assert_eq!(
        selected,
        vec![Segment::Value {
            kind: ValueKind::Number,
            value: Some(slice("42")),
            offset: 12,
            depth: 0,
        }]
    );
}
