use super::*;
use crate::transform::{drop_property_by_path, filter_array_items, rename_properties,
    select_root_property_value};

#[test]
fn generated_documents_uphold_stream_invariants() {
    let mut rng = Lcg::new(0x5EED);
    for _ in 0..200 {
        let doc = gen_document(&mut rng, 4);
        let segs = parse(&doc);
        check_invariants(&segs);
    }
}

#[test]
fn identity_filter_is_segment_equal() {
    let mut rng = Lcg::new(42);
    for _ in 0..50 {
        let doc = gen_document(&mut rng, 3);
        let segs = parse(&doc);
        let filtered = filter_array_items(&segs, |_| true);
        assert_eq!(segs, filtered, "identity filter changed {doc:?}");
    }
}

#[test]
fn rename_composes() {
    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let doc = gen_document(&mut rng, 3);
        let segs = parse(&doc);
        let twice = rename_properties(&rename_properties(&segs, |n| format!("{n}_x")), |n| {
            format!("{n}_x")
        });
        let composed = rename_properties(&segs, |n| format!("{n}_x_x"));
        assert_eq!(twice, composed);
    }
}

#[test]
fn rename_of_pure_function_is_stable() {
    let segs = parse(r#"{"a":1,"b":{"a":2}}"#);
    let upper = rename_properties(&segs, |n| n.to_ascii_uppercase());
    let again = rename_properties(&upper, |n| n.to_ascii_uppercase());
    assert_eq!(upper, again, "uppercasing is idempotent");
    check_invariants(&upper);
}

#[test]
fn drop_then_select_is_empty() {
    let segs = parse(r#"{"keep":1,"gone":{"x":[1,2]},"tail":3}"#);
    let dropped = drop_property_by_path(&segs, "$.gone").unwrap();
    check_invariants(&dropped);
    assert!(select_root_property_value(&dropped, "gone").is_empty());
    assert!(!select_root_property_value(&dropped, "keep").is_empty());
}

#[test]
fn transforms_preserve_invariants_on_generated_documents() {
    let mut rng = Lcg::new(99);
    for _ in 0..50 {
        let doc = gen_document(&mut rng, 3);
        let segs = parse(&doc);
        check_invariants(&rename_properties(&segs, |n| format!("p_{n}")));
        check_invariants(&filter_array_items(&segs, |item| {
            !matches!(item.first(), Some(Segment::Value { kind: ValueKind::Null, .. }))
        }));
        check_invariants(&crate::transform::drop_property_by_name(&segs, "k0"));
    }
}
