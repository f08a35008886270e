use super::*;

// Shared test helpers

pub(crate) fn parse(input: &str) -> Vec<Segment> {
    match parse_segments(input, &Settings::default()) {
        Ok(segs) => segs,
        Err(e) => panic!("parse failed for {input:?}: {e}"),
    }
}

pub(crate) fn parse_with(input: &str, settings: &Settings) -> Vec<Segment> {
    match parse_segments(input, settings) {
        Ok(segs) => segs,
        Err(e) => panic!("parse failed for {input:?}: {e}"),
    }
}

pub(crate) fn parse_err(input: &str, settings: &Settings) -> AjisError {
    match parse_segments(input, settings) {
        Ok(segs) => panic!("expected error for {input:?}, got {segs:?}"),
        Err(e) => e,
    }
}

pub(crate) fn slice(text: &str) -> Slice {
    Slice::new(text, SliceFlags::empty())
}

/// Deterministic LCG (Numerical Recipes constants) used to generate
/// pseudo-random documents without a rand dependency.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub(crate) fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(1664525).wrapping_add(1013904223);
        self.0 >> 16
    }

    pub(crate) fn below(&mut self, n: u64) -> u64 {
        self.next() % n.max(1)
    }
}

/// Build a pseudo-random AJIS document of bounded depth for property tests.
pub(crate) fn gen_document(rng: &mut Lcg, depth: u32) -> String {
    match if depth == 0 { rng.below(4) } else { rng.below(6) } {
        0 => format!("{}", rng.below(100_000)),
        1 => format!("\"s{}\"", rng.below(1000)),
        2 => "true".to_string(),
        3 => "null".to_string(),
        4 => {
            let n = rng.below(4);
            let items: Vec<String> = (0..n).map(|_| gen_document(rng, depth - 1)).collect();
            format!("[{}]", items.join(","))
        }
        _ => {
            let n = rng.below(4);
            let members: Vec<String> = (0..n)
                .map(|i| format!("\"k{}\":{}", i, gen_document(rng, depth - 1)))
                .collect();
            format!("{{{}}}", members.join(","))
        }
    }
}

// Universal stream invariants, asserted over arbitrary parses.

pub(crate) fn check_invariants(segs: &[Segment]) {
    check_balance(segs);
    check_offsets(segs);
    check_name_before_value(segs);
    check_depth_coherence(segs);
}

fn check_balance(segs: &[Segment]) {
    let mut depth = 0i64;
    for seg in segs {
        match seg {
            Segment::EnterContainer { .. } => depth += 1,
            Segment::ExitContainer { .. } => {
                depth -= 1;
                assert!(depth >= 0, "container balance went negative");
            }
            _ => {}
        }
    }
    assert_eq!(depth, 0, "containers are unbalanced");
}

fn check_offsets(segs: &[Segment]) {
    for pair in segs.windows(2) {
        assert!(
            pair[0].offset() <= pair[1].offset(),
            "offsets regressed: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
}

fn check_name_before_value(segs: &[Segment]) {
    let mut i = 0;
    while i < segs.len() {
        if let Segment::PropertyName { .. } = &segs[i] {
            let mut j = i + 1;
            while j < segs.len() && segs[j].is_meta() {
                j += 1;
            }
            assert!(
                j < segs.len() && segs[j].starts_value(),
                "property name at {i} is not followed by a value"
            );
        }
        i += 1;
    }
}

fn check_depth_coherence(segs: &[Segment]) {
    let mut depth = 0u32;
    for seg in segs {
        match seg {
            Segment::EnterContainer { depth: d, .. } => {
                assert_eq!(*d, depth, "enter depth mismatch: {seg:?}");
                depth += 1;
            }
            Segment::ExitContainer { depth: d, .. } => {
                depth -= 1;
                assert_eq!(*d, depth, "exit depth mismatch: {seg:?}");
            }
            other => {
                assert_eq!(other.depth(), depth, "depth mismatch: {other:?}");
            }
        }
    }
}

// Submodules (topic-based)
mod directives_bind;
mod engine_select;
mod invariants;
mod lax_salvage;
mod positions;
mod strings_escapes;
mod transforms;
