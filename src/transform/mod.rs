//! Segment algebra: pure transforms over materialized segment sequences.
//!
//! Every transform preserves the stream invariants (balanced containers,
//! name-before-value, monotonic offsets, coherent depths). Untouched
//! segments pass through unchanged; spliced-in segments inherit the offset
//! of a neighbouring segment and are re-based to the depth of the slot they
//! fill.

mod bind;

pub use bind::{BoundDirective, DirectiveScope, PathPointer, PathSeg, bind_directives};

use crate::error::AjisError;
use crate::lexer::{is_ident_continue, is_ident_start};
use crate::segment::{ContainerKind, Segment, Slice, SliceFlags};

/// Exclusive end index of the value subsequence starting at `start`: one
/// segment for a primitive, the full balanced enter–exit range for a
/// container. Returns `start` when `start` is not a value start.
pub fn value_end(seq: &[Segment], start: usize) -> usize {
    match seq.get(start) {
        Some(Segment::Value { .. }) => start + 1,
        Some(Segment::EnterContainer { .. }) => {
            let mut depth = 0i64;
            for (i, seg) in seq.iter().enumerate().skip(start) {
                match seg {
                    Segment::EnterContainer { .. } => depth += 1,
                    Segment::ExitContainer { .. } => {
                        depth -= 1;
                        if depth == 0 {
                            return i + 1;
                        }
                    }
                    _ => {}
                }
            }
            seq.len()
        }
        _ => start,
    }
}

fn is_identifier_style(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(&b) if is_ident_start(b) => bytes[1..].iter().all(|&b| is_ident_continue(b)),
        _ => false,
    }
}

/// Replace every property name with `f(name)`; flags are recomputed from the
/// new text.
pub fn rename_properties<F>(seq: &[Segment], f: F) -> Vec<Segment>
where
    F: Fn(&str) -> String,
{
    seq.iter()
        .map(|seg| match seg {
            Segment::PropertyName {
                name,
                offset,
                depth,
            } => {
                let mut slice = Slice::classified(f(name.as_str()));
                if is_identifier_style(slice.as_str()) {
                    slice.flags |= SliceFlags::IDENTIFIER_STYLE;
                }
                Segment::PropertyName {
                    name: slice,
                    offset: *offset,
                    depth: *depth,
                }
            }
            other => other.clone(),
        })
        .collect()
}

/// Drop every `name` member (the name segment and exactly one following
/// value subsequence), at any depth.
pub fn drop_property_by_name(seq: &[Segment], name: &str) -> Vec<Segment> {
    let mut out = Vec::with_capacity(seq.len());
    let mut i = 0;
    while i < seq.len() {
        if let Segment::PropertyName { name: n, .. } = &seq[i] {
            if n.as_str() == name {
                i = value_end(seq, i + 1);
                continue;
            }
        }
        out.push(seq[i].clone());
        i += 1;
    }
    out
}

/// Drop the members whose full path from the root equals `pointer`
/// (a `$`-rooted dot-segment pointer, e.g. `$.user.name`).
pub fn drop_property_by_path(seq: &[Segment], pointer: &str) -> Result<Vec<Segment>, AjisError> {
    let target = PathPointer::parse(pointer)?;
    let mut tracker = bind::PathTracker::new();
    let mut out = Vec::with_capacity(seq.len());
    let mut i = 0;
    while i < seq.len() {
        let seg = &seq[i];
        if let Segment::PropertyName { name, .. } = seg {
            if tracker.current_path().child_key(name.as_str()) == target {
                // The skipped region is balanced, so the tracker state is
                // unchanged by not observing it.
                i = value_end(seq, i + 1);
                continue;
            }
        }
        tracker.observe(seg);
        out.push(seg.clone());
        i += 1;
    }
    Ok(out)
}

/// For every array in the sequence, keep only the item subsequences
/// `predicate` accepts. Array brackets stay; comments and directives between
/// items pass through.
pub fn filter_array_items<F>(seq: &[Segment], predicate: F) -> Vec<Segment>
where
    F: Fn(&[Segment]) -> bool,
{
    let mut out = Vec::with_capacity(seq.len());
    filter_region(seq, &predicate, &mut out);
    out
}

fn filter_region<F>(seq: &[Segment], predicate: &F, out: &mut Vec<Segment>)
where
    F: Fn(&[Segment]) -> bool,
{
    let mut i = 0;
    while i < seq.len() {
        match &seq[i] {
            Segment::EnterContainer {
                kind: ContainerKind::Array,
                ..
            } => {
                let end = value_end(seq, i);
                if end <= i + 1 {
                    out.push(seq[i].clone());
                    i += 1;
                    continue;
                }
                out.push(seq[i].clone());
                filter_array_body(&seq[i + 1..end - 1], predicate, out);
                out.push(seq[end - 1].clone());
                i = end;
            }
            other => {
                out.push(other.clone());
                i += 1;
            }
        }
    }
}

fn filter_array_body<F>(body: &[Segment], predicate: &F, out: &mut Vec<Segment>)
where
    F: Fn(&[Segment]) -> bool,
{
    let mut i = 0;
    while i < body.len() {
        if body[i].is_meta() {
            out.push(body[i].clone());
            i += 1;
            continue;
        }
        let end = value_end(body, i);
        if end == i {
            i += 1;
            continue;
        }
        if predicate(&body[i..end]) {
            // Kept items are themselves filtered for nested arrays.
            filter_region(&body[i..end], predicate, out);
        }
        i = end;
    }
}

/// Replace the value of every `name` member with `replacement`, itself a
/// valid balanced value subsequence. The spliced segments take the member's
/// offset and are re-based to its depth.
pub fn replace_property_value(
    seq: &[Segment],
    name: &str,
    replacement: &[Segment],
) -> Vec<Segment> {
    let mut out = Vec::with_capacity(seq.len());
    let mut i = 0;
    while i < seq.len() {
        out.push(seq[i].clone());
        if let Segment::PropertyName {
            name: n,
            offset,
            depth,
        } = &seq[i]
        {
            if n.as_str() == name {
                let vend = value_end(seq, i + 1);
                let base = replacement.first().map(|s| s.depth()).unwrap_or(0);
                let delta = *depth as i64 - base as i64;
                for r in replacement {
                    out.push(retag(r, delta, *offset));
                }
                i = vend;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Bare value subsequence of the top-level property `name`, with the outer
/// object stripped and depths re-based so the result is a valid standalone
/// stream. Empty when the document is not an object or lacks the property.
pub fn select_root_property_value(seq: &[Segment], name: &str) -> Vec<Segment> {
    match find_root_member(seq, name) {
        Some((_, vstart, vend)) => seq[vstart..vend]
            .iter()
            .map(|s| retag_depth(s, -1))
            .collect(),
        None => Vec::new(),
    }
}

/// An object containing only the top-level property `name`: the original
/// brackets, name, and value segments, untouched.
pub fn select_root_property_wrapped(seq: &[Segment], name: &str) -> Vec<Segment> {
    let Some((name_idx, vstart, vend)) = find_root_member(seq, name) else {
        return Vec::new();
    };
    let Some(enter_idx) = seq.iter().position(|s| !s.is_meta()) else {
        return Vec::new();
    };
    let exit_idx = value_end(seq, enter_idx) - 1;
    let mut out = Vec::with_capacity(vend - vstart + 3);
    out.push(seq[enter_idx].clone());
    out.push(seq[name_idx].clone());
    out.extend(seq[vstart..vend].iter().cloned());
    out.push(seq[exit_idx].clone());
    out
}

/// Locate a direct member of the top-level object: returns
/// `(name_index, value_start, value_end)`.
fn find_root_member(seq: &[Segment], name: &str) -> Option<(usize, usize, usize)> {
    let mut i = seq.iter().position(|s| !s.is_meta())?;
    match seq.get(i) {
        Some(Segment::EnterContainer {
            kind: ContainerKind::Object,
            ..
        }) => i += 1,
        _ => return None,
    }
    while i < seq.len() {
        match &seq[i] {
            Segment::PropertyName { name: n, depth, .. } if *depth == 1 => {
                let vstart = i + 1;
                let vend = value_end(seq, vstart);
                if n.as_str() == name {
                    return Some((i, vstart, vend));
                }
                i = vend;
            }
            Segment::ExitContainer { depth: 0, .. } => return None,
            _ => i += 1,
        }
    }
    None
}

fn retag(seg: &Segment, depth_delta: i64, offset: u64) -> Segment {
    let mut s = seg.clone();
    let new_depth = (s.depth() as i64 + depth_delta).max(0) as u32;
    set_depth_offset(&mut s, new_depth, offset);
    s
}

fn retag_depth(seg: &Segment, depth_delta: i64) -> Segment {
    let offset = seg.offset();
    retag(seg, depth_delta, offset)
}

fn set_depth_offset(seg: &mut Segment, new_depth: u32, new_offset: u64) {
    match seg {
        Segment::EnterContainer { offset, depth, .. }
        | Segment::ExitContainer { offset, depth, .. }
        | Segment::PropertyName { offset, depth, .. }
        | Segment::Value { offset, depth, .. }
        | Segment::Comment { offset, depth, .. }
        | Segment::Directive { offset, depth, .. } => {
            *offset = new_offset;
            *depth = new_depth;
        }
    }
}
