//! Directive binding: associate each directive segment with a scope and a
//! target path, and the minimal `$`-rooted dot-segment path pointer the
//! filters share.

use crate::directive::Directive;
use crate::error::{AjisError, AjisErrorKind};
use crate::position::TextPosition;
use crate::segment::{ContainerKind, Segment};

/// One step of a [`PathPointer`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

/// A `$`-rooted dot-segment path, e.g. `$.items.2.name`. All-digit segments
/// address array indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathPointer {
    segs: Vec<PathSeg>,
}

impl PathPointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(pointer: &str) -> Result<Self, AjisError> {
        let bad = || {
            AjisError::new(
                AjisErrorKind::InputNotSupported(format!("invalid path pointer {pointer:?}")),
                TextPosition::START,
            )
        };
        let Some(rest) = pointer.strip_prefix('$') else {
            return Err(bad());
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = rest.strip_prefix('.') else {
            return Err(bad());
        };
        let mut segs = Vec::new();
        for part in rest.split('.') {
            if part.is_empty() {
                return Err(bad());
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let idx = part.parse().map_err(|_| bad())?;
                segs.push(PathSeg::Index(idx));
            } else {
                segs.push(PathSeg::Key(part.to_string()));
            }
        }
        Ok(Self { segs })
    }

    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    pub(crate) fn child_key(&self, key: &str) -> PathPointer {
        let mut segs = self.segs.clone();
        segs.push(PathSeg::Key(key.to_string()));
        PathPointer { segs }
    }

    pub(crate) fn child_index(&self, index: usize) -> PathPointer {
        let mut segs = self.segs.clone();
        segs.push(PathSeg::Index(index));
        PathPointer { segs }
    }
}

impl std::fmt::Display for PathPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for seg in &self.segs {
            match seg {
                PathSeg::Key(k) => write!(f, ".{k}")?,
                PathSeg::Index(i) => write!(f, ".{i}")?,
            }
        }
        Ok(())
    }
}

/// Where a directive binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveScope {
    /// Before any value: applies to the whole document.
    Document,
    /// Immediately before a value or name: applies to that value.
    Target,
    /// After the last value.
    Trailer,
}

/// A directive segment bound to its scope and target path.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundDirective {
    pub directive: Directive,
    pub scope: DirectiveScope,
    pub target: PathPointer,
    pub offset: u64,
}

/// Tracks the path of the value being walked. Fed every segment in order;
/// [`current_path`](Self::current_path) is the path of the innermost open
/// container.
pub(crate) struct PathTracker {
    frames: Vec<TrackFrame>,
    seen_any_value: bool,
    root_done: bool,
}

struct TrackFrame {
    kind: ContainerKind,
    next_index: usize,
    pending_key: Option<String>,
    /// This container's own path step within its parent; `None` at root.
    entry: Option<PathSeg>,
}

impl PathTracker {
    pub(crate) fn new() -> Self {
        Self {
            frames: Vec::new(),
            seen_any_value: false,
            root_done: false,
        }
    }

    pub(crate) fn observe(&mut self, seg: &Segment) {
        match seg {
            Segment::EnterContainer { kind, .. } => {
                self.seen_any_value = true;
                let entry = self.take_slot();
                self.frames.push(TrackFrame {
                    kind: *kind,
                    next_index: 0,
                    pending_key: None,
                    entry,
                });
            }
            Segment::ExitContainer { .. } => {
                self.frames.pop();
                if self.frames.is_empty() {
                    self.root_done = true;
                }
            }
            Segment::PropertyName { name, .. } => {
                if let Some(top) = self.frames.last_mut() {
                    top.pending_key = Some(name.text.to_string());
                }
            }
            Segment::Value { .. } => {
                self.seen_any_value = true;
                self.take_slot();
                if self.frames.is_empty() {
                    self.root_done = true;
                }
            }
            Segment::Comment { .. } | Segment::Directive { .. } => {}
        }
    }

    /// Consume the slot the next value occupies: the pending key in an
    /// object, the running index in an array, nothing at root.
    fn take_slot(&mut self) -> Option<PathSeg> {
        match self.frames.last_mut() {
            None => None,
            Some(f) => match f.kind {
                ContainerKind::Object => f.pending_key.take().map(PathSeg::Key),
                ContainerKind::Array => {
                    let i = f.next_index;
                    f.next_index += 1;
                    Some(PathSeg::Index(i))
                }
            },
        }
    }

    pub(crate) fn current_path(&self) -> PathPointer {
        PathPointer {
            segs: self.frames.iter().filter_map(|f| f.entry.clone()).collect(),
        }
    }

    /// Path the next value-start segment would receive.
    fn upcoming_value_path(&self) -> PathPointer {
        let base = self.current_path();
        match self.frames.last() {
            None => base,
            Some(f) => match f.kind {
                ContainerKind::Object => match &f.pending_key {
                    Some(k) => base.child_key(k),
                    None => base,
                },
                ContainerKind::Array => base.child_index(f.next_index),
            },
        }
    }
}

/// Bind every directive segment to a scope and target path.
///
/// A directive before any value is `Document`; after the root value
/// completes it is `Trailer`; otherwise it targets the path of the next
/// value or member name (or the enclosing container when it sits before a
/// closing bracket).
pub fn bind_directives(seq: &[Segment]) -> Vec<BoundDirective> {
    let mut tracker = PathTracker::new();
    let mut out = Vec::new();
    for (i, seg) in seq.iter().enumerate() {
        if let Segment::Directive { text, offset, .. } = seg {
            let Some(directive) = Directive::parse(text.as_str()) else {
                continue;
            };
            let (scope, target) = if !tracker.seen_any_value {
                (DirectiveScope::Document, PathPointer::root())
            } else if tracker.root_done {
                (DirectiveScope::Trailer, PathPointer::root())
            } else {
                let next = seq[i + 1..].iter().find(|s| !s.is_meta());
                let target = match next {
                    Some(Segment::PropertyName { name, .. }) => {
                        tracker.current_path().child_key(name.as_str())
                    }
                    Some(Segment::Value { .. }) | Some(Segment::EnterContainer { .. }) => {
                        tracker.upcoming_value_path()
                    }
                    Some(Segment::ExitContainer { .. }) | None => tracker.current_path(),
                    Some(_) => tracker.current_path(),
                };
                (DirectiveScope::Target, target)
            };
            out.push(BoundDirective {
                directive,
                scope,
                target,
                offset: *offset,
            });
        }
        tracker.observe(seg);
    }
    out
}
