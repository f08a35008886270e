//! Segment data model: the flat, causally-ordered events emitted by the
//! parser, and the classified text slices they carry.

/// Classification flags attached to a [`Slice`].
///
/// Stored as a plain bitmask; the constants are independent bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SliceFlags(u8);

impl SliceFlags {
    pub const HAS_ESCAPES: SliceFlags = SliceFlags(1);
    pub const HAS_NON_ASCII: SliceFlags = SliceFlags(1 << 1);
    pub const IDENTIFIER_STYLE: SliceFlags = SliceFlags(1 << 2);
    pub const NUMBER_HEX: SliceFlags = SliceFlags(1 << 3);
    pub const NUMBER_BINARY: SliceFlags = SliceFlags(1 << 4);
    pub const NUMBER_OCTAL: SliceFlags = SliceFlags(1 << 5);
    pub const NUMBER_TYPED: SliceFlags = SliceFlags(1 << 6);

    pub const fn empty() -> SliceFlags {
        SliceFlags(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: SliceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SliceFlags) {
        self.0 |= other.0;
    }

    pub const fn union(self, other: SliceFlags) -> SliceFlags {
        SliceFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for SliceFlags {
    type Output = SliceFlags;
    fn bitor(self, rhs: SliceFlags) -> SliceFlags {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for SliceFlags {
    fn bitor_assign(&mut self, rhs: SliceFlags) {
        self.insert(rhs);
    }
}

/// Raw token payload plus classification flags.
///
/// The text is the unquoted token content: for strings the bytes between the
/// quotes (escapes decoded or preserved per settings), for numbers the
/// digit-and-sign text including any base prefix, for identifiers the
/// identifier itself, for comments and directives the content after the
/// marker. Equality is byte-exact plus flag equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    pub text: Box<str>,
    pub flags: SliceFlags,
}

impl Slice {
    pub fn new(text: impl Into<Box<str>>, flags: SliceFlags) -> Self {
        Self {
            text: text.into(),
            flags,
        }
    }

    /// Build a slice, deriving `HAS_ESCAPES`/`HAS_NON_ASCII` from the bytes.
    /// Used by transforms that fabricate or rewrite slices after the lexer.
    pub fn classified(text: impl Into<Box<str>>) -> Self {
        let text = text.into();
        let mut flags = SliceFlags::empty();
        for &b in text.as_bytes() {
            if b == b'\\' {
                flags |= SliceFlags::HAS_ESCAPES;
            }
            if b > 0x7F {
                flags |= SliceFlags::HAS_NON_ASCII;
            }
        }
        Self { text, flags }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Kind of container a bracket pair delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerKind {
    Object,
    Array,
}

/// Kind of a primitive value segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
}

/// One event in the parser's output stream.
///
/// `depth` is the nesting level of the *containing* container: the enter and
/// exit of an outermost object carry depth 0 and its direct children carry
/// depth 1, so summing enters minus exits never goes negative and ends at
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    EnterContainer {
        kind: ContainerKind,
        offset: u64,
        depth: u32,
    },
    ExitContainer {
        kind: ContainerKind,
        offset: u64,
        depth: u32,
    },
    PropertyName {
        name: Slice,
        offset: u64,
        depth: u32,
    },
    Value {
        kind: ValueKind,
        value: Option<Slice>,
        offset: u64,
        depth: u32,
    },
    Comment {
        text: Slice,
        offset: u64,
        depth: u32,
    },
    Directive {
        text: Slice,
        offset: u64,
        depth: u32,
    },
}

impl Segment {
    pub fn offset(&self) -> u64 {
        match self {
            Segment::EnterContainer { offset, .. }
            | Segment::ExitContainer { offset, .. }
            | Segment::PropertyName { offset, .. }
            | Segment::Value { offset, .. }
            | Segment::Comment { offset, .. }
            | Segment::Directive { offset, .. } => *offset,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            Segment::EnterContainer { depth, .. }
            | Segment::ExitContainer { depth, .. }
            | Segment::PropertyName { depth, .. }
            | Segment::Value { depth, .. }
            | Segment::Comment { depth, .. }
            | Segment::Directive { depth, .. } => *depth,
        }
    }

    /// True for segments that begin a value: a primitive or a container
    /// enter. Property names, comments, and directives are not value starts.
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Segment::Value { .. } | Segment::EnterContainer { .. }
        )
    }

    /// True for comment and directive segments, which interleave between
    /// members without affecting structure.
    pub fn is_meta(&self) -> bool {
        matches!(self, Segment::Comment { .. } | Segment::Directive { .. })
    }
}
