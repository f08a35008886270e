/// A location in the input byte stream.
///
/// `line` and `column` are 1-based. The column counts UTF-8 sequence starts,
/// not display width: continuation bytes do not advance it, so a multi-byte
/// character advances the column exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextPosition {
    pub offset: u64,
    pub line: u32,
    pub column: u32,
}

impl TextPosition {
    /// The position of the first byte of a document.
    pub const START: TextPosition = TextPosition {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::START
    }
}

impl std::fmt::Display for TextPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Incremental position tracker shared by both reader implementations.
///
/// CR, LF, and CRLF each advance the line exactly once; the CR of a CRLF pair
/// takes the increment and the following LF only resets the column.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PositionTracker {
    pos: TextPosition,
    prev_was_cr: bool,
}

impl PositionTracker {
    pub(crate) fn new() -> Self {
        Self {
            pos: TextPosition::START,
            prev_was_cr: false,
        }
    }

    pub(crate) fn with_state(pos: TextPosition, prev_was_cr: bool) -> Self {
        Self { pos, prev_was_cr }
    }

    pub(crate) fn position(&self) -> TextPosition {
        self.pos
    }

    pub(crate) fn prev_was_cr(&self) -> bool {
        self.prev_was_cr
    }

    pub(crate) fn advance(&mut self, byte: u8) {
        self.pos.offset += 1;
        match byte {
            b'\n' => {
                if !self.prev_was_cr {
                    self.pos.line += 1;
                }
                self.pos.column = 1;
                self.prev_was_cr = false;
            }
            b'\r' => {
                self.pos.line += 1;
                self.pos.column = 1;
                self.prev_was_cr = true;
            }
            // UTF-8 continuation byte: column stays on the sequence start.
            b if b & 0xC0 == 0x80 => {
                self.prev_was_cr = false;
            }
            _ => {
                self.pos.column += 1;
                self.prev_was_cr = false;
            }
        }
    }
}
