//! Byte cursor over source text.
//!
//! The cursor dispatches on bytes (every token start in Kiln is ASCII) and
//! steps over whole UTF-8 characters where non-ASCII text may appear.
//! Reads past the end return `0`, which no byte predicate accepts.

/// Returns the earliest (minimum) of two optional positions.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    /// Byte at the current position, or `0` at end of input.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Byte one position ahead, or `0` past the end.
    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    fn byte_at(&self, index: usize) -> u8 {
        self.src.as_bytes().get(index).copied().unwrap_or(0)
    }

    /// The full character at the current position.
    pub(crate) fn current_char(&self) -> Option<char> {
        self.src.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    /// Step over one full UTF-8 character.
    pub(crate) fn advance_char(&mut self) {
        let width = self.current_char().map_or(1, char::len_utf8);
        self.pos += width;
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Source text between two byte offsets on character boundaries.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.src.get(start..end).unwrap_or_default()
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Advance while `pred` accepts the current byte.
    #[inline]
    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Advance while the current character is accepted, stepping whole
    /// characters.
    pub(crate) fn eat_chars_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.current_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Advance to the next `\n` or end of input.
    pub(crate) fn eat_until_newline_or_eof(&mut self) {
        let remaining = &self.src.as_bytes()[self.pos.min(self.src.len())..];
        match memchr::memchr(b'\n', remaining) {
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    /// Advance past the `*/` that closes a block comment.
    ///
    /// Returns `false` (cursor at end of input) if the comment is unclosed.
    pub(crate) fn eat_block_comment_body(&mut self) -> bool {
        let remaining = &self.src.as_bytes()[self.pos.min(self.src.len())..];
        match memchr::memmem::find(remaining, b"*/") {
            Some(offset) => {
                self.pos += offset + 2;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    /// Advance past ordinary string content to the next `"`, `\`, `\n` or
    /// `\r`. Returns the byte found, or `0` at end of input.
    pub(crate) fn skip_to_string_delim(&mut self) -> u8 {
        let remaining = &self.src.as_bytes()[self.pos.min(self.src.len())..];
        let primary = memchr::memchr3(b'"', b'\\', b'\n', remaining);
        let cr = memchr::memchr(b'\r', remaining);

        if let Some(off) = earliest_of(primary, cr) {
            self.pos += off;
            self.current()
        } else {
            self.pos = self.src.len();
            0
        }
    }
}

#[cfg(test)]
mod tests;
