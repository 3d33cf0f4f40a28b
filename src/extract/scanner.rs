//! Delimiter matching over JavaScript source text.
//!
//! Bytes inside `'…'`, `"…"` and `` `…` `` literals (backslash escapes
//! honoured) and inside `//` and `/* */` comments are never treated as
//! structure. Only the opener's own kind is counted, so a stray `]` inside
//! an object does not affect brace depth.

/// Iterator over the byte offsets of structural (non-string, non-comment) bytes.
pub struct CodeBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CodeBytes<'a> {
    pub fn new(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
        }
    }

    fn skip_string(&mut self, quote: u8) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        while self.pos + 1 < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        self.pos = self.bytes.len();
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.bytes.len() {
            let at = self.pos;
            let byte = self.bytes[at];
            self.pos += 1;

            match byte {
                b'\'' | b'"' | b'`' => self.skip_string(byte),
                b'/' if self.bytes.get(self.pos) == Some(&b'/') => self.skip_line_comment(),
                b'/' if self.bytes.get(self.pos) == Some(&b'*') => {
                    self.pos += 1;
                    self.skip_block_comment();
                }
                _ => return Some((at, byte)),
            }
        }
        None
    }
}

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        _ => None,
    }
}

/// Index of the delimiter closing the one at `open`.
///
/// Returns `None` when `open` is not an opening delimiter or the text ends
/// before depth returns to zero.
pub fn find_matching(text: &str, open: usize) -> Option<usize> {
    let opener = *text.as_bytes().get(open)?;
    let closer = closer_for(opener)?;
    let mut depth = 0usize;

    for (at, byte) in CodeBytes::new(text, open) {
        if byte == opener {
            depth += 1;
        } else if byte == closer {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        }
    }
    None
}

/// First structural occurrence of `byte` at or after `from`.
pub fn find_code_byte(text: &str, from: usize, byte: u8) -> Option<usize> {
    CodeBytes::new(text, from)
        .find(|(_, b)| *b == byte)
        .map(|(at, _)| at)
}

/// Top-level `{…}` spans inside `text`, in order of appearance.
pub fn object_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut from = 0;

    while let Some(open) = find_code_byte(text, from, b'{') {
        match find_matching(text, open) {
            Some(close) => {
                spans.push((open, close));
                from = close + 1;
            }
            None => from = open + 1,
        }
    }
    spans
}
