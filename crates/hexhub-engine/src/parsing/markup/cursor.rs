/// A byte cursor over the inside of a tag.
///
/// Only ASCII delimiters are ever matched, so slicing `s` at cursor
/// positions always lands on character boundaries.
#[derive(Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.i += 1;
        }
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while self.peek().is_some_and(&pred) {
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    /// Consumes up to (not including) `delim`, then the delimiter itself if
    /// present.
    pub fn take_until(&mut self, delim: u8) -> &'a str {
        let taken = self.take_while(|b| b != delim);
        self.bump();
        taken
    }
}
