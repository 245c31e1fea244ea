//! Source Reader
//!
//! Character-level cursor over the input script. The input is split into
//! lines up front; a following line whose first non-blank character is `\`
//! is a continuation and is spliced into the stream at construction time
//! (the skipped prefix still advances column and byte offset).
//!
//! End of line and end of input are sentinel characters, not errors: the
//! cursor never fails, callers check for the sentinels explicitly. Position
//! queries always describe the next character to be consumed.

use crate::ast::types::Position;
use crate::parser::types::{isalnum, isalpha, isdigit, isnamec, iswhite, iswordc, isxdigit};

/// Sentinel returned when reading past the end of input.
pub const EOF: char = '\u{0}';
/// Sentinel separating lines in the character stream.
pub const EOL: char = '\n';

pub struct SourceReader {
    buf: Vec<char>,
    /// Position of each character in `buf`, plus one trailing entry for EOF.
    pos: Vec<Position>,
    i: usize,
}

impl SourceReader {
    pub fn new(lines: &[String]) -> Self {
        let mut buf = Vec::new();
        let mut pos = Vec::new();
        let mut offset = 0usize;
        let mut lnum = 0usize;
        while lnum < lines.len() {
            let mut col = 0usize;
            for c in lines[lnum].chars() {
                buf.push(c);
                pos.push(Position::new(lnum + 1, col + 1, offset));
                col += c.len_utf8();
                offset += c.len_utf8();
            }
            while lnum + 1 < lines.len() && is_continuation(&lines[lnum + 1]) {
                offset += 1; // newline of the previous physical line
                let mut skip = true;
                col = 0;
                for c in lines[lnum + 1].chars() {
                    if skip {
                        if c == '\\' {
                            skip = false;
                        }
                    } else {
                        buf.push(c);
                        pos.push(Position::new(lnum + 2, col + 1, offset));
                    }
                    col += c.len_utf8();
                    offset += c.len_utf8();
                }
                lnum += 1;
            }
            buf.push(EOL);
            pos.push(Position::new(lnum + 1, col + 1, offset));
            lnum += 1;
            offset += 1;
        }
        pos.push(Position::new(lnum + 1, 0, offset));
        Self { buf, pos, i: 0 }
    }

    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        // A trailing newline does not open one more (empty) line.
        let lines = match lines.as_slice() {
            [rest @ .., last] if last.is_empty() && !rest.is_empty() => rest.to_vec(),
            _ => lines,
        };
        Self::new(&lines)
    }

    // -------------------------------------------------------------------------
    // Cursor
    // -------------------------------------------------------------------------

    /// Next character, `EOL`/`EOF` included.
    pub fn peek(&self) -> char {
        self.buf.get(self.i).copied().unwrap_or(EOF)
    }

    /// Character `n` positions ahead.
    pub fn p(&self, n: usize) -> char {
        self.buf.get(self.i + n).copied().unwrap_or(EOF)
    }

    /// Consume and return one character.
    pub fn get(&mut self) -> char {
        let c = self.peek();
        if c != EOF {
            self.i += 1;
        }
        c
    }

    /// Up to `n` characters of the current line, without consuming.
    pub fn peekn(&self, n: usize) -> String {
        let mut s = String::new();
        let mut i = self.i;
        for _ in 0..n {
            match self.buf.get(i) {
                Some(&c) if c != EOL => s.push(c),
                _ => break,
            }
            i += 1;
        }
        s
    }

    /// Consume up to `n` characters, stopping at end of line.
    pub fn getn(&mut self, n: usize) -> String {
        let s = self.peekn(n);
        self.i += s.chars().count();
        s
    }

    /// The rest of the current line, without consuming.
    pub fn peek_line(&self) -> String {
        let mut s = String::new();
        let mut i = self.i;
        while let Some(&c) = self.buf.get(i) {
            if c == EOL {
                break;
            }
            s.push(c);
            i += 1;
        }
        s
    }

    /// Consume the rest of the current line, leaving the cursor at its EOL.
    pub fn get_line(&mut self) -> String {
        let s = self.peek_line();
        self.i += s.chars().count();
        s
    }

    /// Consume the rest of the current line including its terminator.
    pub fn readline(&mut self) -> String {
        let s = self.get_line();
        if self.peek() == EOL {
            self.i += 1;
        }
        s
    }

    pub fn is_eof(&self) -> bool {
        self.peek() == EOF
    }

    /// Position of the next character to be consumed.
    pub fn getpos(&self) -> Position {
        self.pos[self.i.min(self.pos.len() - 1)]
    }

    /// Position of a previously saved cursor index.
    pub fn pos_at(&self, i: usize) -> Position {
        self.pos[i.min(self.pos.len() - 1)]
    }

    pub fn tell(&self) -> usize {
        self.i
    }

    pub fn seek_set(&mut self, i: usize) {
        self.i = i;
    }

    pub fn seek_cur(&mut self, n: usize) {
        self.i = (self.i + n).min(self.buf.len());
    }

    pub fn seek_end(&mut self) {
        self.i = self.buf.len();
    }

    /// Source text between two saved cursor indices, line breaks restored.
    pub fn getstr(&self, begin: usize, end: usize) -> String {
        let mut s = String::new();
        for i in begin..end.min(self.buf.len()) {
            s.push(self.buf[i]);
        }
        s
    }

    // -------------------------------------------------------------------------
    // Lexical helpers
    // -------------------------------------------------------------------------

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        loop {
            let c = self.peek();
            if c == EOF || c == EOL || !pred(c) {
                break;
            }
            s.push(c);
            self.i += 1;
        }
        s
    }

    pub fn read_alpha(&mut self) -> String {
        self.read_while(isalpha)
    }

    pub fn read_alnum(&mut self) -> String {
        self.read_while(isalnum)
    }

    pub fn read_digit(&mut self) -> String {
        self.read_while(isdigit)
    }

    pub fn read_xdigit(&mut self) -> String {
        self.read_while(isxdigit)
    }

    pub fn read_bdigit(&mut self) -> String {
        self.read_while(|c| c == '0' || c == '1')
    }

    /// Optionally signed decimal integer.
    pub fn read_integer(&mut self) -> String {
        let mut s = String::new();
        let c = self.peek();
        if c == '-' || c == '+' {
            if !isdigit(self.p(1)) {
                return s;
            }
            s.push(self.get());
        }
        s.push_str(&self.read_digit());
        s
    }

    pub fn read_word(&mut self) -> String {
        self.read_while(iswordc)
    }

    pub fn read_white(&mut self) -> String {
        self.read_while(iswhite)
    }

    pub fn read_nonwhite(&mut self) -> String {
        self.read_while(|c| !iswhite(c))
    }

    pub fn read_name(&mut self) -> String {
        self.read_while(isnamec)
    }

    pub fn skip_white(&mut self) {
        while iswhite(self.peek()) {
            self.i += 1;
        }
    }

    pub fn skip_white_and_colon(&mut self) {
        loop {
            let c = self.peek();
            if !iswhite(c) && c != ':' {
                break;
            }
            self.i += 1;
        }
    }
}

fn is_continuation(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_get_positions() {
        let mut r = SourceReader::from_text("ab\ncd");
        assert_eq!(r.peek(), 'a');
        assert_eq!(r.getpos(), Position::new(1, 1, 0));
        assert_eq!(r.get(), 'a');
        assert_eq!(r.get(), 'b');
        assert_eq!(r.peek(), EOL);
        assert_eq!(r.getpos(), Position::new(1, 3, 2));
        assert_eq!(r.get(), EOL);
        assert_eq!(r.getpos(), Position::new(2, 1, 3));
        assert_eq!(r.getn(2), "cd");
        assert_eq!(r.get(), EOL);
        assert!(r.is_eof());
        assert_eq!(r.get(), EOF);
    }

    #[test]
    fn test_peekn_stops_at_eol() {
        let r = SourceReader::from_text("ab\ncd");
        assert_eq!(r.peekn(10), "ab");
    }

    #[test]
    fn test_line_continuation() {
        // "let x =" continued by "\ 1" reads as a single logical line
        let mut r = SourceReader::from_text("let x =\n      \\ 1\nnext");
        assert_eq!(r.get_line(), "let x = 1");
        // the continued chars carry their true physical position
        r.seek_set(0);
        let _ = r.getn(8);
        assert_eq!(r.getpos().line, 2);
    }

    #[test]
    fn test_readline_and_peek_line() {
        let mut r = SourceReader::from_text("one\ntwo");
        assert_eq!(r.peek_line(), "one");
        assert_eq!(r.readline(), "one");
        assert_eq!(r.peek_line(), "two");
    }

    #[test]
    fn test_getstr_restores_line_breaks() {
        let mut r = SourceReader::from_text("ab\ncd");
        let begin = r.tell();
        while !r.is_eof() {
            r.get();
        }
        assert_eq!(r.getstr(begin, r.tell()), "ab\ncd");
    }

    #[test]
    fn test_read_helpers() {
        let mut r = SourceReader::from_text("abc123  -45 g:name");
        assert_eq!(r.read_alpha(), "abc");
        assert_eq!(r.read_digit(), "123");
        r.skip_white();
        assert_eq!(r.read_integer(), "-45");
        r.skip_white();
        assert_eq!(r.read_name(), "g:name");
    }

    #[test]
    fn test_offsets_count_line_terminators() {
        let mut r = SourceReader::from_text("a\nb");
        r.get(); // a
        r.get(); // EOL
        assert_eq!(r.getpos(), Position::new(2, 1, 2));
    }
}
