//! Expression Tokenizer
//!
//! Tokenizes the expression sub-language. Comparison operators come in three
//! flavors: plain, `#` (case-sensitive) and `?` (case-insensitive), e.g.
//! `==`, `==#`, `==?`. Number tokens keep their exact source text so radix
//! and leading zeros survive into the AST.

use crate::ast::types::Position;
use crate::parser::reader::{SourceReader, EOF, EOL};
use crate::parser::types::{
    isdigit, isnamec1, iswhite, iswordc, ErrorKind, ParseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Eof,
    Eol,
    Space,
    OrOr,
    AndAnd,
    EqEq,
    EqEqCi,
    EqEqCs,
    Neq,
    NeqCi,
    NeqCs,
    Gt,
    GtCi,
    GtCs,
    GtEq,
    GtEqCi,
    GtEqCs,
    Lt,
    LtCi,
    LtCs,
    LtEq,
    LtEqCi,
    LtEqCs,
    Match,
    MatchCi,
    MatchCs,
    NoMatch,
    NoMatchCi,
    NoMatchCs,
    Is,
    IsCi,
    IsCs,
    IsNot,
    IsNotCi,
    IsNotCs,
    Plus,
    Minus,
    Dot,
    DotDotDot,
    Star,
    Slash,
    Percent,
    Not,
    Question,
    Colon,
    POpen,
    PClose,
    SqOpen,
    SqClose,
    COpen,
    CClose,
    Comma,
    Number,
    SQuote,
    DQuote,
    Option,
    Identifier,
    Env,
    Reg,
    Eq,
    Or,
    Semicolon,
    Backtick,
    Sharp,
    Arrow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ttype: TokenType,
    pub value: String,
    pub pos: Position,
}

pub struct ExprTokenizer<'a> {
    pub reader: &'a mut SourceReader,
}

impl<'a> ExprTokenizer<'a> {
    pub fn new(reader: &'a mut SourceReader) -> Self {
        Self { reader }
    }

    fn token(&self, ttype: TokenType, value: impl Into<String>, pos: Position) -> Token {
        Token { ttype, value: value.into(), pos }
    }

    /// Next token, skipping whitespace.
    pub fn get(&mut self) -> Result<Token, ParseError> {
        loop {
            let token = self.get2()?;
            if token.ttype != TokenType::Space {
                return Ok(token);
            }
        }
    }

    /// Next non-space token without consuming it.
    pub fn peek(&mut self) -> Result<Token, ParseError> {
        let pos = self.reader.tell();
        let token = self.get();
        self.reader.seek_set(pos);
        token
    }

    fn get2(&mut self) -> Result<Token, ParseError> {
        let pos = self.reader.getpos();
        let r = &mut *self.reader;
        let c = r.peek();
        if c == EOF {
            return Ok(self.token(TokenType::Eof, "<EOF>", pos));
        }
        if c == EOL {
            self.reader.seek_cur(1);
            return Ok(self.token(TokenType::Eol, "<EOL>", pos));
        }
        if iswhite(c) {
            let s = self.reader.read_white();
            return Ok(self.token(TokenType::Space, s, pos));
        }
        if c == '0' && (r.p(1) == 'x' || r.p(1) == 'X') && r.p(2).is_ascii_hexdigit() {
            let mut s = r.getn(3);
            s.push_str(&r.read_xdigit());
            return Ok(self.token(TokenType::Number, s, pos));
        }
        if c == '0' && (r.p(1) == 'b' || r.p(1) == 'B') && (r.p(2) == '0' || r.p(2) == '1') {
            let mut s = r.getn(3);
            s.push_str(&r.read_bdigit());
            return Ok(self.token(TokenType::Number, s, pos));
        }
        if isdigit(c) {
            let mut s = r.read_digit();
            if r.p(0) == '.' && isdigit(r.p(1)) {
                s.push_str(&r.getn(1));
                s.push_str(&r.read_digit());
                if (r.p(0) == 'E' || r.p(0) == 'e')
                    && (isdigit(r.p(1))
                        || ((r.p(1) == '-' || r.p(1) == '+') && isdigit(r.p(2))))
                {
                    s.push_str(&r.getn(2));
                    s.push_str(&r.read_digit());
                }
            }
            return Ok(self.token(TokenType::Number, s, pos));
        }
        if c == 'i'
            && r.p(1) == 's'
            && r.p(2) == 'n'
            && r.p(3) == 'o'
            && r.p(4) == 't'
            && !iswordc(r.p(5))
        {
            return Ok(match r.p(5) {
                '?' => {
                    r.seek_cur(6);
                    self.token(TokenType::IsNotCi, "isnot?", pos)
                }
                '#' => {
                    r.seek_cur(6);
                    self.token(TokenType::IsNotCs, "isnot#", pos)
                }
                _ => {
                    r.seek_cur(5);
                    self.token(TokenType::IsNot, "isnot", pos)
                }
            });
        }
        if c == 'i' && r.p(1) == 's' && !iswordc(r.p(2)) {
            return Ok(match r.p(2) {
                '?' => {
                    r.seek_cur(3);
                    self.token(TokenType::IsCi, "is?", pos)
                }
                '#' => {
                    r.seek_cur(3);
                    self.token(TokenType::IsCs, "is#", pos)
                }
                _ => {
                    r.seek_cur(2);
                    self.token(TokenType::Is, "is", pos)
                }
            });
        }
        if isnamec1(c) {
            let s = r.read_name();
            return Ok(self.token(TokenType::Identifier, s, pos));
        }
        if c == '|' && r.p(1) == '|' {
            r.seek_cur(2);
            return Ok(self.token(TokenType::OrOr, "||", pos));
        }
        if c == '&' && r.p(1) == '&' {
            r.seek_cur(2);
            return Ok(self.token(TokenType::AndAnd, "&&", pos));
        }
        if c == '=' && r.p(1) == '=' {
            return Ok(self.variant3(pos, TokenType::EqEq, TokenType::EqEqCi, TokenType::EqEqCs, "=="));
        }
        if c == '!' && r.p(1) == '=' {
            return Ok(self.variant3(pos, TokenType::Neq, TokenType::NeqCi, TokenType::NeqCs, "!="));
        }
        if c == '>' && r.p(1) == '=' {
            return Ok(self.variant3(pos, TokenType::GtEq, TokenType::GtEqCi, TokenType::GtEqCs, ">="));
        }
        if c == '<' && r.p(1) == '=' {
            return Ok(self.variant3(pos, TokenType::LtEq, TokenType::LtEqCi, TokenType::LtEqCs, "<="));
        }
        if c == '=' && r.p(1) == '~' {
            return Ok(self.variant3(pos, TokenType::Match, TokenType::MatchCi, TokenType::MatchCs, "=~"));
        }
        if c == '!' && r.p(1) == '~' {
            return Ok(self.variant3(pos, TokenType::NoMatch, TokenType::NoMatchCi, TokenType::NoMatchCs, "!~"));
        }
        if c == '>' {
            return Ok(self.variant2(pos, TokenType::Gt, TokenType::GtCi, TokenType::GtCs, ">"));
        }
        if c == '<' {
            return Ok(self.variant2(pos, TokenType::Lt, TokenType::LtCi, TokenType::LtCs, "<"));
        }
        match c {
            '+' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Plus, "+", pos))
            }
            '-' => {
                if self.reader.p(1) == '>' {
                    self.reader.seek_cur(2);
                    Ok(self.token(TokenType::Arrow, "->", pos))
                } else {
                    self.reader.seek_cur(1);
                    Ok(self.token(TokenType::Minus, "-", pos))
                }
            }
            '.' => {
                if self.reader.p(1) == '.' && self.reader.p(2) == '.' {
                    self.reader.seek_cur(3);
                    Ok(self.token(TokenType::DotDotDot, "...", pos))
                } else {
                    self.reader.seek_cur(1);
                    Ok(self.token(TokenType::Dot, ".", pos))
                }
            }
            '*' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Star, "*", pos))
            }
            '/' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Slash, "/", pos))
            }
            '%' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Percent, "%", pos))
            }
            '!' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Not, "!", pos))
            }
            '?' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Question, "?", pos))
            }
            ':' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Colon, ":", pos))
            }
            '#' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Sharp, "#", pos))
            }
            '(' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::POpen, "(", pos))
            }
            ')' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::PClose, ")", pos))
            }
            '[' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::SqOpen, "[", pos))
            }
            ']' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::SqClose, "]", pos))
            }
            '{' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::COpen, "{", pos))
            }
            '}' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::CClose, "}", pos))
            }
            ',' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Comma, ",", pos))
            }
            '\'' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::SQuote, "'", pos))
            }
            '"' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::DQuote, "\"", pos))
            }
            '$' => {
                let mut s = self.reader.getn(1);
                s.push_str(&self.reader.read_word());
                Ok(self.token(TokenType::Env, s, pos))
            }
            '@' => {
                let mut s = self.reader.getn(1);
                let c1 = self.reader.peek();
                if c1 != EOL && c1 != EOF {
                    s.push(self.reader.get());
                }
                Ok(self.token(TokenType::Reg, s, pos))
            }
            '&' => {
                let mut s = self.reader.getn(1);
                if (self.reader.p(0) == 'g' || self.reader.p(0) == 'l')
                    && self.reader.p(1) == ':'
                {
                    s.push_str(&self.reader.getn(2));
                }
                s.push_str(&self.reader.read_word());
                Ok(self.token(TokenType::Option, s, pos))
            }
            '=' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Eq, "=", pos))
            }
            '|' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Or, "|", pos))
            }
            ';' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Semicolon, ";", pos))
            }
            '`' => {
                self.reader.seek_cur(1);
                Ok(self.token(TokenType::Backtick, "`", pos))
            }
            _ => Err(ParseError::new(
                ErrorKind::InvalidExpression,
                format!("unexpected character: {}", c),
                pos,
            )),
        }
    }

    /// Two-char operator with `?`/`#` variants (`>=`, `==`, `=~`, ...).
    fn variant3(
        &mut self,
        pos: Position,
        plain: TokenType,
        ci: TokenType,
        cs: TokenType,
        base: &str,
    ) -> Token {
        match self.reader.p(2) {
            '?' => {
                self.reader.seek_cur(3);
                self.token(ci, format!("{}?", base), pos)
            }
            '#' => {
                self.reader.seek_cur(3);
                self.token(cs, format!("{}#", base), pos)
            }
            _ => {
                self.reader.seek_cur(2);
                self.token(plain, base, pos)
            }
        }
    }

    /// One-char operator with `?`/`#` variants (`>`, `<`).
    fn variant2(
        &mut self,
        pos: Position,
        plain: TokenType,
        ci: TokenType,
        cs: TokenType,
        base: &str,
    ) -> Token {
        match self.reader.p(1) {
            '?' => {
                self.reader.seek_cur(2);
                self.token(ci, format!("{}?", base), pos)
            }
            '#' => {
                self.reader.seek_cur(2);
                self.token(cs, format!("{}#", base), pos)
            }
            _ => {
                self.reader.seek_cur(1);
                self.token(plain, base, pos)
            }
        }
    }

    /// Body of a single-quoted string; `''` stays as-is (escaped quote).
    pub fn get_sstring(&mut self) -> Result<String, ParseError> {
        self.reader.skip_white();
        let npos = self.reader.getpos();
        let c = self.reader.get();
        if c != '\'' {
            return Err(ParseError::new(
                ErrorKind::InvalidExpression,
                format!("unexpected character: {}", c),
                npos,
            ));
        }
        let mut s = String::new();
        loop {
            let c = self.reader.get();
            if c == EOF || c == EOL {
                return Err(ParseError::new(
                    ErrorKind::InvalidExpression,
                    "unexpected EOL",
                    self.reader.getpos(),
                ));
            }
            if c == '\'' {
                if self.reader.peek() == '\'' {
                    self.reader.get();
                    s.push_str("''");
                } else {
                    break;
                }
            } else {
                s.push(c);
            }
        }
        Ok(s)
    }

    /// Body of a double-quoted string; backslash escapes are kept verbatim.
    pub fn get_dstring(&mut self) -> Result<String, ParseError> {
        self.reader.skip_white();
        let npos = self.reader.getpos();
        let c = self.reader.get();
        if c != '"' {
            return Err(ParseError::new(
                ErrorKind::InvalidExpression,
                format!("unexpected character: {}", c),
                npos,
            ));
        }
        let mut s = String::new();
        loop {
            let c = self.reader.get();
            if c == EOF || c == EOL {
                return Err(ParseError::new(
                    ErrorKind::InvalidExpression,
                    "unexpected EOL",
                    self.reader.getpos(),
                ));
            }
            if c == '"' {
                break;
            }
            if c == '\\' {
                s.push(c);
                let c = self.reader.get();
                if c == EOF || c == EOL {
                    return Err(ParseError::new(
                        ErrorKind::InvalidExpression,
                        "unexpected EOL",
                        self.reader.getpos(),
                    ));
                }
                s.push(c);
            } else {
                s.push(c);
            }
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<(TokenType, String)> {
        let mut reader = SourceReader::from_text(input);
        let mut tok = ExprTokenizer::new(&mut reader);
        let mut out = Vec::new();
        loop {
            let t = tok.get().unwrap();
            if t.ttype == TokenType::Eof || t.ttype == TokenType::Eol {
                break;
            }
            out.push((t.ttype, t.value));
        }
        out
    }

    #[test]
    fn test_comparison_variants() {
        let ts = tokens("a ==# b ==? c == d");
        let ops: Vec<TokenType> = ts.iter().map(|t| t.0).collect();
        assert_eq!(
            ops,
            vec![
                TokenType::Identifier,
                TokenType::EqEqCs,
                TokenType::Identifier,
                TokenType::EqEqCi,
                TokenType::Identifier,
                TokenType::EqEq,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn test_is_isnot() {
        let ts = tokens("a is b isnot# c");
        assert_eq!(ts[1], (TokenType::Is, "is".to_string()));
        assert_eq!(ts[3], (TokenType::IsNotCs, "isnot#".to_string()));
        // "island" is a name, not the operator
        let ts = tokens("island");
        assert_eq!(ts[0], (TokenType::Identifier, "island".to_string()));
    }

    #[test]
    fn test_numbers_keep_source_text() {
        assert_eq!(tokens("0x1F")[0], (TokenType::Number, "0x1F".to_string()));
        assert_eq!(tokens("0b101")[0], (TokenType::Number, "0b101".to_string()));
        assert_eq!(tokens("007")[0], (TokenType::Number, "007".to_string()));
        assert_eq!(tokens("1.5e-2")[0], (TokenType::Number, "1.5e-2".to_string()));
    }

    #[test]
    fn test_option_env_reg() {
        assert_eq!(tokens("&l:number")[0], (TokenType::Option, "&l:number".to_string()));
        assert_eq!(tokens("$HOME")[0], (TokenType::Env, "$HOME".to_string()));
        assert_eq!(tokens("@a")[0], (TokenType::Reg, "@a".to_string()));
    }

    #[test]
    fn test_arrow_and_ellipsis() {
        let ts = tokens("{x -> x}");
        assert_eq!(ts[2].0, TokenType::Arrow);
        assert_eq!(tokens("...")[0].0, TokenType::DotDotDot);
    }

    #[test]
    fn test_sstring() {
        let mut reader = SourceReader::from_text("'it''s'");
        let mut tok = ExprTokenizer::new(&mut reader);
        assert_eq!(tok.get_sstring().unwrap(), "it''s");
    }

    #[test]
    fn test_dstring_keeps_escapes() {
        let mut reader = SourceReader::from_text(r#""a\"b""#);
        let mut tok = ExprTokenizer::new(&mut reader);
        assert_eq!(tok.get_dstring().unwrap(), "a\\\"b");
    }
}
