//! Expression Parser
//!
//! Precedence-climbing parser for the expression sub-language. One function
//! per precedence level, lowest binding first:
//!
//!   expr1  ternary `?:` (right associative)
//!   expr2  logical `||`
//!   expr3  logical `&&`
//!   expr4  comparisons (non-associative, with `#`/`?` variants)
//!   expr5  `+` `-` `.`
//!   expr6  `*` `/` `%`
//!   expr7  unary `!` `-` `+` (prefix, right associative)
//!   expr8  postfix: subscript, slice, call, member access
//!   expr9  primaries
//!
//! The lvalue parser at the bottom accepts only the subset valid as an
//! assignment target (no calls, no operators).

use crate::ast::types::*;
use crate::parser::reader::SourceReader;
use crate::parser::tokenizer::{ExprTokenizer, Token, TokenType};
use crate::parser::types::{
    isargname, isnamec, isnamec1, iswhite, iswordc, ErrorKind, ParseError, MAX_FUNC_ARGS,
    MAX_NEST_DEPTH,
};

fn err_token(token: &Token) -> ParseError {
    ParseError::new(
        ErrorKind::InvalidExpression,
        format!("unexpected token: {}", token.value),
        token.pos,
    )
}

/// A closer was required. When the line or input simply ran out, report the
/// missing closer at the position of its opener; a wrong token is reported
/// as itself.
fn expect_close(
    token: &Token,
    expected: TokenType,
    closer: char,
    opener: Position,
) -> Result<(), ParseError> {
    if token.ttype == expected {
        return Ok(());
    }
    if token.ttype == TokenType::Eol || token.ttype == TokenType::Eof {
        return Err(ParseError::new(
            ErrorKind::InvalidExpression,
            format!("missing closing {}", closer),
            opener,
        ));
    }
    Err(err_token(token))
}

pub struct ExprParser<'a> {
    tok: ExprTokenizer<'a>,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    pub fn new(reader: &'a mut SourceReader) -> Self {
        Self { tok: ExprTokenizer::new(reader), depth: 0 }
    }

    fn reader(&mut self) -> &mut SourceReader {
        self.tok.reader
    }

    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr1()
    }

    // expr1: expr2 ? expr1 : expr1
    pub fn parse_expr1(&mut self) -> Result<Expr, ParseError> {
        self.depth += 1;
        if self.depth > MAX_NEST_DEPTH {
            let pos = self.reader().getpos();
            self.depth -= 1;
            return Err(ParseError::new(
                ErrorKind::InvalidExpression,
                "expression nested too deep",
                pos,
            ));
        }
        let result = self.parse_ternary();
        self.depth -= 1;
        result
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr2()?;
        let pos = self.reader().tell();
        let token = self.tok.get()?;
        if token.ttype == TokenType::Question {
            let npos = token.pos;
            let cond = left;
            let then_expr = self.parse_expr1()?;
            let colon = self.tok.get()?;
            if colon.ttype != TokenType::Colon {
                return Err(err_token(&colon));
            }
            let else_expr = self.parse_expr1()?;
            left = Expr::Ternary(Ternary {
                pos: npos,
                cond: Box::new(cond),
                left: Box::new(then_expr),
                right: Box::new(else_expr),
            });
        } else {
            self.reader().seek_set(pos);
        }
        Ok(left)
    }

    // expr2: expr3 || expr3 ..
    fn parse_expr2(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr3()?;
        loop {
            let pos = self.reader().tell();
            let token = self.tok.get()?;
            if token.ttype == TokenType::OrOr {
                let right = self.parse_expr3()?;
                left = binary(token.pos, BinaryOp::Or, left, right);
            } else {
                self.reader().seek_set(pos);
                break;
            }
        }
        Ok(left)
    }

    // expr3: expr4 && expr4 ..
    fn parse_expr3(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr4()?;
        loop {
            let pos = self.reader().tell();
            let token = self.tok.get()?;
            if token.ttype == TokenType::AndAnd {
                let right = self.parse_expr4()?;
                left = binary(token.pos, BinaryOp::And, left, right);
            } else {
                self.reader().seek_set(pos);
                break;
            }
        }
        Ok(left)
    }

    // expr4: expr5 {cmp} expr5  (a single comparison; chaining is rejected
    // downstream as an unexpected token)
    fn parse_expr4(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_expr5()?;
        let pos = self.reader().tell();
        let token = self.tok.get()?;
        let op = match token.ttype {
            TokenType::EqEq => Some(BinaryOp::Equal),
            TokenType::EqEqCi => Some(BinaryOp::EqualCi),
            TokenType::EqEqCs => Some(BinaryOp::EqualCs),
            TokenType::Neq => Some(BinaryOp::NotEqual),
            TokenType::NeqCi => Some(BinaryOp::NotEqualCi),
            TokenType::NeqCs => Some(BinaryOp::NotEqualCs),
            TokenType::Gt => Some(BinaryOp::Greater),
            TokenType::GtCi => Some(BinaryOp::GreaterCi),
            TokenType::GtCs => Some(BinaryOp::GreaterCs),
            TokenType::GtEq => Some(BinaryOp::GreaterEqual),
            TokenType::GtEqCi => Some(BinaryOp::GreaterEqualCi),
            TokenType::GtEqCs => Some(BinaryOp::GreaterEqualCs),
            TokenType::Lt => Some(BinaryOp::Smaller),
            TokenType::LtCi => Some(BinaryOp::SmallerCi),
            TokenType::LtCs => Some(BinaryOp::SmallerCs),
            TokenType::LtEq => Some(BinaryOp::SmallerEqual),
            TokenType::LtEqCi => Some(BinaryOp::SmallerEqualCi),
            TokenType::LtEqCs => Some(BinaryOp::SmallerEqualCs),
            TokenType::Match => Some(BinaryOp::Match),
            TokenType::MatchCi => Some(BinaryOp::MatchCi),
            TokenType::MatchCs => Some(BinaryOp::MatchCs),
            TokenType::NoMatch => Some(BinaryOp::NoMatch),
            TokenType::NoMatchCi => Some(BinaryOp::NoMatchCi),
            TokenType::NoMatchCs => Some(BinaryOp::NoMatchCs),
            TokenType::Is => Some(BinaryOp::Is),
            TokenType::IsCi => Some(BinaryOp::IsCi),
            TokenType::IsCs => Some(BinaryOp::IsCs),
            TokenType::IsNot => Some(BinaryOp::IsNot),
            TokenType::IsNotCi => Some(BinaryOp::IsNotCi),
            TokenType::IsNotCs => Some(BinaryOp::IsNotCs),
            _ => None,
        };
        match op {
            Some(op) => {
                let right = self.parse_expr5()?;
                Ok(binary(token.pos, op, left, right))
            }
            None => {
                self.reader().seek_set(pos);
                Ok(left)
            }
        }
    }

    // expr5: expr6 + - . expr6 ..
    fn parse_expr5(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr6()?;
        loop {
            let pos = self.reader().tell();
            let token = self.tok.get()?;
            let op = match token.ttype {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                TokenType::Dot => BinaryOp::Concat,
                _ => {
                    self.reader().seek_set(pos);
                    break;
                }
            };
            let right = self.parse_expr6()?;
            left = binary(token.pos, op, left, right);
        }
        Ok(left)
    }

    // expr6: expr7 * / % expr7 ..
    fn parse_expr6(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr7()?;
        loop {
            let pos = self.reader().tell();
            let token = self.tok.get()?;
            let op = match token.ttype {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Percent => BinaryOp::Remainder,
                _ => {
                    self.reader().seek_set(pos);
                    break;
                }
            };
            let right = self.parse_expr7()?;
            left = binary(token.pos, op, left, right);
        }
        Ok(left)
    }

    // expr7: ! - + expr7 (prefix)
    fn parse_expr7(&mut self) -> Result<Expr, ParseError> {
        let pos = self.reader().tell();
        let token = self.tok.get()?;
        let op = match token.ttype {
            TokenType::Not => UnaryOp::Not,
            TokenType::Minus => UnaryOp::Minus,
            TokenType::Plus => UnaryOp::Plus,
            _ => {
                self.reader().seek_set(pos);
                return self.parse_expr8();
            }
        };
        let expr = self.parse_expr7()?;
        Ok(Expr::Unary(Unary { pos: token.pos, op, expr: Box::new(expr) }))
    }

    // expr8: expr8[expr1], expr8[expr1 : expr1], expr8(...), expr8.name
    fn parse_expr8(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_expr9()?;
        loop {
            let pos = self.reader().tell();
            let c = self.reader().peek();
            let token = self.tok.get()?;
            if !iswhite(c) && token.ttype == TokenType::SqOpen {
                left = self.parse_subscript_or_slice(token.pos, left)?;
            } else if token.ttype == TokenType::POpen {
                left = self.parse_call(token.pos, left)?;
            } else if !iswhite(c) && token.ttype == TokenType::Dot {
                match self.parse_dot(&token, left)? {
                    DotResult::Member(node) => left = node,
                    DotResult::NotMember(old_left) => {
                        left = old_left;
                        self.reader().seek_set(pos);
                        break;
                    }
                }
            } else {
                self.reader().seek_set(pos);
                break;
            }
        }
        Ok(left)
    }

    fn parse_subscript_or_slice(
        &mut self,
        npos: Position,
        left: Expr,
    ) -> Result<Expr, ParseError> {
        if self.tok.peek()?.ttype == TokenType::Colon {
            // expr8[: high]
            self.tok.get()?;
            let high = if self.tok.peek()?.ttype == TokenType::SqClose {
                None
            } else {
                Some(Box::new(self.parse_expr1()?))
            };
            let token = self.tok.get()?;
            expect_close(&token, TokenType::SqClose, ']', npos)?;
            return Ok(Expr::Slice(Slice { pos: npos, left: Box::new(left), low: None, high }));
        }
        let right = self.parse_expr1()?;
        if self.tok.peek()?.ttype == TokenType::Colon {
            // expr8[low : high]
            self.tok.get()?;
            let high = if self.tok.peek()?.ttype == TokenType::SqClose {
                None
            } else {
                Some(Box::new(self.parse_expr1()?))
            };
            let token = self.tok.get()?;
            expect_close(&token, TokenType::SqClose, ']', npos)?;
            Ok(Expr::Slice(Slice {
                pos: npos,
                left: Box::new(left),
                low: Some(Box::new(right)),
                high,
            }))
        } else {
            let token = self.tok.get()?;
            expect_close(&token, TokenType::SqClose, ']', npos)?;
            Ok(Expr::Subscript(Subscript {
                pos: npos,
                left: Box::new(left),
                right: Box::new(right),
            }))
        }
    }

    fn parse_call(&mut self, npos: Position, left: Expr) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if self.tok.peek()?.ttype == TokenType::PClose {
            self.tok.get()?;
        } else {
            loop {
                args.push(self.parse_expr1()?);
                let token = self.tok.get()?;
                if token.ttype == TokenType::Comma {
                    // a trailing comma before ) is accepted
                    if self.tok.peek()?.ttype == TokenType::PClose {
                        self.tok.get()?;
                        break;
                    }
                } else if token.ttype == TokenType::PClose {
                    break;
                } else {
                    expect_close(&token, TokenType::PClose, ')', npos)?;
                }
            }
        }
        if args.len() > MAX_FUNC_ARGS {
            return Err(ParseError::new(
                ErrorKind::InvalidExpression,
                "E740: Too many arguments for function",
                npos,
            ));
        }
        Ok(Expr::Call(Call { pos: npos, fun: Box::new(left), args }))
    }

    /// Member access is only valid after a name-like or container value and
    /// only when a word follows; otherwise the dot is handed back to the
    /// caller (it may be concatenation), along with the untouched left side.
    fn parse_dot(&mut self, token: &Token, left: Expr) -> Result<DotResult, ParseError> {
        match &left {
            Expr::Ident(_)
            | Expr::CurlyName(_)
            | Expr::Dict(_)
            | Expr::Subscript(_)
            | Expr::Call(_)
            | Expr::Dot(_) => {}
            _ => return Ok(DotResult::NotMember(left)),
        }
        if !iswordc(self.reader().p(0)) {
            return Ok(DotResult::NotMember(left));
        }
        let pos = self.reader().getpos();
        let name = self.reader().read_word();
        if isnamec1(self.reader().p(0)) {
            // foo.bar123baz is ambiguous, not a member access
            return Ok(DotResult::NotMember(left));
        }
        Ok(DotResult::Member(Expr::Dot(Dot {
            pos: token.pos,
            left: Box::new(left),
            right: Ident { pos, name },
        })))
    }

    // expr9: number, string, list, dict, lambda, (expr1), option, variable,
    // curly name, env var, register
    fn parse_expr9(&mut self) -> Result<Expr, ParseError> {
        let pos = self.reader().tell();
        let token = self.tok.get()?;
        match token.ttype {
            TokenType::Number => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Number,
                value: token.value,
            })),
            TokenType::DQuote => {
                self.reader().seek_set(pos);
                let s = self.tok.get_dstring()?;
                Ok(Expr::Lit(Lit {
                    pos: token.pos,
                    kind: LitKind::String,
                    value: format!("\"{}\"", s),
                }))
            }
            TokenType::SQuote => {
                self.reader().seek_set(pos);
                let s = self.tok.get_sstring()?;
                Ok(Expr::Lit(Lit {
                    pos: token.pos,
                    kind: LitKind::String,
                    value: format!("'{}'", s),
                }))
            }
            TokenType::SqOpen => self.parse_list(token.pos),
            TokenType::COpen => self.parse_dict_or_lambda(pos, token.pos),
            TokenType::POpen => {
                let node = self.parse_expr1()?;
                let close = self.tok.get()?;
                expect_close(&close, TokenType::PClose, ')', token.pos)?;
                Ok(node)
            }
            TokenType::Option => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Option,
                value: token.value,
            })),
            TokenType::Identifier => {
                self.reader().seek_set(pos);
                self.parse_identifier()
            }
            TokenType::Lt if self.reader().peekn(4).eq_ignore_ascii_case("SID>") => {
                self.reader().seek_set(pos);
                self.parse_identifier()
            }
            TokenType::Env => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Env,
                value: token.value,
            })),
            TokenType::Reg => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Reg,
                value: token.value,
            })),
            _ => Err(err_token(&token)),
        }
    }

    fn parse_list(&mut self, npos: Position) -> Result<Expr, ParseError> {
        let mut items = Vec::new();
        if self.tok.peek()?.ttype == TokenType::SqClose {
            self.tok.get()?;
            return Ok(Expr::List(List { pos: npos, items }));
        }
        loop {
            items.push(self.parse_expr1()?);
            let token = self.tok.peek()?;
            match token.ttype {
                TokenType::Comma => {
                    self.tok.get()?;
                    if self.tok.peek()?.ttype == TokenType::SqClose {
                        self.tok.get()?;
                        break;
                    }
                }
                TokenType::SqClose => {
                    self.tok.get()?;
                    break;
                }
                _ => {
                    expect_close(&token, TokenType::SqClose, ']', npos)?;
                }
            }
        }
        Ok(Expr::List(List { pos: npos, items }))
    }

    /// After `{`: a lambda (`{x -> ...}`, `{-> ...}`), a dict literal, or a
    /// fallback to a curly-name expression like `{expr}`.
    fn parse_dict_or_lambda(
        &mut self,
        start: usize,
        nodepos: Position,
    ) -> Result<Expr, ParseError> {
        let savepos = self.reader().tell();
        let mut token = self.tok.get()?;
        let mut lambda = token.ttype == TokenType::Arrow;
        if !lambda && token.ttype != TokenType::SQuote && token.ttype != TokenType::DQuote {
            let token2 = self.tok.peek()?;
            lambda = token2.ttype == TokenType::Arrow || token2.ttype == TokenType::Comma;
        }
        if lambda {
            let mut params: Vec<Ident> = Vec::new();
            let mut fallback = false;
            loop {
                match token.ttype {
                    TokenType::Arrow => break,
                    TokenType::Identifier => {
                        if !isargname(&token.value) {
                            return Err(ParseError::new(
                                ErrorKind::InvalidExpression,
                                format!("E125: Illegal argument: {}", token.value),
                                token.pos,
                            ));
                        }
                        if params.iter().any(|p| p.name == token.value) {
                            return Err(ParseError::new(
                                ErrorKind::InvalidExpression,
                                format!("E853: Duplicate argument name: {}", token.value),
                                token.pos,
                            ));
                        }
                        let varnode = Ident { pos: token.pos, name: token.value.clone() };
                        if iswhite(self.reader().p(0))
                            && self.tok.peek()?.ttype == TokenType::Comma
                        {
                            return Err(ParseError::new(
                                ErrorKind::InvalidExpression,
                                "E475: Invalid argument: White space is not allowed before comma",
                                self.reader().getpos(),
                            ));
                        }
                        let next = self.tok.get()?;
                        params.push(varnode);
                        if next.ttype == TokenType::Comma {
                            // a trailing comma before -> is accepted
                            if self.tok.peek()?.ttype == TokenType::Arrow {
                                self.tok.get()?;
                                break;
                            }
                        } else if next.ttype == TokenType::Arrow {
                            break;
                        } else {
                            return Err(err_token(&next));
                        }
                    }
                    TokenType::DotDotDot => {
                        params.push(Ident { pos: token.pos, name: token.value.clone() });
                        let next = self.tok.peek()?;
                        if next.ttype == TokenType::Arrow {
                            self.tok.get()?;
                            break;
                        } else {
                            return Err(err_token(&next));
                        }
                    }
                    _ => {
                        fallback = true;
                        break;
                    }
                }
                token = self.tok.get()?;
            }
            if !fallback {
                let expr = self.parse_expr1()?;
                let close = self.tok.get()?;
                expect_close(&close, TokenType::CClose, '}', nodepos)?;
                return Ok(Expr::Lambda(Lambda {
                    pos: nodepos,
                    params,
                    expr: Box::new(expr),
                }));
            }
        }
        // dict literal
        let mut entries = Vec::new();
        self.reader().seek_set(savepos);
        if self.tok.peek()?.ttype == TokenType::CClose {
            self.tok.get()?;
            return Ok(Expr::Dict(Dict { pos: nodepos, entries }));
        }
        loop {
            let key = self.parse_expr1()?;
            let token = self.tok.get()?;
            if token.ttype == TokenType::CClose {
                if !entries.is_empty() {
                    return Err(err_token(&token));
                }
                // {expr} is a curly-name expression, not a dict
                self.reader().seek_set(start);
                return self.parse_identifier();
            }
            if token.ttype != TokenType::Colon {
                return Err(err_token(&token));
            }
            let value = self.parse_expr1()?;
            entries.push(KeyValue { key, value });
            let token = self.tok.get()?;
            match token.ttype {
                TokenType::Comma => {
                    if self.tok.peek()?.ttype == TokenType::CClose {
                        self.tok.get()?;
                        break;
                    }
                }
                TokenType::CClose => break,
                _ => {
                    expect_close(&token, TokenType::CClose, '}', nodepos)?;
                }
            }
        }
        Ok(Expr::Dict(Dict { pos: nodepos, entries }))
    }

    /// A plain identifier, or a curly name when `{...}` parts are present.
    pub fn parse_identifier(&mut self) -> Result<Expr, ParseError> {
        self.reader().skip_white();
        let npos = self.reader().getpos();
        let parts = self.parse_curly_parts()?;
        if parts.len() == 1 {
            if let CurlyNamePart::Lit(lit) = &parts[0] {
                return Ok(Expr::Ident(Ident { pos: npos, name: lit.value.clone() }));
            }
        }
        Ok(Expr::CurlyName(CurlyName { pos: npos, parts }))
    }

    fn parse_curly_parts(&mut self) -> Result<Vec<CurlyNamePart>, ParseError> {
        let mut parts = Vec::new();
        let c = self.reader().peek();
        let pos = self.reader().getpos();
        if c == '<' && self.reader().peekn(5).eq_ignore_ascii_case("<SID>") {
            let name = self.reader().getn(5);
            parts.push(CurlyNamePart::Lit(CurlyNameLit { pos, value: name }));
        }
        loop {
            let c = self.reader().peek();
            if isnamec(c) {
                let pos = self.reader().getpos();
                let name = self.reader().read_name();
                parts.push(CurlyNamePart::Lit(CurlyNameLit { pos, value: name }));
            } else if c == '{' {
                self.reader().get();
                let pos = self.reader().getpos();
                let expr = self.parse_expr1()?;
                parts.push(CurlyNamePart::Expr(CurlyNameExpr {
                    pos,
                    expr: Box::new(expr),
                }));
                self.reader().skip_white();
                let c = self.reader().p(0);
                if c != '}' {
                    return Err(ParseError::new(
                        ErrorKind::InvalidExpression,
                        format!("unexpected token: {}", c),
                        self.reader().getpos(),
                    ));
                }
                self.reader().seek_cur(1);
            } else {
                break;
            }
        }
        Ok(parts)
    }

    // -------------------------------------------------------------------------
    // Lvalue parsing: the subset of expr8/expr9 valid as assignment targets
    // -------------------------------------------------------------------------

    /// lv8: lv9 with subscript, slice, and member postfixes (no calls).
    pub fn parse_lvalue_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_lv9()?;
        loop {
            let pos = self.reader().tell();
            let c = self.reader().peek();
            let token = self.tok.get()?;
            if !iswhite(c) && token.ttype == TokenType::SqOpen {
                left = self.parse_subscript_or_slice(token.pos, left)?;
            } else if !iswhite(c) && token.ttype == TokenType::Dot {
                match self.parse_dot(&token, left)? {
                    DotResult::Member(node) => left = node,
                    DotResult::NotMember(old_left) => {
                        left = old_left;
                        self.reader().seek_set(pos);
                        break;
                    }
                }
            } else {
                self.reader().seek_set(pos);
                break;
            }
        }
        Ok(left)
    }

    /// lv9: &option, variable, var{ria}ble, $VAR, @r.
    fn parse_lv9(&mut self) -> Result<Expr, ParseError> {
        let pos = self.reader().tell();
        let token = self.tok.get()?;
        match token.ttype {
            TokenType::COpen | TokenType::Identifier => {
                self.reader().seek_set(pos);
                self.parse_identifier()
            }
            TokenType::Lt if self.reader().peekn(4).eq_ignore_ascii_case("SID>") => {
                self.reader().seek_set(pos);
                self.parse_identifier()
            }
            TokenType::Option => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Option,
                value: token.value,
            })),
            TokenType::Env => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Env,
                value: token.value,
            })),
            TokenType::Reg => Ok(Expr::Lit(Lit {
                pos: token.pos,
                kind: LitKind::Reg,
                value: token.value,
            })),
            _ => Err(err_token(&token)),
        }
    }
}

fn binary(pos: Position, op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(Binary { pos, op, left: Box::new(left), right: Box::new(right) })
}

enum DotResult {
    Member(Expr),
    NotMember(Expr),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        let mut reader = SourceReader::from_text(input);
        ExprParser::new(&mut reader).parse()
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        match parse("1 + 2 * 3").unwrap() {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Add);
                match *b.right {
                    Expr::Binary(inner) => assert_eq!(inner.op, BinaryOp::Multiply),
                    other => panic!("unexpected rhs: {:?}", other),
                }
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_ternary_right_assoc() {
        match parse("a ? b : c ? d : e").unwrap() {
            Expr::Ternary(t) => match *t.right {
                Expr::Ternary(_) => {}
                other => panic!("unexpected else branch: {:?}", other),
            },
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_token_position() {
        let err = parse("1 // 2").unwrap_err();
        assert_eq!(err.message, "unexpected token: /");
        assert_eq!(err.pos.line, 1);
        assert_eq!(err.pos.column, 4);
    }

    #[test]
    fn test_slice_open_bounds() {
        match parse("x[1 :]").unwrap() {
            Expr::Slice(s) => {
                assert!(s.low.is_some());
                assert!(s.high.is_none());
            }
            other => panic!("unexpected node: {:?}", other),
        }
        match parse("x[: 2]").unwrap() {
            Expr::Slice(s) => {
                assert!(s.low.is_none());
                assert!(s.high.is_some());
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_subscript_no_space_rule() {
        // whitespace before [ makes it not a subscript
        assert!(matches!(parse("x[1]").unwrap(), Expr::Subscript(_)));
        assert!(matches!(parse("x [1]").unwrap(), Expr::Ident(_)));
    }

    #[test]
    fn test_lambda_and_dict() {
        assert!(matches!(parse("{a, b -> a + b}").unwrap(), Expr::Lambda(_)));
        assert!(matches!(parse("{-> 1}").unwrap(), Expr::Lambda(_)));
        match parse("{'a': 1, 'b': 2}").unwrap() {
            Expr::Dict(d) => assert_eq!(d.entries.len(), 2),
            other => panic!("unexpected node: {:?}", other),
        }
        assert!(matches!(parse("{}").unwrap(), Expr::Dict(_)));
    }

    #[test]
    fn test_curly_name() {
        match parse("foo_{bar}_baz").unwrap() {
            Expr::CurlyName(c) => assert_eq!(c.parts.len(), 3),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_string_literals_keep_text() {
        match parse("'it''s'").unwrap() {
            Expr::Lit(lit) => {
                assert_eq!(lit.kind, LitKind::String);
                assert_eq!(lit.value, "'it''s'");
            }
            other => panic!("unexpected node: {:?}", other),
        }
        match parse("0x10").unwrap() {
            Expr::Lit(lit) => assert_eq!(lit.value, "0x10"),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_call_args_limit() {
        let args = (0..21).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let err = parse(&format!("f({})", args)).unwrap_err();
        assert!(err.message.starts_with("E740:"));
    }

    #[test]
    fn test_missing_closers_point_at_opener() {
        let err = parse("(1").unwrap_err();
        assert_eq!(err.message, "missing closing )");
        assert_eq!(err.pos.column, 1);
        let err = parse("x[1").unwrap_err();
        assert_eq!(err.message, "missing closing ]");
        assert_eq!(err.pos.column, 2);
        let err = parse("[1, 2").unwrap_err();
        assert_eq!(err.message, "missing closing ]");
        assert_eq!(err.pos.column, 1);
    }

    #[test]
    fn test_dot_member() {
        assert!(matches!(parse("d.key").unwrap(), Expr::Dot(_)));
        // concat with spaces stays binary
        match parse("a . b").unwrap() {
            Expr::Binary(b) => assert_eq!(b.op, BinaryOp::Concat),
            other => panic!("unexpected node: {:?}", other),
        }
    }
}
