//! Parser Types and Constants
//!
//! Shared types, character classes, and limits used across parser modules.

use std::fmt;
use thiserror::Error;

use crate::ast::types::Position;

/// Maximum number of arguments accepted in a function call expression.
pub const MAX_FUNC_ARGS: usize = 20;

/// Maximum statement/expression nesting depth. Parsing is recursive, so call
/// stack depth tracks nesting depth; past this limit the parse fails instead
/// of overflowing the host stack.
pub const MAX_NEST_DEPTH: usize = 200;

/// What went wrong, at the granularity callers dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Command prefix matches no table entry and is not a valid
    /// user-defined command shape.
    UnknownCommand,
    /// Prefix satisfies two distinct table entries with no exact match.
    AmbiguousCommand,
    /// Terminator without opener, or opener without terminator.
    UnbalancedBlock,
    /// Invalid range, flag combination, or trailing text on a command.
    InvalidArgument,
    /// Unexpected token, unbalanced bracket, invalid assignment target.
    InvalidExpression,
    /// A defect below the entry points, never a problem with the input.
    Internal,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub pos: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.pos.line, self.pos.column, self.message
        )
    }
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, pos: Position) -> Self {
        Self { kind, message: message.into(), pos }
    }
}

// =============================================================================
// CHARACTER CLASSES
// =============================================================================

pub fn iswhite(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn isalpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn isalnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

pub fn isdigit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn isxdigit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Characters of a word: `[0-9A-Za-z_]`.
pub fn iswordc(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// First character of a word: `[A-Za-z_]`.
pub fn iswordc1(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Characters of a variable name, including scope/autoload separators:
/// `[0-9A-Za-z_:#]`.
pub fn isnamec(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '#'
}

/// First character of a variable name: `[A-Za-z_]`.
pub fn isnamec1(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Valid function/lambda argument name: `[A-Za-z_][0-9A-Za-z_]*`.
pub fn isargname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if iswordc1(c) => {}
        _ => return false,
    }
    chars.all(iswordc)
}

/// Valid variable name, with an optional scope prefix (`g:`, `s:`, `l:`,
/// `a:`, `b:`, `w:`, `t:`, `v:`) and `#` allowed for autoload names.
pub fn isvarname(s: &str) -> bool {
    let rest = match s.as_bytes() {
        [scope, b':', ..] if b"vgslabwt".contains(scope) => {
            if s.len() == 2 {
                return true;
            }
            &s[2..]
        }
        _ => s,
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if isnamec1(c) => {}
        _ => return false,
    }
    chars.all(|c| iswordc(c) || c == '#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = ParseError::new(
            ErrorKind::InvalidExpression,
            "unexpected token: /",
            Position::new(1, 4, 3),
        );
        assert_eq!(err.to_string(), "Parse error at 1:4: unexpected token: /");
    }

    #[test]
    fn test_isvarname() {
        assert!(isvarname("foo"));
        assert!(isvarname("g:foo"));
        assert!(isvarname("s:"));
        assert!(isvarname("auto#load#name"));
        assert!(isvarname("_private"));
        assert!(!isvarname("1foo"));
        assert!(!isvarname(""));
        assert!(!isvarname("x:foo"));
    }

    #[test]
    fn test_isargname() {
        assert!(isargname("abc"));
        assert!(isargname("_x1"));
        assert!(!isargname("1x"));
        assert!(!isargname("a:b"));
    }
}
