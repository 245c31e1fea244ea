//! viml-parser - A parser for legacy Vim script
//!
//! This library parses Vim script (ex-commands plus the C-like expression
//! sub-language) into a typed AST, and can re-serialize the tree into the
//! canonical parenthesized form used for verification and tooling.

pub mod ast;
pub mod parser;
pub mod compiler;
pub mod langserver;

pub use ast::types::*;
pub use ast::walk::{walk, NodeRef};
pub use compiler::{compile, compile_to_string, CompileError};
pub use parser::{parse, parse_expr, ErrorKind, ParseError, ParseOption, Parser};
