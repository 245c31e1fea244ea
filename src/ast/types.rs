//! Abstract Syntax Tree (AST) Types for Vim script
//!
//! This module defines the complete AST structure for Vim script: one node
//! kind per ex-command statement form, plus the expression sub-language.
//! Nodes are pure data; they are built once by the parser and never mutated
//! afterwards.
//!
//! Block statements own their terminator: an `If` embeds its `EndIf`, a
//! `While` its `EndWhile`, and so on. A block node without its terminator is
//! not representable, so nesting balance holds by construction.

use serde::Serialize;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Position of a node in the source.
///
/// `offset` counts bytes from the start of the input, including line
/// terminators. `column` is byte-based, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

// =============================================================================
// COMMAND METADATA
// =============================================================================

/// The command-table entry a statement resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cmd {
    pub name: String,
    pub minlen: usize,
    pub flags: u32,
}

/// A command modifier such as `silent!` or `3verbose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub name: String,
    pub count: Option<usize>,
    pub bang: bool,
}

impl Modifier {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), count: None, bang: false }
    }
}

/// `++bin` / `++nobin` state of a file command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ForceBin {
    #[default]
    Unset,
    Bin,
    NoBin,
}

/// Argument record shared by every ex-command-derived statement.
///
/// `cmd` is present for every statement parsed from a command line and is
/// the sole source of truth for the command's name and flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExArg {
    pub forceit: bool,
    pub addr_count: usize,
    pub line1: usize,
    pub line2: usize,
    pub flags: u32,
    pub do_ecmd_cmd: String,
    pub do_ecmd_lnum: usize,
    pub append: bool,
    pub usefilter: bool,
    pub amount: usize,
    pub regname: Option<char>,
    pub force_bin: ForceBin,
    pub read_edit: bool,
    pub force_ff: String,
    pub force_enc: String,
    pub bad_char: String,
    pub linepos: Option<Position>,
    pub cmdpos: Option<Position>,
    pub argpos: Option<Position>,
    pub cmd: Option<Cmd>,
    pub modifiers: Vec<Modifier>,
    pub range: Vec<String>,
}

/// Modifiers on a `:function` definition. All false when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FuncAttr {
    pub range: bool,
    pub abort: bool,
    pub dict: bool,
    pub closure: bool,
}

// =============================================================================
// FILE & STATEMENTS
// =============================================================================

/// Root node: a complete script.
///
/// `start` is the sentinel position (line 1, column 1, offset 0); the file
/// node has no token of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct File {
    pub start: Position,
    pub body: Vec<Stmt>,
}

/// Union of all statement kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Comment(Comment),
    Excmd(Excmd),
    Function(Box<Function>),
    DelFunction(DelFunction),
    Return(Return),
    ExCall(ExCall),
    Let(Box<Let>),
    UnLet(UnLet),
    LockVar(LockVar),
    UnLockVar(UnLockVar),
    If(Box<If>),
    While(Box<While>),
    For(Box<For>),
    Continue(Continue),
    Break(Break),
    Try(Box<Try>),
    Throw(Throw),
    Echo(Echo),
    Echohl(Echohl),
    Execute(Execute),
}

/// A `"` comment line (or trailing comment).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub pos: Position,
    pub text: String,
}

/// Any ex-command without a dedicated node: the raw command text is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excmd {
    pub pos: Position,
    pub ea: ExArg,
    pub command: String,
}

/// `:function Name(params) ... endfunction`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub pos: Position,
    pub ea: ExArg,
    pub name: Expr,
    pub params: Vec<Ident>,
    pub attr: FuncAttr,
    pub body: Vec<Stmt>,
    pub endfunction: EndFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndFunction {
    pub pos: Position,
    pub ea: ExArg,
}

/// `:delfunction Name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelFunction {
    pub pos: Position,
    pub ea: ExArg,
    pub name: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    pub pos: Position,
    pub ea: ExArg,
    pub result: Option<Expr>,
}

/// `:call f(...)` as a statement. The argument is always a call expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExCall {
    pub pos: Position,
    pub ea: ExArg,
    pub call: Call,
}

/// Assignment target: a single lvalue, or a destructuring list with an
/// optional "rest" target for the remaining elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LetLhs {
    Single(Expr),
    List { items: Vec<Expr>, rest: Option<Expr> },
}

/// `:let lhs op rhs` where op is `=` or a compound operator (`+=`, `.=`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Let {
    pub pos: Position,
    pub ea: ExArg,
    pub op: String,
    pub lhs: LetLhs,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnLet {
    pub pos: Position,
    pub ea: ExArg,
    pub list: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockVar {
    pub pos: Position,
    pub ea: ExArg,
    pub depth: Option<usize>,
    pub list: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnLockVar {
    pub pos: Position,
    pub ea: ExArg,
    pub depth: Option<usize>,
    pub list: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    pub pos: Position,
    pub ea: ExArg,
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub elseifs: Vec<ElseIf>,
    pub else_clause: Option<Else>,
    pub endif: EndIf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub pos: Position,
    pub ea: ExArg,
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Else {
    pub pos: Position,
    pub ea: ExArg,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndIf {
    pub pos: Position,
    pub ea: ExArg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct While {
    pub pos: Position,
    pub ea: ExArg,
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub endwhile: EndWhile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndWhile {
    pub pos: Position,
    pub ea: ExArg,
}

/// `:for lhs in expr ... endfor`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct For {
    pub pos: Position,
    pub ea: ExArg,
    pub lhs: LetLhs,
    pub right: Expr,
    pub body: Vec<Stmt>,
    pub endfor: EndFor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndFor {
    pub pos: Position,
    pub ea: ExArg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Continue {
    pub pos: Position,
    pub ea: ExArg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Break {
    pub pos: Position,
    pub ea: ExArg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Try {
    pub pos: Position,
    pub ea: ExArg,
    pub body: Vec<Stmt>,
    pub catches: Vec<Catch>,
    pub finally: Option<Finally>,
    pub endtry: EndTry,
}

/// A `:catch` clause. The pattern is kept verbatim; matching it against a
/// thrown value is an evaluation concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catch {
    pub pos: Position,
    pub ea: ExArg,
    pub pattern: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finally {
    pub pos: Position,
    pub ea: ExArg,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndTry {
    pub pos: Position,
    pub ea: ExArg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Throw {
    pub pos: Position,
    pub ea: ExArg,
    pub expr: Expr,
}

/// Which of the echo-family commands a statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EchoKind {
    Echo,
    Echon,
    Echomsg,
    Echoerr,
}

impl EchoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Echon => "echon",
            Self::Echomsg => "echomsg",
            Self::Echoerr => "echoerr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Echo {
    pub pos: Position,
    pub ea: ExArg,
    pub cmd: EchoKind,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Echohl {
    pub pos: Position,
    pub ea: ExArg,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execute {
    pub pos: Position,
    pub ea: ExArg,
    pub exprs: Vec<Expr>,
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// Union of all expression kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ternary(Ternary),
    Binary(Binary),
    Unary(Unary),
    Subscript(Subscript),
    Slice(Slice),
    Call(Call),
    Dot(Dot),
    Lit(Lit),
    Ident(Ident),
    CurlyName(CurlyName),
    List(List),
    Dict(Dict),
    Lambda(Lambda),
}

impl Expr {
    /// Position of the expression's defining token.
    pub fn pos(&self) -> Position {
        match self {
            Expr::Ternary(x) => x.pos,
            Expr::Binary(x) => x.pos,
            Expr::Unary(x) => x.pos,
            Expr::Subscript(x) => x.pos,
            Expr::Slice(x) => x.pos,
            Expr::Call(x) => x.pos,
            Expr::Dot(x) => x.pos,
            Expr::Lit(x) => x.pos,
            Expr::Ident(x) => x.pos,
            Expr::CurlyName(x) => x.pos,
            Expr::List(x) => x.pos,
            Expr::Dict(x) => x.pos,
            Expr::Lambda(x) => x.pos,
        }
    }
}

/// `cond ? left : right`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ternary {
    pub pos: Position,
    pub cond: Box<Expr>,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Binary operators, including the `#` (case-sensitive) and `?`
/// (case-insensitive) comparison variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    EqualCi,
    EqualCs,
    NotEqual,
    NotEqualCi,
    NotEqualCs,
    Greater,
    GreaterCi,
    GreaterCs,
    GreaterEqual,
    GreaterEqualCi,
    GreaterEqualCs,
    Smaller,
    SmallerCi,
    SmallerCs,
    SmallerEqual,
    SmallerEqualCi,
    SmallerEqualCs,
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
    Add,
    Subtract,
    Concat,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    /// The operator as it appears in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Equal => "==",
            Self::EqualCi => "==?",
            Self::EqualCs => "==#",
            Self::NotEqual => "!=",
            Self::NotEqualCi => "!=?",
            Self::NotEqualCs => "!=#",
            Self::Greater => ">",
            Self::GreaterCi => ">?",
            Self::GreaterCs => ">#",
            Self::GreaterEqual => ">=",
            Self::GreaterEqualCi => ">=?",
            Self::GreaterEqualCs => ">=#",
            Self::Smaller => "<",
            Self::SmallerCi => "<?",
            Self::SmallerCs => "<#",
            Self::SmallerEqual => "<=",
            Self::SmallerEqualCi => "<=?",
            Self::SmallerEqualCs => "<=#",
            Self::Match => "=~",
            Self::MatchCi => "=~?",
            Self::MatchCs => "=~#",
            Self::NoMatch => "!~",
            Self::NoMatchCi => "!~?",
            Self::NoMatchCs => "!~#",
            Self::Is => "is",
            Self::IsCi => "is?",
            Self::IsCs => "is#",
            Self::IsNot => "isnot",
            Self::IsNotCi => "isnot?",
            Self::IsNotCs => "isnot#",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Concat => ".",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binary {
    pub pos: Position,
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Minus => "-",
            Self::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unary {
    pub pos: Position,
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

/// `left[right]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscript {
    pub pos: Position,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// `left[low : high]`. An omitted bound stays absent rather than defaulting,
/// preserving from-the-start / to-the-end semantics for the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub pos: Position,
    pub left: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub pos: Position,
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
}

/// `left.name` member access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dot {
    pub pos: Position,
    pub left: Box<Expr>,
    pub right: Ident,
}

/// Literal kinds. The value is the exact source text: numbers keep their
/// radix and leading zeros, strings keep their quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LitKind {
    Number,
    String,
    Option,
    Env,
    Reg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lit {
    pub pos: Position,
    pub kind: LitKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub pos: Position,
    pub name: String,
}

/// `foo_{bar}_baz`: a name computed at evaluation time from literal
/// fragments and brace-delimited expressions, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurlyName {
    pub pos: Position,
    pub parts: Vec<CurlyNamePart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CurlyNamePart {
    Lit(CurlyNameLit),
    Expr(CurlyNameExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurlyNameLit {
    pub pos: Position,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurlyNameExpr {
    pub pos: Position,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub pos: Position,
    pub items: Vec<Expr>,
}

/// Dict literal. Entry order is preserved; key uniqueness is not a parse
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dict {
    pub pos: Position,
    pub entries: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: Expr,
    pub value: Expr,
}

/// `{args -> expr}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lambda {
    pub pos: Position,
    pub params: Vec<Ident>,
    pub expr: Box<Expr>,
}
