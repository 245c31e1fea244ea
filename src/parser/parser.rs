//! Recursive Descent Parser for Vim script
//!
//! This parser consumes ex-command lines and produces an AST. Each line is
//! parsed as: optional `:` and whitespace, command modifiers, a line range,
//! the command name (resolved through the command table), and the
//! command-specific tail. A trailing `|` starts another command on the same
//! physical line unless the command consumes the rest of the line.
//!
//! Block commands (`if`, `while`, `for`, `try`, `function`) parse their
//! bodies recursively: the block parser loops over statements until its own
//! terminator arrives, so a finished block node always owns its terminator
//! and call depth tracks nesting depth.

use std::mem;

use crate::ast::types::*;
use crate::parser::command_table::{self, flags, Lookup, ParserKind};
use crate::parser::expr_parser::ExprParser;
use crate::parser::reader::{SourceReader, EOF, EOL};
use crate::parser::tokenizer::{ExprTokenizer, Token, TokenType};
use crate::parser::types::{
    isargname, isdigit, isvarname, iswhite, iswordc, ErrorKind, ParseError, MAX_NEST_DEPTH,
};

/// Options for [`parse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOption {
    /// Use the neovim command table variant.
    pub neovim: bool,
}

/// Parse a full script into a [`File`] node.
///
/// Any defect below this entry point (a panic in the parser internals) is
/// converted into a `ParseError` of kind `Internal` instead of unwinding
/// into the caller.
pub fn parse(input: &str, opt: &ParseOption) -> Result<File, ParseError> {
    let neovim = opt.neovim;
    guard(move || Parser::new(input, neovim).parse())
}

/// Parse a single standalone expression.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    guard(move || {
        let mut reader = SourceReader::from_text(input);
        ExprParser::new(&mut reader).parse()
    })
}

fn guard<T>(f: impl FnOnce() -> Result<T, ParseError>) -> Result<T, ParseError> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ParseError::new(
                ErrorKind::Internal,
                format!("internal error: {}", msg),
                Position::new(1, 1, 0),
            ))
        }
    }
}

// =============================================================================
// PARSER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Function,
    If,
    While,
    For,
    Try,
}

/// A block-closing or clause keyword, bubbled up to the innermost open
/// block. Received anywhere else it is an unbalanced-block error.
enum EndMarker {
    ElseIf { pos: Position, ea: ExArg, cond: Expr },
    Else { pos: Position, ea: ExArg },
    EndIf(EndIf),
    EndWhile(EndWhile),
    EndFor(EndFor),
    EndFunction(EndFunction),
    Catch { pos: Position, ea: ExArg, pattern: Option<String> },
    Finally { pos: Position, ea: ExArg },
    EndTry(EndTry),
}

impl EndMarker {
    fn pos(&self) -> Position {
        match self {
            EndMarker::ElseIf { pos, .. }
            | EndMarker::Else { pos, .. }
            | EndMarker::Catch { pos, .. }
            | EndMarker::Finally { pos, .. } => *pos,
            EndMarker::EndIf(n) => n.pos,
            EndMarker::EndWhile(n) => n.pos,
            EndMarker::EndFor(n) => n.pos,
            EndMarker::EndFunction(n) => n.pos,
            EndMarker::EndTry(n) => n.pos,
        }
    }

    /// The error for this terminator appearing with no matching opener.
    fn without_error(&self) -> ParseError {
        let msg = match self {
            EndMarker::ElseIf { .. } => "E582: :elseif without :if",
            EndMarker::Else { .. } => "E581: :else without :if",
            EndMarker::EndIf(_) => "E580: :endif without :if",
            EndMarker::EndWhile(_) => "E588: :endwhile without :while",
            EndMarker::EndFor(_) => "E588: :endfor without :for",
            EndMarker::EndFunction(_) => "E193: :endfunction not inside a function",
            EndMarker::Catch { .. } => "E603: :catch without :try",
            EndMarker::Finally { .. } => "E606: :finally without :try",
            EndMarker::EndTry(_) => "E602: :endtry without :try",
        };
        ParseError::new(ErrorKind::UnbalancedBlock, msg, self.pos())
    }
}

/// `endfunction` while a non-function block is open reports the open block's
/// missing terminator; any other mismatched marker reports itself.
fn mismatch_error(current: BlockKind, marker: EndMarker) -> ParseError {
    if let EndMarker::EndFunction(endf) = &marker {
        let msg = match current {
            BlockKind::If => "E171: Missing :endif",
            BlockKind::While => "E170: Missing :endwhile",
            BlockKind::For => "E170: Missing :endfor",
            BlockKind::Try => "E600: Missing :endtry",
            BlockKind::Function => return marker.without_error(),
        };
        return ParseError::new(ErrorKind::UnbalancedBlock, msg, endf.pos);
    }
    marker.without_error()
}

enum ParsedCmd {
    Stmts(Vec<Stmt>),
    End { marker: EndMarker, trailing: Option<Stmt> },
}

enum CmdResult {
    /// Nothing was produced (blank command position).
    None,
    /// A statement whose line trail has not been consumed yet.
    Pending(Stmt),
    /// Block statement(s); the terminator's trail is already consumed.
    Done(Vec<Stmt>),
    /// A terminator/clause keyword; trail not consumed yet.
    End(EndMarker),
}

struct ResolvedCmd {
    name: String,
    minlen: usize,
    flags: u32,
    parser: ParserKind,
}

impl ResolvedCmd {
    fn to_cmd(&self) -> Cmd {
        Cmd { name: self.name.clone(), minlen: self.minlen, flags: self.flags }
    }
}

fn unexpected_token(token: &Token) -> ParseError {
    ParseError::new(
        ErrorKind::InvalidExpression,
        format!("unexpected token: {}", token.value),
        token.pos,
    )
}

pub struct Parser {
    reader: SourceReader,
    neovim: bool,
    context: Vec<BlockKind>,
    ea: ExArg,
    linepos_i: usize,
    argpos_i: usize,
}

impl Parser {
    pub fn new(input: &str, neovim: bool) -> Self {
        Self {
            reader: SourceReader::from_text(input),
            neovim,
            context: Vec::new(),
            ea: ExArg::default(),
            linepos_i: 0,
            argpos_i: 0,
        }
    }

    pub fn parse(&mut self) -> Result<File, ParseError> {
        let mut body = Vec::new();
        while !self.reader.is_eof() {
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => body.extend(stmts),
                ParsedCmd::End { marker, .. } => return Err(marker.without_error()),
            }
        }
        Ok(File { start: Position::new(1, 1, 0), body })
    }

    // -------------------------------------------------------------------------
    // Per-line machinery
    // -------------------------------------------------------------------------

    fn parse_one_cmd(&mut self) -> Result<ParsedCmd, ParseError> {
        self.ea = ExArg::default();
        if self.reader.peekn(2) == "#!" {
            let stmt = self.parse_hashbang();
            self.reader.get();
            return Ok(ParsedCmd::Stmts(vec![stmt]));
        }
        self.reader.skip_white_and_colon();
        if self.reader.peek() == EOL {
            self.reader.get();
            return Ok(ParsedCmd::Stmts(Vec::new()));
        }
        if self.reader.is_eof() {
            return Ok(ParsedCmd::Stmts(Vec::new()));
        }
        if self.reader.peek() == '"' {
            let stmt = self.parse_comment()?;
            self.reader.get();
            return Ok(ParsedCmd::Stmts(vec![stmt]));
        }
        self.ea.linepos = Some(self.reader.getpos());
        self.linepos_i = self.reader.tell();
        self.parse_command_modifiers()?;
        self.ea.range = self.parse_range()?;
        match self.parse_command()? {
            CmdResult::None => {
                let trailing = self.parse_trail()?;
                Ok(ParsedCmd::Stmts(trailing.into_iter().collect()))
            }
            CmdResult::Pending(stmt) => {
                let mut stmts = vec![stmt];
                if let Some(comment) = self.parse_trail()? {
                    stmts.push(comment);
                }
                Ok(ParsedCmd::Stmts(stmts))
            }
            CmdResult::Done(stmts) => Ok(ParsedCmd::Stmts(stmts)),
            CmdResult::End(marker) => {
                let trailing = self.parse_trail()?;
                Ok(ParsedCmd::End { marker, trailing })
            }
        }
    }

    fn parse_hashbang(&mut self) -> Stmt {
        let pos = self.reader.getpos();
        let text = self.reader.get_line();
        Stmt::Excmd(Excmd { pos, ea: ExArg::default(), command: text })
    }

    fn parse_comment(&mut self) -> Result<Stmt, ParseError> {
        let npos = self.reader.getpos();
        let c = self.reader.get();
        if c != '"' {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                format!("unexpected character: {}", c),
                npos,
            ));
        }
        Ok(Stmt::Comment(Comment { pos: npos, text: self.reader.get_line() }))
    }

    fn parse_trail(&mut self) -> Result<Option<Stmt>, ParseError> {
        self.reader.skip_white();
        let c = self.reader.peek();
        match c {
            EOF => Ok(None),
            EOL => {
                self.reader.get();
                Ok(None)
            }
            '|' => {
                self.reader.get();
                Ok(None)
            }
            '"' => {
                let comment = self.parse_comment()?;
                self.reader.get();
                Ok(Some(comment))
            }
            _ => Err(ParseError::new(
                ErrorKind::InvalidArgument,
                format!("E488: Trailing characters: {}", c),
                self.reader.getpos(),
            )),
        }
    }

    fn ends_excmds(&self, c: char) -> bool {
        c == EOF || c == EOL || c == '|' || c == '"'
    }

    fn cmdpos(&self) -> Position {
        self.ea.cmdpos.unwrap_or_default()
    }

    fn take_ea(&mut self) -> ExArg {
        mem::take(&mut self.ea)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ExprParser::new(&mut self.reader).parse()
    }

    fn next_tok(&mut self) -> Result<Token, ParseError> {
        ExprTokenizer::new(&mut self.reader).get()
    }

    fn peek_tok(&mut self) -> Result<Token, ParseError> {
        ExprTokenizer::new(&mut self.reader).peek()
    }

    fn push_context(&mut self, kind: BlockKind) -> Result<(), ParseError> {
        if self.context.len() >= MAX_NEST_DEPTH {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "blocks nested too deep",
                self.cmdpos(),
            ));
        }
        self.context.push(kind);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Modifiers and range
    // -------------------------------------------------------------------------

    fn parse_command_modifiers(&mut self) -> Result<(), ParseError> {
        let mut modifiers: Vec<Modifier> = Vec::new();
        loop {
            let pos = self.reader.tell();
            let mut d = String::new();
            if isdigit(self.reader.peek()) {
                d = self.reader.read_digit();
                self.reader.skip_white();
            }
            let k = self.reader.read_alpha();
            let c = self.reader.peek();
            self.reader.skip_white();
            let m = |full: &str, min: usize| -> bool {
                !k.is_empty() && full.starts_with(k.as_str()) && k.len() >= min
            };
            if m("aboveleft", 3) {
                modifiers.push(Modifier::new("aboveleft"));
            } else if m("belowright", 3) {
                modifiers.push(Modifier::new("belowright"));
            } else if m("browse", 3) {
                modifiers.push(Modifier::new("browse"));
            } else if m("botright", 2) {
                modifiers.push(Modifier::new("botright"));
            } else if m("confirm", 4) {
                modifiers.push(Modifier::new("confirm"));
            } else if m("keepmarks", 3) {
                modifiers.push(Modifier::new("keepmarks"));
            } else if m("keepalt", 5) {
                modifiers.push(Modifier::new("keepalt"));
            } else if m("keepjumps", 5) {
                modifiers.push(Modifier::new("keepjumps"));
            } else if m("keeppatterns", 5) {
                modifiers.push(Modifier::new("keeppatterns"));
            } else if m("hide", 3) {
                // bare :hide is the command, not a modifier
                if self.ends_excmds(c) {
                    self.reader.seek_set(pos);
                    break;
                }
                modifiers.push(Modifier::new("hide"));
            } else if m("lockmarks", 3) {
                modifiers.push(Modifier::new("lockmarks"));
            } else if m("leftabove", 5) {
                modifiers.push(Modifier::new("leftabove"));
            } else if m("noautocmd", 3) {
                modifiers.push(Modifier::new("noautocmd"));
            } else if m("noswapfile", 3) {
                modifiers.push(Modifier::new("noswapfile"));
            } else if m("rightbelow", 6) {
                modifiers.push(Modifier::new("rightbelow"));
            } else if m("sandbox", 3) {
                modifiers.push(Modifier::new("sandbox"));
            } else if m("silent", 3) {
                let mut modifier = Modifier::new("silent");
                if c == '!' {
                    self.reader.get();
                    modifier.bang = true;
                }
                modifiers.push(modifier);
            } else if k == "tab" {
                let mut modifier = Modifier::new("tab");
                if !d.is_empty() {
                    modifier.count = d.parse::<usize>().ok();
                }
                modifiers.push(modifier);
            } else if m("topleft", 2) {
                modifiers.push(Modifier::new("topleft"));
            } else if m("unsilent", 3) {
                modifiers.push(Modifier::new("unsilent"));
            } else if m("vertical", 4) {
                modifiers.push(Modifier::new("vertical"));
            } else if m("verbose", 4) {
                let mut modifier = Modifier::new("verbose");
                modifier.count = if d.is_empty() { Some(1) } else { d.parse::<usize>().ok() };
                modifiers.push(modifier);
            } else {
                self.reader.seek_set(pos);
                break;
            }
        }
        self.ea.modifiers = modifiers;
        Ok(())
    }

    fn parse_range(&mut self) -> Result<Vec<String>, ParseError> {
        let mut tokens: Vec<String> = Vec::new();
        loop {
            loop {
                self.reader.skip_white();
                let c = self.reader.peek();
                if c == EOL || c == EOF {
                    break;
                }
                if c == '.' || c == '$' {
                    tokens.push(self.reader.getn(1));
                } else if c == '\'' {
                    self.reader.getn(1);
                    let m = self.reader.getn(1);
                    if m.is_empty() {
                        break;
                    }
                    tokens.push(format!("'{}", m));
                } else if c == '/' || c == '?' {
                    self.reader.getn(1);
                    let (pattern, _) = self.parse_pattern(c)?;
                    tokens.push(pattern);
                } else if c == '\\' {
                    let m = self.reader.p(1);
                    if m == '&' || m == '?' || m == '/' {
                        self.reader.seek_cur(2);
                        tokens.push(format!("\\{}", m));
                    } else {
                        return Err(ParseError::new(
                            ErrorKind::InvalidArgument,
                            "E10: \\\\ should be followed by /, ? or &",
                            self.reader.getpos(),
                        ));
                    }
                } else if isdigit(c) {
                    tokens.push(self.reader.read_digit());
                }
                loop {
                    self.reader.skip_white();
                    if self.reader.peek() == EOL || self.reader.peek() == EOF {
                        break;
                    }
                    let n = self.reader.read_integer();
                    if n.is_empty() {
                        break;
                    }
                    tokens.push(n);
                }
                if self.reader.peek() != '/' && self.reader.peek() != '?' {
                    break;
                }
            }
            if self.reader.peek() == '%' || self.reader.peek() == '*' {
                tokens.push(self.reader.getn(1));
            }
            if self.reader.peek() == ';' || self.reader.peek() == ',' {
                tokens.push(self.reader.getn(1));
                continue;
            }
            break;
        }
        Ok(tokens)
    }

    /// Read a pattern up to an unescaped `delimiter` (or end of line).
    /// Returns the pattern text and the closing delimiter if it was found.
    fn parse_pattern(&mut self, delimiter: char) -> Result<(String, Option<char>), ParseError> {
        let mut pattern = String::new();
        let mut endc = None;
        let mut inbracket = 0i32;
        loop {
            let c = self.reader.peek();
            if c == EOL || c == EOF {
                break;
            }
            self.reader.get();
            if c == delimiter && inbracket == 0 {
                endc = Some(c);
                break;
            }
            pattern.push(c);
            if c == '\\' {
                let c2 = self.reader.peek();
                if c2 == EOL || c2 == EOF {
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        "E682: Invalid search pattern or delimiter",
                        self.reader.getpos(),
                    ));
                }
                self.reader.get();
                pattern.push(c2);
            } else if c == '[' {
                inbracket += 1;
            } else if c == ']' {
                inbracket -= 1;
            }
        }
        Ok((pattern, endc))
    }

    // -------------------------------------------------------------------------
    // Command resolution and dispatch
    // -------------------------------------------------------------------------

    fn parse_command(&mut self) -> Result<CmdResult, ParseError> {
        self.reader.skip_white_and_colon();
        let cmdpos = self.reader.getpos();
        let cmdpos_i = self.reader.tell();
        self.ea.cmdpos = Some(cmdpos);
        let c = self.reader.peek();
        if c == EOL || c == EOF || c == '"' {
            if !self.ea.modifiers.is_empty() || !self.ea.range.is_empty() {
                return Ok(CmdResult::Pending(self.parse_cmd_modifier_range()));
            }
            return Ok(CmdResult::None);
        }
        let cmd = match self.find_command()? {
            Some(cmd) => cmd,
            None => {
                self.reader.seek_set(cmdpos_i);
                return Err(ParseError::new(
                    ErrorKind::UnknownCommand,
                    format!("E492: Not an editor command: {}", self.reader.peek_line()),
                    cmdpos,
                ));
            }
        };
        self.ea.cmd = Some(cmd.to_cmd());
        if self.reader.peek() == '!'
            && cmd.name != "substitute"
            && cmd.name != "smagic"
            && cmd.name != "snomagic"
        {
            self.reader.get();
            self.ea.forceit = true;
        }
        if cmd.flags & flags::BANG == 0 && cmd.flags & flags::USERCMD == 0 && self.ea.forceit {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E477: No ! allowed",
                cmdpos,
            ));
        }
        if cmd.name != "!" {
            self.reader.skip_white();
        }
        self.ea.argpos = Some(self.reader.getpos());
        self.argpos_i = self.reader.tell();
        if cmd.flags & flags::ARGOPT != 0 {
            self.parse_argopt()?;
        }
        if cmd.name == "write" || cmd.name == "update" {
            if self.reader.peek() == '>' {
                if self.reader.p(1) != '>' {
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        "E494: Use w or w>>",
                        cmdpos,
                    ));
                }
                self.reader.seek_cur(2);
                self.reader.skip_white();
                self.ea.append = true;
            } else if self.reader.peek() == '!' && cmd.name == "write" {
                self.reader.get();
                self.ea.usefilter = true;
            }
        }
        if cmd.name == "read" {
            if self.ea.forceit {
                self.ea.usefilter = true;
                self.ea.forceit = false;
            } else if self.reader.peek() == '!' {
                self.reader.get();
                self.ea.usefilter = true;
            }
        }
        if cmd.name == "<" || cmd.name == ">" {
            self.ea.amount = 1;
            let marker = cmd.name.chars().next().unwrap_or(' ');
            while self.reader.peek() == marker {
                self.reader.get();
                self.ea.amount += 1;
            }
            self.reader.skip_white();
        }
        if cmd.flags & flags::EDITCMD != 0 && !self.ea.usefilter {
            self.parse_argcmd();
        }
        self.dispatch(&cmd)
    }

    /// Resolve the leading command word, handling the historical
    /// irregularities: `k{mark}`, `s` with substitution flags, one-character
    /// punctuation commands, `py...` names, and `d{flags}` delete forms. A
    /// word matching nothing resolves as a user-defined command only when it
    /// starts with an uppercase letter.
    fn find_command(&mut self) -> Result<Option<ResolvedCmd>, ParseError> {
        let c = self.reader.peek();
        let name: String;
        if c == 'k' && self.reader.p(1) != 'e' {
            self.reader.get();
            name = "k".to_string();
        } else if c == 's' && is_substitute_with_flags(&self.reader.peekn(5)) {
            self.reader.get();
            name = "substitute".to_string();
        } else if "@*!=><&~#".contains(c) {
            self.reader.get();
            name = c.to_string();
        } else if self.reader.peekn(2) == "py" {
            name = self.reader.read_alnum();
        } else {
            let pos = self.reader.tell();
            let word = self.reader.read_alpha();
            if word != "del" && is_delete_with_flag(&word) {
                self.reader.seek_set(pos);
                name = self.reader.getn(word.len() - 1);
            } else {
                name = word;
            }
        }
        if name.is_empty() {
            return Ok(None);
        }
        let uppercase = name.starts_with(|ch: char| ch.is_ascii_uppercase());
        match command_table::lookup(&name, self.neovim) {
            Lookup::Found(entry) if !(entry.name == "Print" && uppercase) => Ok(Some(ResolvedCmd {
                name: entry.name.to_string(),
                minlen: entry.minlen,
                flags: entry.flags,
                parser: entry.parser,
            })),
            Lookup::Ambiguous(a, b) => Err(ParseError::new(
                ErrorKind::AmbiguousCommand,
                format!("E464: Ambiguous use of user-defined command: {} ({}, {})", name, a, b),
                self.cmdpos(),
            )),
            _ if uppercase => {
                let mut name = name;
                name.push_str(&self.reader.read_alnum());
                let minlen = name.len();
                Ok(Some(ResolvedCmd {
                    name,
                    minlen,
                    flags: flags::USERCMD,
                    parser: ParserKind::UserCmd,
                }))
            }
            _ => Ok(None),
        }
    }

    fn dispatch(&mut self, cmd: &ResolvedCmd) -> Result<CmdResult, ParseError> {
        match cmd.parser {
            ParserKind::Append => self.parse_cmd_append(),
            ParserKind::Break => self.parse_cmd_break(),
            ParserKind::Call => self.parse_cmd_call(),
            ParserKind::Catch => self.parse_cmd_catch(),
            ParserKind::Common | ParserKind::UserCmd => self.parse_cmd_common(),
            ParserKind::Continue => self.parse_cmd_continue(),
            ParserKind::DelFunction => self.parse_cmd_delfunction(),
            ParserKind::Echo => self.parse_cmd_echo(EchoKind::Echo),
            ParserKind::EchoErr => self.parse_cmd_echo(EchoKind::Echoerr),
            ParserKind::EchoHl => self.parse_cmd_echohl(),
            ParserKind::EchoMsg => self.parse_cmd_echo(EchoKind::Echomsg),
            ParserKind::EchoN => self.parse_cmd_echo(EchoKind::Echon),
            ParserKind::Else => Ok(CmdResult::End(EndMarker::Else {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            })),
            ParserKind::ElseIf => self.parse_cmd_elseif(),
            ParserKind::EndFor => Ok(CmdResult::End(EndMarker::EndFor(EndFor {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            }))),
            ParserKind::EndFunction => self.parse_cmd_endfunction(),
            ParserKind::EndIf => Ok(CmdResult::End(EndMarker::EndIf(EndIf {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            }))),
            ParserKind::EndTry => Ok(CmdResult::End(EndMarker::EndTry(EndTry {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            }))),
            ParserKind::EndWhile => Ok(CmdResult::End(EndMarker::EndWhile(EndWhile {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            }))),
            ParserKind::Execute => self.parse_cmd_execute(),
            ParserKind::Finally => Ok(CmdResult::End(EndMarker::Finally {
                pos: self.cmdpos(),
                ea: self.take_ea(),
            })),
            ParserKind::Finish => self.parse_cmd_finish(),
            ParserKind::For => self.parse_cmd_for(),
            ParserKind::Function => self.parse_cmd_function(),
            ParserKind::If => self.parse_cmd_if(),
            ParserKind::Let => self.parse_cmd_let(),
            ParserKind::LoadKeymap => self.parse_cmd_loadkeymap(),
            ParserKind::LockVar => self.parse_cmd_lockvar(false),
            ParserKind::Return => self.parse_cmd_return(),
            ParserKind::Script => self.parse_cmd_script(),
            ParserKind::Syntax => self.parse_cmd_syntax(),
            ParserKind::Throw => self.parse_cmd_throw(),
            ParserKind::Try => self.parse_cmd_try(),
            ParserKind::UnLet => self.parse_cmd_unlet(),
            ParserKind::UnLockVar => self.parse_cmd_lockvar(true),
            ParserKind::While => self.parse_cmd_while(),
            ParserKind::Wincmd => self.parse_wincmd(),
        }
    }

    // -------------------------------------------------------------------------
    // Plain commands
    // -------------------------------------------------------------------------

    fn parse_cmd_modifier_range(&mut self) -> Stmt {
        let pos = self.cmdpos();
        let command = self.reader.getstr(self.linepos_i, self.reader.tell());
        Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })
    }

    fn parse_cmd_common(&mut self) -> Result<CmdResult, ParseError> {
        let cmd_flags = self.ea.cmd.as_ref().map(|c| c.flags).unwrap_or(0);
        let end_i;
        if cmd_flags & flags::TRLBAR != 0 && !self.ea.usefilter {
            end_i = self.separate_nextcmd()?;
        } else {
            // `!`, `global`, filters and the rest: the whole line is the
            // argument
            loop {
                if self.reader.peek() == EOL || self.reader.peek() == EOF {
                    break;
                }
                self.reader.get();
            }
            end_i = self.reader.tell();
        }
        let pos = self.cmdpos();
        let command = self.reader.getstr(self.linepos_i, end_i);
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    /// Find where the current command's argument ends: at `|` or a trailing
    /// comment unless escaped or disabled by the command's flags.
    fn separate_nextcmd(&mut self) -> Result<usize, ParseError> {
        let cmd_name = self.ea.cmd.as_ref().map(|c| c.name.clone()).unwrap_or_default();
        let cmd_flags = self.ea.cmd.as_ref().map(|c| c.flags).unwrap_or(0);
        if matches!(cmd_name.as_str(), "vimgrep" | "vimgrepadd" | "lvimgrep" | "lvimgrepadd") {
            self.skip_vimgrep_pat()?;
        }
        let mut pc = EOF;
        let mut end = self.reader.tell();
        let mut nospend = end;
        loop {
            end = self.reader.tell();
            if !iswhite(pc) {
                nospend = end;
            }
            let c = self.reader.peek();
            if c == EOL || c == EOF {
                break;
            } else if c == '\u{16}' {
                // CTRL-V quotes the next character
                self.reader.get();
                end = self.reader.tell();
                nospend = end;
                let c2 = self.reader.peek();
                if c2 == EOL || c2 == EOF {
                    break;
                }
                self.reader.get();
            } else if self.reader.peekn(2) == "`=" && cmd_flags & flags::XFILE != 0 {
                // `=expr` filename expansion
                self.reader.getn(2);
                self.parse_expr()?;
                let c2 = self.reader.peek();
                if c2 != '`' {
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        format!("unexpected character: {}", c2),
                        self.reader.getpos(),
                    ));
                }
                self.reader.get();
            } else if c == '|'
                || (c == '"'
                    && cmd_flags & flags::NOTRLCOM == 0
                    && ((cmd_name != "@" && cmd_name != "*") || self.reader.tell() != self.argpos_i)
                    && (cmd_name != "redir"
                        || self.reader.tell() != self.argpos_i + 1
                        || pc != '@'))
            {
                if pc == '\\' {
                    end = self.reader.tell();
                    nospend = end;
                    self.reader.get();
                } else {
                    break;
                }
            } else {
                self.reader.get();
            }
            pc = c;
        }
        if cmd_flags & flags::NOTRLCOM == 0 {
            end = nospend;
        }
        Ok(end)
    }

    fn skip_vimgrep_pat(&mut self) -> Result<(), ParseError> {
        let c = self.reader.peek();
        if c == EOL || c == EOF {
            // pass
        } else if iswordc(c) {
            // :vimgrep pattern
            self.reader.read_nonwhite();
        } else {
            // :vimgrep /pattern/[g][j]
            let delim = self.reader.get();
            let (_, endc) = self.parse_pattern(delim)?;
            if endc != Some(delim) {
                return Ok(());
            }
            while self.reader.p(0) == 'g' || self.reader.p(0) == 'j' {
                self.reader.getn(1);
            }
        }
        Ok(())
    }

    fn parse_argopt(&mut self) -> Result<(), ParseError> {
        while self.reader.p(0) == '+' && self.reader.p(1) == '+' {
            let s = self.reader.peekn(20);
            if s.starts_with("++bin") && at_word_end(&s, 5) {
                self.reader.getn(5);
                self.ea.force_bin = ForceBin::Bin;
            } else if s.starts_with("++nobin") && at_word_end(&s, 7) {
                self.reader.getn(7);
                self.ea.force_bin = ForceBin::NoBin;
            } else if s.starts_with("++edit") && at_word_end(&s, 6) {
                self.reader.getn(6);
                self.ea.read_edit = true;
            } else if s.starts_with("++ff=") {
                self.reader.getn(5);
                let value = self.reader.read_alpha();
                if !matches!(value.as_str(), "dos" | "unix" | "mac") {
                    return Err(self.invalid_argopt());
                }
                self.ea.force_ff = value;
            } else if s.starts_with("++fileformat=") {
                self.reader.getn(13);
                let value = self.reader.read_alpha();
                if !matches!(value.as_str(), "dos" | "unix" | "mac") {
                    return Err(self.invalid_argopt());
                }
                self.ea.force_ff = value;
            } else if s.starts_with("++enc=") {
                self.reader.getn(6);
                self.ea.force_enc = self.reader.read_nonwhite();
            } else if s.starts_with("++encoding=") {
                self.reader.getn(11);
                self.ea.force_enc = self.reader.read_nonwhite();
            } else if s.starts_with("++bad=") {
                self.reader.getn(6);
                if self.reader.peekn(4) == "keep" {
                    self.ea.bad_char = self.reader.getn(4);
                } else if self.reader.peekn(4) == "drop" {
                    self.ea.bad_char = self.reader.getn(4);
                } else {
                    self.ea.bad_char = self.reader.getn(1);
                }
            } else if s.starts_with("++") {
                return Err(self.invalid_argopt());
            } else {
                break;
            }
            self.reader.skip_white();
        }
        Ok(())
    }

    fn invalid_argopt(&self) -> ParseError {
        ParseError::new(
            ErrorKind::InvalidArgument,
            "E474: Invalid argument",
            self.reader.getpos(),
        )
    }

    fn parse_argcmd(&mut self) {
        if self.reader.peek() == '+' {
            self.reader.get();
            if self.reader.peek() == ' ' {
                self.ea.do_ecmd_cmd = "$".to_string();
            } else {
                self.ea.do_ecmd_cmd = self.read_cmdarg();
            }
        }
    }

    fn read_cmdarg(&mut self) -> String {
        let mut r = String::new();
        loop {
            let c = self.reader.peek();
            if c == EOL || c == EOF || iswhite(c) {
                break;
            }
            self.reader.get();
            if c == '\\' {
                let c2 = self.reader.peek();
                if c2 != EOL && c2 != EOF {
                    r.push(self.reader.get());
                    continue;
                }
            }
            r.push(c);
        }
        r
    }

    fn parse_cmd_append(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.seek_set(self.linepos_i);
        let mut lines = vec![self.reader.get_line()];
        loop {
            if self.reader.is_eof() {
                break;
            }
            self.reader.get();
            if self.reader.is_eof() {
                break;
            }
            let line = self.reader.get_line();
            let done = line == ".";
            lines.push(line);
            if done {
                break;
            }
        }
        let command = lines.join("\n");
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    fn parse_cmd_loadkeymap(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.seek_set(self.linepos_i);
        let mut lines = vec![self.reader.get_line()];
        while !self.reader.is_eof() {
            self.reader.get();
            if self.reader.is_eof() {
                break;
            }
            lines.push(self.reader.get_line());
        }
        let command = lines.join("\n");
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    /// Script-language commands (`lua`, `python`, `ruby`, ...): either a
    /// one-line body or a `<< marker` heredoc read to the marker line.
    fn parse_cmd_script(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.skip_white();
        if self.reader.peekn(2) == "<<" {
            self.reader.getn(2);
            self.reader.skip_white();
            let mut marker = self.reader.get_line();
            if marker.is_empty() {
                marker = ".".to_string();
            }
            loop {
                if self.reader.is_eof() {
                    break;
                }
                self.reader.get();
                let line = self.reader.get_line();
                if line == marker {
                    break;
                }
            }
        } else {
            self.reader.get_line();
        }
        let command = self.reader.getstr(self.linepos_i, self.reader.tell());
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    fn parse_cmd_finish(&mut self) -> Result<CmdResult, ParseError> {
        let result = self.parse_cmd_common()?;
        if self.context.is_empty() {
            // :finish at toplevel stops the whole parse
            self.reader.seek_end();
        }
        Ok(result)
    }

    fn parse_wincmd(&mut self) -> Result<CmdResult, ParseError> {
        let c = self.reader.getn(1);
        if c.is_empty() {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E471: Argument required",
                self.reader.getpos(),
            ));
        }
        if c == "g" || c == "\u{7}" {
            let c2 = self.reader.getn(1);
            if c2.is_empty() || iswhite(c2.chars().next().unwrap_or(' ')) {
                return Err(ParseError::new(
                    ErrorKind::InvalidArgument,
                    "E474: Invalid argument",
                    self.reader.getpos(),
                ));
            }
        }
        let end_i = self.reader.tell();
        self.reader.skip_white();
        if !self.ends_excmds(self.reader.peek()) {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E474: Invalid argument",
                self.reader.getpos(),
            ));
        }
        let pos = self.cmdpos();
        let command = self.reader.getstr(self.linepos_i, end_i);
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    fn parse_cmd_syntax(&mut self) -> Result<CmdResult, ParseError> {
        let mut end_i = self.reader.tell();
        loop {
            let c = self.reader.peek();
            if c == '/' || c == '"' {
                // patterns may contain characters that would otherwise
                // terminate the command
                self.reader.get();
                self.parse_pattern(c)?;
            } else if c == EOL || c == EOF {
                break;
            } else {
                self.reader.get();
            }
            end_i = self.reader.tell();
        }
        let pos = self.cmdpos();
        let command = self.reader.getstr(self.linepos_i, end_i);
        Ok(CmdResult::Pending(Stmt::Excmd(Excmd { pos, ea: self.take_ea(), command })))
    }

    // -------------------------------------------------------------------------
    // Assignment-family commands
    // -------------------------------------------------------------------------

    fn parse_cmd_let(&mut self) -> Result<CmdResult, ParseError> {
        let pos_save = self.reader.tell();
        self.reader.skip_white();
        // bare :let lists variables
        if self.ends_excmds(self.reader.peek()) {
            self.reader.seek_set(pos_save);
            return self.parse_cmd_common();
        }
        let pos = self.cmdpos();
        let lhs = self.parse_letlhs()?;
        self.reader.skip_white();
        let s1 = self.reader.peekn(1);
        let s2 = self.reader.peekn(2);
        let compound = matches!(s2.as_str(), "+=" | "-=" | ".=" | "*=" | "/=" | "%=");
        if self.ends_excmds(self.reader.peek()) || (!compound && s1 != "=") {
            // :let var (display) has no assignment
            self.reader.seek_set(pos_save);
            return self.parse_cmd_common();
        }
        let op = if compound {
            self.reader.getn(2)
        } else {
            self.reader.getn(1)
        };
        let right = self.parse_expr()?;
        Ok(CmdResult::Pending(Stmt::Let(Box::new(Let {
            pos,
            ea: self.take_ea(),
            op,
            lhs,
            right,
        }))))
    }

    fn parse_letlhs(&mut self) -> Result<LetLhs, ParseError> {
        if self.peek_tok()?.ttype != TokenType::SqOpen {
            return Ok(LetLhs::Single(self.parse_lvalue()?));
        }
        self.next_tok()?;
        let mut items = Vec::new();
        let mut rest = None;
        loop {
            items.push(self.parse_lvalue()?);
            let token = self.next_tok()?;
            match token.ttype {
                TokenType::SqClose => break,
                TokenType::Comma => continue,
                TokenType::Semicolon => {
                    rest = Some(self.parse_lvalue()?);
                    let token = self.next_tok()?;
                    if token.ttype == TokenType::SqClose {
                        break;
                    }
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        format!("E475: Invalid argument: {}", token.value),
                        token.pos,
                    ));
                }
                _ => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        format!("E475: Invalid argument: {}", token.value),
                        token.pos,
                    ));
                }
            }
        }
        Ok(LetLhs::List { items, rest })
    }

    /// An assignment target: variable, curly name, option, env var,
    /// register, or an index/slice/member of one.
    fn parse_lvalue(&mut self) -> Result<Expr, ParseError> {
        let node = ExprParser::new(&mut self.reader).parse_lvalue_expr()?;
        if let Expr::Ident(id) = &node {
            if !isvarname(&id.name) {
                return Err(ParseError::new(
                    ErrorKind::InvalidExpression,
                    format!("E461: Illegal variable name: {}", id.name),
                    id.pos,
                ));
            }
        }
        match &node {
            Expr::Ident(_)
            | Expr::CurlyName(_)
            | Expr::Subscript(_)
            | Expr::Slice(_)
            | Expr::Dot(_) => Ok(node),
            Expr::Lit(lit)
                if matches!(lit.kind, LitKind::Option | LitKind::Env | LitKind::Reg) =>
            {
                Ok(node)
            }
            _ => Err(ParseError::new(
                ErrorKind::InvalidExpression,
                "Invalid Expression",
                node.pos(),
            )),
        }
    }

    /// A function name: like an lvalue but without slices.
    fn parse_lvalue_func(&mut self) -> Result<Expr, ParseError> {
        let node = ExprParser::new(&mut self.reader).parse_lvalue_expr()?;
        match &node {
            Expr::Ident(_) | Expr::CurlyName(_) | Expr::Subscript(_) | Expr::Dot(_) => Ok(node),
            Expr::Lit(lit)
                if matches!(lit.kind, LitKind::Option | LitKind::Env | LitKind::Reg) =>
            {
                Ok(node)
            }
            _ => Err(ParseError::new(
                ErrorKind::InvalidExpression,
                "Invalid Expression",
                node.pos(),
            )),
        }
    }

    fn parse_lvaluelist(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![self.parse_expr()?];
        loop {
            self.reader.skip_white();
            if self.ends_excmds(self.reader.peek()) {
                break;
            }
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_cmd_unlet(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let list = self.parse_lvaluelist()?;
        Ok(CmdResult::Pending(Stmt::UnLet(UnLet { pos, ea: self.take_ea(), list })))
    }

    fn parse_cmd_lockvar(&mut self, unlock: bool) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.skip_white();
        let mut depth = None;
        if isdigit(self.reader.peek()) {
            depth = self.reader.read_digit().parse::<usize>().ok();
        }
        let list = self.parse_lvaluelist()?;
        let ea = self.take_ea();
        let stmt = if unlock {
            Stmt::UnLockVar(UnLockVar { pos, ea, depth, list })
        } else {
            Stmt::LockVar(LockVar { pos, ea, depth, list })
        };
        Ok(CmdResult::Pending(stmt))
    }

    // -------------------------------------------------------------------------
    // Simple statement commands
    // -------------------------------------------------------------------------

    fn parse_cmd_return(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        if !self.context.contains(&BlockKind::Function) {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E133: :return not inside a function",
                pos,
            ));
        }
        self.reader.skip_white();
        let c = self.reader.peek();
        let result = if c == '"' || !self.ends_excmds(c) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(CmdResult::Pending(Stmt::Return(Return { pos, ea: self.take_ea(), result })))
    }

    fn parse_cmd_call(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.skip_white();
        if self.ends_excmds(self.reader.peek()) {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E471: Argument required",
                self.reader.getpos(),
            ));
        }
        let left = self.parse_expr()?;
        match left {
            Expr::Call(call) => Ok(CmdResult::Pending(Stmt::ExCall(ExCall {
                pos,
                ea: self.take_ea(),
                call,
            }))),
            other => Err(ParseError::new(
                ErrorKind::InvalidExpression,
                "Not a function call",
                other.pos(),
            )),
        }
    }

    fn parse_cmd_delfunction(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let name = self.parse_lvalue_func()?;
        Ok(CmdResult::Pending(Stmt::DelFunction(DelFunction { pos, ea: self.take_ea(), name })))
    }

    fn parse_cmd_continue(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        if !self.in_loop() {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E586: :continue without :while or :for",
                pos,
            ));
        }
        Ok(CmdResult::Pending(Stmt::Continue(Continue { pos, ea: self.take_ea() })))
    }

    fn parse_cmd_break(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        if !self.in_loop() {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "E587: :break without :while or :for",
                pos,
            ));
        }
        Ok(CmdResult::Pending(Stmt::Break(Break { pos, ea: self.take_ea() })))
    }

    fn in_loop(&self) -> bool {
        self.context
            .iter()
            .any(|k| matches!(k, BlockKind::While | BlockKind::For))
    }

    fn parse_cmd_throw(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let expr = self.parse_expr()?;
        Ok(CmdResult::Pending(Stmt::Throw(Throw { pos, ea: self.take_ea(), expr })))
    }

    fn parse_exprlist(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = Vec::new();
        loop {
            self.reader.skip_white();
            let c = self.reader.peek();
            if c != '"' && self.ends_excmds(c) {
                break;
            }
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_cmd_echo(&mut self, kind: EchoKind) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let exprs = self.parse_exprlist()?;
        Ok(CmdResult::Pending(Stmt::Echo(Echo { pos, ea: self.take_ea(), cmd: kind, exprs })))
    }

    fn parse_cmd_echohl(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.skip_white();
        let mut name = String::new();
        while !self.ends_excmds(self.reader.peek()) {
            name.push(self.reader.get());
        }
        Ok(CmdResult::Pending(Stmt::Echohl(Echohl { pos, ea: self.take_ea(), name })))
    }

    fn parse_cmd_execute(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let exprs = self.parse_exprlist()?;
        Ok(CmdResult::Pending(Stmt::Execute(Execute { pos, ea: self.take_ea(), exprs })))
    }

    // -------------------------------------------------------------------------
    // Block commands
    // -------------------------------------------------------------------------

    fn parse_cmd_elseif(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let cond = self.parse_expr()?;
        Ok(CmdResult::End(EndMarker::ElseIf { pos, ea: self.take_ea(), cond }))
    }

    fn parse_cmd_catch(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        self.reader.skip_white();
        let pattern = if !self.ends_excmds(self.reader.peek()) {
            let delim = self.reader.get();
            let (pat, _) = self.parse_pattern(delim)?;
            Some(pat)
        } else {
            None
        };
        Ok(CmdResult::End(EndMarker::Catch { pos, ea: self.take_ea(), pattern }))
    }

    fn parse_cmd_endfunction(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        // anything after :endfunction on the line is ignored
        self.reader.get_line();
        Ok(CmdResult::End(EndMarker::EndFunction(EndFunction { pos, ea: self.take_ea() })))
    }

    fn parse_cmd_if(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let cond = self.parse_expr()?;
        let ea = self.take_ea();
        self.push_context(BlockKind::If)?;
        let mut body: Vec<Stmt> = Vec::new();
        if let Some(comment) = self.parse_trail()? {
            body.push(comment);
        }
        let mut elseifs: Vec<ElseIf> = Vec::new();
        let mut else_clause: Option<Else> = None;
        let endif;
        let trailing_after;
        loop {
            if self.reader.is_eof() {
                return Err(ParseError::new(
                    ErrorKind::UnbalancedBlock,
                    "E171: Missing :endif",
                    pos,
                ));
            }
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => {
                    let target = match (&mut else_clause, elseifs.last_mut()) {
                        (Some(els), _) => &mut els.body,
                        (None, Some(elif)) => &mut elif.body,
                        (None, None) => &mut body,
                    };
                    target.extend(stmts);
                }
                ParsedCmd::End { marker, trailing } => match marker {
                    EndMarker::ElseIf { pos: epos, ea: eea, cond: econd } => {
                        if else_clause.is_some() {
                            return Err(ParseError::new(
                                ErrorKind::UnbalancedBlock,
                                "E584: :elseif after :else",
                                epos,
                            ));
                        }
                        elseifs.push(ElseIf {
                            pos: epos,
                            ea: eea,
                            cond: econd,
                            body: trailing.into_iter().collect(),
                        });
                    }
                    EndMarker::Else { pos: epos, ea: eea } => {
                        if else_clause.is_some() {
                            return Err(ParseError::new(
                                ErrorKind::UnbalancedBlock,
                                "E583: multiple :else",
                                epos,
                            ));
                        }
                        else_clause = Some(Else {
                            pos: epos,
                            ea: eea,
                            body: trailing.into_iter().collect(),
                        });
                    }
                    EndMarker::EndIf(node) => {
                        endif = node;
                        trailing_after = trailing;
                        break;
                    }
                    other => return Err(mismatch_error(BlockKind::If, other)),
                },
            }
        }
        self.context.pop();
        let stmt = Stmt::If(Box::new(If { pos, ea, cond, body, elseifs, else_clause, endif }));
        let mut out = vec![stmt];
        out.extend(trailing_after);
        Ok(CmdResult::Done(out))
    }

    fn parse_cmd_while(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let cond = self.parse_expr()?;
        let ea = self.take_ea();
        self.push_context(BlockKind::While)?;
        let mut body: Vec<Stmt> = Vec::new();
        if let Some(comment) = self.parse_trail()? {
            body.push(comment);
        }
        let endwhile;
        let trailing_after;
        loop {
            if self.reader.is_eof() {
                return Err(ParseError::new(
                    ErrorKind::UnbalancedBlock,
                    "E170: Missing :endwhile",
                    pos,
                ));
            }
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => body.extend(stmts),
                ParsedCmd::End { marker, trailing } => match marker {
                    EndMarker::EndWhile(node) => {
                        endwhile = node;
                        trailing_after = trailing;
                        break;
                    }
                    other => return Err(mismatch_error(BlockKind::While, other)),
                },
            }
        }
        self.context.pop();
        let stmt = Stmt::While(Box::new(While { pos, ea, cond, body, endwhile }));
        let mut out = vec![stmt];
        out.extend(trailing_after);
        Ok(CmdResult::Done(out))
    }

    fn parse_cmd_for(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let lhs = self.parse_letlhs()?;
        self.reader.skip_white();
        let epos = self.reader.getpos();
        if self.reader.read_alpha() != "in" {
            return Err(ParseError::new(
                ErrorKind::InvalidArgument,
                "Missing \"in\" after :for",
                epos,
            ));
        }
        let right = self.parse_expr()?;
        let ea = self.take_ea();
        self.push_context(BlockKind::For)?;
        let mut body: Vec<Stmt> = Vec::new();
        if let Some(comment) = self.parse_trail()? {
            body.push(comment);
        }
        let endfor;
        let trailing_after;
        loop {
            if self.reader.is_eof() {
                return Err(ParseError::new(
                    ErrorKind::UnbalancedBlock,
                    "E170: Missing :endfor",
                    pos,
                ));
            }
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => body.extend(stmts),
                ParsedCmd::End { marker, trailing } => match marker {
                    EndMarker::EndFor(node) => {
                        endfor = node;
                        trailing_after = trailing;
                        break;
                    }
                    other => return Err(mismatch_error(BlockKind::For, other)),
                },
            }
        }
        self.context.pop();
        let stmt = Stmt::For(Box::new(For { pos, ea, lhs, right, body, endfor }));
        let mut out = vec![stmt];
        out.extend(trailing_after);
        Ok(CmdResult::Done(out))
    }

    fn parse_cmd_try(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let ea = self.take_ea();
        self.push_context(BlockKind::Try)?;
        let mut body: Vec<Stmt> = Vec::new();
        if let Some(comment) = self.parse_trail()? {
            body.push(comment);
        }
        let mut catches: Vec<Catch> = Vec::new();
        let mut finally: Option<Finally> = None;
        let endtry;
        let trailing_after;
        loop {
            if self.reader.is_eof() {
                return Err(ParseError::new(
                    ErrorKind::UnbalancedBlock,
                    "E600: Missing :endtry",
                    pos,
                ));
            }
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => {
                    let target = match (&mut finally, catches.last_mut()) {
                        (Some(fin), _) => &mut fin.body,
                        (None, Some(catch)) => &mut catch.body,
                        (None, None) => &mut body,
                    };
                    target.extend(stmts);
                }
                ParsedCmd::End { marker, trailing } => match marker {
                    EndMarker::Catch { pos: cpos, ea: cea, pattern } => {
                        if finally.is_some() {
                            return Err(ParseError::new(
                                ErrorKind::UnbalancedBlock,
                                "E604: :catch after :finally",
                                cpos,
                            ));
                        }
                        catches.push(Catch {
                            pos: cpos,
                            ea: cea,
                            pattern,
                            body: trailing.into_iter().collect(),
                        });
                    }
                    EndMarker::Finally { pos: fpos, ea: fea } => {
                        if finally.is_some() {
                            return Err(ParseError::new(
                                ErrorKind::UnbalancedBlock,
                                "E607: multiple :finally",
                                fpos,
                            ));
                        }
                        finally = Some(Finally {
                            pos: fpos,
                            ea: fea,
                            body: trailing.into_iter().collect(),
                        });
                    }
                    EndMarker::EndTry(node) => {
                        endtry = node;
                        trailing_after = trailing;
                        break;
                    }
                    other => return Err(mismatch_error(BlockKind::Try, other)),
                },
            }
        }
        self.context.pop();
        let stmt = Stmt::Try(Box::new(Try { pos, ea, body, catches, finally, endtry }));
        let mut out = vec![stmt];
        out.extend(trailing_after);
        Ok(CmdResult::Done(out))
    }

    fn parse_cmd_function(&mut self) -> Result<CmdResult, ParseError> {
        let pos = self.cmdpos();
        let pos_save = self.reader.tell();
        self.reader.skip_white();
        // :function and :function /pattern list functions
        if self.ends_excmds(self.reader.peek()) || self.reader.peek() == '/' {
            self.reader.seek_set(pos_save);
            return self.parse_cmd_common();
        }
        let name = self.parse_lvalue_func()?;
        self.reader.skip_white();
        if let Expr::Ident(id) = &name {
            let first = id.name.chars().next().unwrap_or(' ');
            if first != '<'
                && first != '_'
                && !first.is_ascii_uppercase()
                && !id.name.contains(':')
                && !id.name.contains('#')
            {
                return Err(ParseError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "E128: Function name must start with a capital or contain a colon: {}",
                        id.name
                    ),
                    id.pos,
                ));
            }
        }
        // :function Name lists one function
        if self.reader.peek() != '(' {
            self.reader.seek_set(pos_save);
            return self.parse_cmd_common();
        }
        self.reader.get();
        let mut params: Vec<Ident> = Vec::new();
        if self.peek_tok()?.ttype == TokenType::PClose {
            self.next_tok()?;
        } else {
            loop {
                let token = self.next_tok()?;
                match token.ttype {
                    TokenType::Identifier => {
                        if !isargname(&token.value)
                            || token.value == "firstline"
                            || token.value == "lastline"
                        {
                            return Err(ParseError::new(
                                ErrorKind::InvalidArgument,
                                format!("E125: Illegal argument: {}", token.value),
                                token.pos,
                            ));
                        }
                        if params.iter().any(|p| p.name == token.value) {
                            return Err(ParseError::new(
                                ErrorKind::InvalidArgument,
                                format!("E853: Duplicate argument name: {}", token.value),
                                token.pos,
                            ));
                        }
                        let varnode = Ident { pos: token.pos, name: token.value };
                        if iswhite(self.reader.p(0))
                            && self.peek_tok()?.ttype == TokenType::Comma
                        {
                            return Err(ParseError::new(
                                ErrorKind::InvalidArgument,
                                "E475: Invalid argument: White space is not allowed before comma",
                                self.reader.getpos(),
                            ));
                        }
                        let next = self.next_tok()?;
                        params.push(varnode);
                        if next.ttype == TokenType::Comma {
                            // a trailing comma before ) is accepted
                            if self.peek_tok()?.ttype == TokenType::PClose {
                                self.next_tok()?;
                                break;
                            }
                        } else if next.ttype == TokenType::PClose {
                            break;
                        } else {
                            return Err(unexpected_token(&next));
                        }
                    }
                    TokenType::DotDotDot => {
                        params.push(Ident { pos: token.pos, name: token.value });
                        let next = self.next_tok()?;
                        if next.ttype == TokenType::PClose {
                            break;
                        }
                        return Err(unexpected_token(&next));
                    }
                    _ => return Err(unexpected_token(&token)),
                }
            }
        }
        let mut attr = FuncAttr::default();
        self.reader.skip_white();
        loop {
            let epos = self.reader.getpos();
            let key = self.reader.read_alpha();
            if key.is_empty() {
                break;
            }
            match key.as_str() {
                "range" => attr.range = true,
                "abort" => attr.abort = true,
                "dict" => attr.dict = true,
                "closure" => attr.closure = true,
                _ => {
                    return Err(ParseError::new(
                        ErrorKind::InvalidArgument,
                        format!("unexpected token: {}", key),
                        epos,
                    ));
                }
            }
            self.reader.skip_white();
        }
        let ea = self.take_ea();
        self.push_context(BlockKind::Function)?;
        let mut body: Vec<Stmt> = Vec::new();
        if let Some(comment) = self.parse_trail()? {
            body.push(comment);
        }
        let endfunction;
        let trailing_after;
        loop {
            if self.reader.is_eof() {
                return Err(ParseError::new(
                    ErrorKind::UnbalancedBlock,
                    "E126: Missing :endfunction",
                    pos,
                ));
            }
            match self.parse_one_cmd()? {
                ParsedCmd::Stmts(stmts) => body.extend(stmts),
                ParsedCmd::End { marker, trailing } => match marker {
                    EndMarker::EndFunction(node) => {
                        endfunction = node;
                        trailing_after = trailing;
                        break;
                    }
                    other => return Err(mismatch_error(BlockKind::Function, other)),
                },
            }
        }
        self.context.pop();
        let stmt = Stmt::Function(Box::new(Function {
            pos,
            ea,
            name,
            params,
            attr,
            body,
            endfunction,
        }));
        let mut out = vec![stmt];
        out.extend(trailing_after);
        Ok(CmdResult::Done(out))
    }
}

/// Does the text after `s` look like substitution flags rather than another
/// command name starting with `s`? Mirrors the original's irregular check:
/// `s` followed by `c[^sr][^i][^p]`, `g`, `i[^mlg]`, `I`, or `r[^e]`.
fn is_substitute_with_flags(s: &str) -> bool {
    let b: Vec<char> = s.chars().collect();
    if b.first() != Some(&'s') {
        return false;
    }
    match b.get(1) {
        Some('c') => {
            b.len() >= 5
                && !matches!(b[2], 's' | 'r')
                && b[3] != 'i'
                && b[4] != 'p'
        }
        Some('g') => true,
        Some('i') => b.len() >= 3 && !matches!(b[2], 'm' | 'l' | 'g'),
        Some('I') => true,
        Some('r') => b.len() >= 3 && b[2] != 'e',
        _ => false,
    }
}

/// `d[l|p]`, `del[l|p]`, `delete[l|p]`...: delete with print/list flags.
fn is_delete_with_flag(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < 2 || chars[0] != 'd' {
        return false;
    }
    let last = chars[chars.len() - 1];
    if last != 'l' && last != 'p' {
        return false;
    }
    let middle: String = chars[1..chars.len() - 1].iter().collect();
    "elete".starts_with(&middle)
}

fn at_word_end(s: &str, i: usize) -> bool {
    match s.chars().nth(i) {
        Some(c) => !iswordc(c),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> File {
        parse(input, &ParseOption::default()).unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        parse(input, &ParseOption::default()).unwrap_err()
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_ok("").body.len(), 0);
    }

    #[test]
    fn test_parse_let() {
        let file = parse_ok("let x = 1");
        assert_eq!(file.body.len(), 1);
        match &file.body[0] {
            Stmt::Let(l) => {
                assert_eq!(l.op, "=");
                assert!(matches!(&l.lhs, LetLhs::Single(Expr::Ident(_))));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_parse_let_destructuring() {
        let file = parse_ok("let [a, b; rest] = range(10)");
        match &file.body[0] {
            Stmt::Let(l) => match &l.lhs {
                LetLhs::List { items, rest } => {
                    assert_eq!(items.len(), 2);
                    assert!(rest.is_some());
                }
                other => panic!("unexpected lhs: {:?}", other),
            },
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_let_compound_ops() {
        for op in ["+=", "-=", ".="] {
            let file = parse_ok(&format!("let x {} 1", op));
            match &file.body[0] {
                Stmt::Let(l) => assert_eq!(l.op, op),
                other => panic!("unexpected statement: {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_err("hoge");
        assert_eq!(err.kind, ErrorKind::UnknownCommand);
        assert_eq!(err.message, "E492: Not an editor command: hoge");
        assert_eq!(err.pos.line, 1);
        assert_eq!(err.pos.column, 1);
    }

    #[test]
    fn test_uppercase_is_user_command() {
        let file = parse_ok("MyCommand arg1 arg2");
        match &file.body[0] {
            Stmt::Excmd(e) => {
                let cmd = e.ea.cmd.as_ref().unwrap();
                assert_eq!(cmd.name, "MyCommand");
                assert_ne!(cmd.flags & flags::USERCMD, 0);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_if_elseif_count() {
        let file = parse_ok("if a\nelseif b\nelseif c\nelse\nendif");
        match &file.body[0] {
            Stmt::If(i) => {
                assert_eq!(i.elseifs.len(), 2);
                assert!(i.else_clause.is_some());
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_missing_endif_reports_opener() {
        let err = parse_err("echo 1\nif a\necho 2");
        assert_eq!(err.kind, ErrorKind::UnbalancedBlock);
        assert_eq!(err.message, "E171: Missing :endif");
        assert_eq!(err.pos.line, 2);
        assert_eq!(err.pos.column, 1);
    }

    #[test]
    fn test_bare_terminators() {
        for (src, msg) in [
            ("endif", "E580: :endif without :if"),
            ("endwhile", "E588: :endwhile without :while"),
            ("endfor", "E588: :endfor without :for"),
            ("endtry", "E602: :endtry without :try"),
            ("endfunction", "E193: :endfunction not inside a function"),
            ("else", "E581: :else without :if"),
            ("elseif 1", "E582: :elseif without :if"),
            ("catch", "E603: :catch without :try"),
            ("finally", "E606: :finally without :try"),
        ] {
            let err = parse_err(src);
            assert_eq!(err.kind, ErrorKind::UnbalancedBlock, "for {:?}", src);
            assert_eq!(err.message, msg, "for {:?}", src);
            assert_eq!(err.pos.line, 1, "for {:?}", src);
            assert_eq!(err.pos.column, 1, "for {:?}", src);
        }
    }

    #[test]
    fn test_missing_terminator_each_kind() {
        for (src, msg) in [
            ("if 1", "E171: Missing :endif"),
            ("while 1", "E170: Missing :endwhile"),
            ("for x in y", "E170: Missing :endfor"),
            ("try", "E600: Missing :endtry"),
            ("function! F()", "E126: Missing :endfunction"),
        ] {
            let err = parse_err(src);
            assert_eq!(err.kind, ErrorKind::UnbalancedBlock, "for {:?}", src);
            assert_eq!(err.message, msg, "for {:?}", src);
            // the opener's position is reported
            assert_eq!(err.pos.line, 1, "for {:?}", src);
            assert_eq!(err.pos.column, 1, "for {:?}", src);
        }
    }

    #[test]
    fn test_multiple_else() {
        let err = parse_err("if 1\nelse\nelse\nendif");
        assert_eq!(err.message, "E583: multiple :else");
        assert_eq!(err.pos.line, 3);
    }

    #[test]
    fn test_elseif_after_else() {
        let err = parse_err("if 1\nelse\nelseif 2\nendif");
        assert_eq!(err.message, "E584: :elseif after :else");
    }

    #[test]
    fn test_try_clauses() {
        let file = parse_ok("try\ncall F()\ncatch /E484/\necho 1\ncatch\necho 2\nfinally\necho 3\nendtry");
        match &file.body[0] {
            Stmt::Try(t) => {
                assert_eq!(t.catches.len(), 2);
                assert_eq!(t.catches[0].pattern.as_deref(), Some("E484"));
                assert_eq!(t.catches[1].pattern, None);
                assert!(t.finally.is_some());
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_catch_after_finally() {
        let err = parse_err("try\nfinally\ncatch\nendtry");
        assert_eq!(err.message, "E604: :catch after :finally");
    }

    #[test]
    fn test_function_params_and_attrs() {
        let file = parse_ok("function! s:run(a, b, ...) abort dict\nreturn a:a\nendfunction");
        match &file.body[0] {
            Stmt::Function(f) => {
                assert_eq!(f.params.len(), 3);
                assert_eq!(f.params[2].name, "...");
                assert!(f.attr.abort);
                assert!(f.attr.dict);
                assert!(!f.attr.range);
                assert!(f.ea.forceit);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_function_bad_name() {
        let err = parse_err("function foo()\nendfunction");
        assert!(err.message.starts_with("E128:"), "{}", err.message);
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse_err("return 1");
        assert_eq!(err.message, "E133: :return not inside a function");
    }

    #[test]
    fn test_continue_outside_loop() {
        let err = parse_err("continue");
        assert_eq!(err.message, "E586: :continue without :while or :for");
    }

    #[test]
    fn test_bar_separates_commands() {
        let file = parse_ok("let x = 1 | let y = 2");
        assert_eq!(file.body.len(), 2);
    }

    #[test]
    fn test_trailing_comment() {
        let file = parse_ok("let x = 1 \" note");
        assert_eq!(file.body.len(), 2);
        assert!(matches!(&file.body[1], Stmt::Comment(c) if c.text == " note"));
    }

    #[test]
    fn test_comment_line() {
        let file = parse_ok("\" a comment");
        assert!(matches!(&file.body[0], Stmt::Comment(c) if c.text == " a comment"));
    }

    #[test]
    fn test_excmd_passthrough_with_range() {
        let file = parse_ok("1,5delete");
        match &file.body[0] {
            Stmt::Excmd(e) => {
                assert_eq!(e.ea.range, vec!["1", ",", "5"]);
                assert_eq!(e.ea.cmd.as_ref().unwrap().name, "delete");
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_modifiers() {
        let file = parse_ok("silent keepjumps write");
        match &file.body[0] {
            Stmt::Excmd(e) => {
                assert_eq!(e.ea.modifiers.len(), 2);
                assert_eq!(e.ea.modifiers[0].name, "silent");
                assert!(!e.ea.modifiers[0].bang);
                assert_eq!(e.ea.modifiers[1].name, "keepjumps");
                assert_eq!(e.ea.cmd.as_ref().unwrap().name, "write");
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_modifier_bang_and_count() {
        let file = parse_ok("silent! write");
        match &file.body[0] {
            Stmt::Excmd(e) => {
                assert_eq!(e.ea.modifiers.len(), 1);
                assert!(e.ea.modifiers[0].bang);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
        let file = parse_ok("3verbose set list");
        match &file.body[0] {
            Stmt::Excmd(e) => {
                assert_eq!(e.ea.modifiers[0].name, "verbose");
                assert_eq!(e.ea.modifiers[0].count, Some(3));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_command_abbreviation() {
        let file = parse_ok("ec 1");
        match &file.body[0] {
            Stmt::Echo(e) => assert_eq!(e.cmd, EchoKind::Echo),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_trailing_characters_error() {
        let err = parse_err("endif!extra\n");
        // endif takes no bang; the error points at it
        assert!(err.message.starts_with("E477:") || err.message.starts_with("E488:"));
    }

    #[test]
    fn test_line_continuation_expression() {
        let file = parse_ok("let x = [1,\n      \\ 2,\n      \\ 3]");
        assert_eq!(file.body.len(), 1);
    }

    #[test]
    fn test_finish_stops_toplevel() {
        let file = parse_ok("echo 1\nfinish\nnot-a-command");
        assert_eq!(file.body.len(), 2);
    }

    #[test]
    fn test_neovim_dialect_flag() {
        assert!(parse("rshada", &ParseOption { neovim: true }).is_ok());
        let err = parse_err("rshada");
        assert_eq!(err.kind, ErrorKind::UnknownCommand);
    }

    #[test]
    fn test_call_statement() {
        let file = parse_ok("call s:init(1, 2)");
        match &file.body[0] {
            Stmt::ExCall(c) => assert_eq!(c.call.args.len(), 2),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_call_requires_call_expr() {
        let err = parse_err("call foo");
        assert_eq!(err.message, "Not a function call");
    }

    #[test]
    fn test_deterministic_reparse() {
        let src = "if a\nlet x = 1\nelse\nlet x = 2\nendif";
        assert_eq!(parse_ok(src), parse_ok(src));
    }
}
