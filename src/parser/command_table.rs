//! Ex-Command Table
//!
//! The fixed table of built-in ex-commands: full name, minimum unambiguous
//! abbreviation length, argument flags, and which parser handles the
//! command's tail. The table is process-wide read-only data; it has no
//! mutation path and is shared freely across parses.
//!
//! Resolution rules live in [`lookup`]: an exact name match always wins,
//! otherwise a prefix is accepted when it is at least `minlen` characters of
//! exactly one entry's name. Two entries accepting the same prefix with no
//! exact match is an ambiguity, reported to the caller.

use std::collections::HashMap;

use lazy_static::lazy_static;

// =============================================================================
// COMMAND FLAGS
// =============================================================================

/// Argument-parsing flags, combined per command table entry.
pub mod flags {
    /// Command accepts a line range.
    pub const RANGE: u32 = 1 << 0;
    /// Command accepts `!` after the name.
    pub const BANG: u32 = 1 << 1;
    /// Free-form argument text to end of line.
    pub const EXTRA: u32 = 1 << 2;
    /// Expand wildcards and backtick expressions in the argument.
    pub const XFILE: u32 = 1 << 3;
    /// No spaces allowed in the argument.
    pub const NOSPC: u32 = 1 << 4;
    /// Default range is the whole file.
    pub const DFLALL: u32 = 1 << 5;
    /// Range applies to whole closed folds.
    pub const WHOLEFOLD: u32 = 1 << 6;
    /// An argument is required.
    pub const NEEDARG: u32 = 1 << 7;
    /// A trailing `|` starts a new command on the same line.
    pub const TRLBAR: u32 = 1 << 8;
    /// Command accepts a register name argument.
    pub const REGSTR: u32 = 1 << 9;
    /// Command accepts a trailing count.
    pub const COUNT: u32 = 1 << 10;
    /// A trailing `"` is argument text, not a comment.
    pub const NOTRLCOM: u32 = 1 << 11;
    /// Zero line number is allowed in the range.
    pub const ZEROR: u32 = 1 << 12;
    /// CTRL-V in the argument is kept literally.
    pub const USECTRLV: u32 = 1 << 13;
    /// The count is not a line address.
    pub const NOTADR: u32 = 1 << 14;
    /// Command opens a file like `:edit`; `+cmd` is accepted.
    pub const EDITCMD: u32 = 1 << 15;
    /// Argument may be a buffer name.
    pub const BUFNAME: u32 = 1 << 16;
    /// Unloaded buffers are accepted too.
    pub const BUFUNL: u32 = 1 << 17;
    /// `++opt` file options are accepted.
    pub const ARGOPT: u32 = 1 << 18;
    /// Allowed in the sandbox.
    pub const SBOXOK: u32 = 1 << 19;
    /// Allowed in the command-line window.
    pub const CMDWIN: u32 = 1 << 20;
    /// Command modifies the buffer.
    pub const MODIFY: u32 = 1 << 21;
    /// Print flags (`l`, `#`, `p`) are accepted after the range/count.
    pub const EXFLAGS: u32 = 1 << 22;
    /// Disallowed in restricted mode.
    pub const RESTRICT: u32 = 1 << 23;
    /// Entry describes a user-defined command.
    pub const USERCMD: u32 = 1 << 24;
    /// Multiple file names with expansion.
    pub const FILES: u32 = XFILE | EXTRA;
    /// One word argument, no spaces.
    pub const WORD1: u32 = EXTRA | NOSPC;
    /// At most one file name.
    pub const FILE1: u32 = FILES | NOSPC;
}

/// Which routine parses the command's tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Append,
    Break,
    Call,
    Catch,
    Common,
    Continue,
    DelFunction,
    Echo,
    EchoErr,
    EchoHl,
    EchoMsg,
    EchoN,
    Else,
    ElseIf,
    EndFor,
    EndFunction,
    EndIf,
    EndTry,
    EndWhile,
    Execute,
    Finally,
    Finish,
    For,
    Function,
    If,
    Let,
    LoadKeymap,
    LockVar,
    Return,
    Script,
    Syntax,
    Throw,
    Try,
    UnLet,
    UnLockVar,
    UserCmd,
    While,
    Wincmd,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: &'static str,
    pub minlen: usize,
    pub flags: u32,
    pub parser: ParserKind,
}

macro_rules! cmd {
    ($name:literal, $minlen:expr, $flags:expr, $parser:ident) => {
        CommandEntry {
            name: $name,
            minlen: $minlen,
            flags: $flags,
            parser: ParserKind::$parser,
        }
    };
}

use flags::*;

#[rustfmt::skip]
pub static BUILTIN_COMMANDS: &[CommandEntry] = &[
    cmd!("append", 1, BANG | RANGE | ZEROR | TRLBAR | CMDWIN, Append),
    cmd!("abbreviate", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("abclear", 3, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("aboveleft", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("all", 2, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("amenu", 2, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("anoremenu", 2, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("args", 2, BANG | FILES | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("argadd", 4, BANG | NEEDARG | RANGE | NOTADR | ZEROR | FILES | TRLBAR, Common),
    cmd!("argdelete", 4, BANG | RANGE | NOTADR | FILES | TRLBAR, Common),
    cmd!("argdo", 5, BANG | NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("argedit", 4, BANG | NEEDARG | RANGE | NOTADR | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("argglobal", 4, BANG | FILES | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("arglocal", 4, BANG | FILES | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("argument", 4, BANG | RANGE | NOTADR | COUNT | EXTRA | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("ascii", 2, TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("autocmd", 2, BANG | EXTRA | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("augroup", 3, BANG | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("aunmenu", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("buffer", 1, BANG | RANGE | NOTADR | BUFNAME | BUFUNL | COUNT | EXTRA | TRLBAR, Common),
    cmd!("bNext", 2, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("ball", 2, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("badd", 3, NEEDARG | FILE1 | EDITCMD | TRLBAR | CMDWIN, Common),
    cmd!("bdelete", 2, BANG | RANGE | NOTADR | BUFNAME | COUNT | EXTRA | TRLBAR, Common),
    cmd!("behave", 2, NEEDARG | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("belowright", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("bfirst", 2, BANG | RANGE | NOTADR | TRLBAR, Common),
    cmd!("blast", 2, BANG | RANGE | NOTADR | TRLBAR, Common),
    cmd!("bmodified", 2, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("bnext", 2, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("botright", 2, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("bprevious", 2, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("brewind", 2, BANG | RANGE | NOTADR | TRLBAR, Common),
    cmd!("break", 4, TRLBAR | SBOXOK | CMDWIN, Break),
    cmd!("breakadd", 6, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("breakdel", 6, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("breaklist", 6, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("browse", 3, NEEDARG | EXTRA | NOTRLCOM | CMDWIN, Common),
    cmd!("bufdo", 5, BANG | NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("buffers", 7, BANG | TRLBAR | CMDWIN, Common),
    cmd!("bunload", 3, BANG | RANGE | NOTADR | BUFNAME | COUNT | EXTRA | TRLBAR, Common),
    cmd!("bwipeout", 2, BANG | RANGE | NOTADR | BUFNAME | BUFUNL | COUNT | EXTRA | TRLBAR, Common),
    cmd!("change", 1, BANG | WHOLEFOLD | RANGE | COUNT | TRLBAR | CMDWIN, Append),
    cmd!("cNext", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cNfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cabbrev", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cabclear", 4, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("caddbuffer", 3, RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("caddexpr", 5, NEEDARG | WORD1 | NOTRLCOM | TRLBAR, Common),
    cmd!("caddfile", 5, TRLBAR | FILE1, Common),
    cmd!("call", 3, RANGE | NEEDARG | EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Call),
    cmd!("catch", 3, EXTRA | SBOXOK | CMDWIN, Catch),
    cmd!("cbuffer", 2, BANG | RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("cc", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cclose", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("cd", 2, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("center", 2, TRLBAR | RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("cexpr", 3, NEEDARG | WORD1 | NOTRLCOM | TRLBAR | BANG, Common),
    cmd!("cfile", 2, TRLBAR | FILE1 | BANG, Common),
    cmd!("cfirst", 4, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cgetbuffer", 5, RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("cgetexpr", 5, NEEDARG | WORD1 | NOTRLCOM | TRLBAR, Common),
    cmd!("cgetfile", 2, TRLBAR | FILE1, Common),
    cmd!("changes", 7, TRLBAR | CMDWIN, Common),
    cmd!("chdir", 3, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("checkpath", 3, TRLBAR | BANG | CMDWIN, Common),
    cmd!("checktime", 6, RANGE | NOTADR | BUFNAME | COUNT | EXTRA | TRLBAR, Common),
    cmd!("clist", 2, BANG | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("clast", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("close", 3, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("cmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cmapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("cmenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cnext", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cnewer", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("cnfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cnoremap", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cnoreabbrev", 6, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cnoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("copy", 2, RANGE | WHOLEFOLD | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("colder", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("colorscheme", 4, WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("command", 3, EXTRA | BANG | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("comclear", 4, TRLBAR | CMDWIN, Common),
    cmd!("compiler", 4, BANG | EXTRA | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("continue", 3, TRLBAR | SBOXOK | CMDWIN, Continue),
    cmd!("confirm", 4, NEEDARG | EXTRA | NOTRLCOM | CMDWIN, Common),
    cmd!("copen", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("cprevious", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cpfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cquit", 2, TRLBAR | BANG, Common),
    cmd!("crewind", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("cscope", 2, EXTRA | NOTRLCOM | XFILE, Common),
    cmd!("cstag", 3, BANG | TRLBAR | WORD1, Common),
    cmd!("cunmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cunabbrev", 4, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("cwindow", 2, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("delete", 1, RANGE | WHOLEFOLD | REGSTR | COUNT | TRLBAR | CMDWIN, Common),
    cmd!("delmarks", 4, BANG | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("debug", 3, NEEDARG | EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Common),
    cmd!("debuggreedy", 6, RANGE | NOTADR | ZEROR | TRLBAR | CMDWIN, Common),
    cmd!("delcommand", 4, NEEDARG | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("delfunction", 4, NEEDARG | WORD1 | CMDWIN, DelFunction),
    cmd!("diffupdate", 3, BANG | TRLBAR, Common),
    cmd!("diffget", 5, RANGE | EXTRA | TRLBAR | MODIFY, Common),
    cmd!("diffoff", 5, BANG | TRLBAR, Common),
    cmd!("diffpatch", 5, EXTRA | FILE1 | TRLBAR | MODIFY, Common),
    cmd!("diffput", 6, RANGE | EXTRA | TRLBAR, Common),
    cmd!("diffsplit", 5, EXTRA | FILE1 | TRLBAR, Common),
    cmd!("diffthis", 5, TRLBAR, Common),
    cmd!("digraphs", 3, BANG | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("display", 2, EXTRA | NOTRLCOM | TRLBAR | CMDWIN, Common),
    cmd!("djump", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA, Common),
    cmd!("dlist", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("doautocmd", 2, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("doautoall", 7, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("drop", 2, FILES | EDITCMD | NEEDARG | ARGOPT | TRLBAR, Common),
    cmd!("dsearch", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("dsplit", 3, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA, Common),
    cmd!("edit", 1, BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("earlier", 2, TRLBAR | EXTRA | NOSPC | CMDWIN, Common),
    cmd!("echo", 2, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Echo),
    cmd!("echoerr", 5, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, EchoErr),
    cmd!("echohl", 5, EXTRA | TRLBAR | SBOXOK | CMDWIN, EchoHl),
    cmd!("echomsg", 5, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, EchoMsg),
    cmd!("echon", 5, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, EchoN),
    cmd!("else", 2, TRLBAR | SBOXOK | CMDWIN, Else),
    cmd!("elseif", 5, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, ElseIf),
    cmd!("emenu", 2, NEEDARG | EXTRA | TRLBAR | NOTRLCOM | RANGE | NOTADR | CMDWIN, Common),
    cmd!("endif", 2, TRLBAR | SBOXOK | CMDWIN, EndIf),
    cmd!("endfor", 5, TRLBAR | SBOXOK | CMDWIN, EndFor),
    cmd!("endfunction", 4, TRLBAR | CMDWIN, EndFunction),
    cmd!("endtry", 4, TRLBAR | SBOXOK | CMDWIN, EndTry),
    cmd!("endwhile", 4, TRLBAR | SBOXOK | CMDWIN, EndWhile),
    cmd!("enew", 3, BANG | TRLBAR, Common),
    cmd!("ex", 2, BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("execute", 3, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Execute),
    cmd!("exit", 3, RANGE | WHOLEFOLD | BANG | FILE1 | ARGOPT | DFLALL | TRLBAR, Common),
    cmd!("exusage", 3, TRLBAR, Common),
    cmd!("file", 1, RANGE | NOTADR | ZEROR | BANG | FILE1 | TRLBAR, Common),
    cmd!("files", 5, BANG | TRLBAR | CMDWIN, Common),
    cmd!("filetype", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("find", 3, RANGE | NOTADR | BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("finally", 4, TRLBAR | SBOXOK | CMDWIN, Finally),
    cmd!("finish", 4, TRLBAR | SBOXOK | CMDWIN, Finish),
    cmd!("first", 3, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("fixdel", 3, TRLBAR | CMDWIN, Common),
    cmd!("fold", 2, RANGE | WHOLEFOLD | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("foldclose", 5, RANGE | BANG | WHOLEFOLD | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("folddoopen", 5, RANGE | DFLALL | NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("folddoclosed", 7, RANGE | DFLALL | NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("foldopen", 5, RANGE | BANG | WHOLEFOLD | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("for", 3, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, For),
    cmd!("function", 2, EXTRA | BANG | CMDWIN, Function),
    cmd!("global", 1, RANGE | WHOLEFOLD | EXTRA | DFLALL | SBOXOK | CMDWIN, Common),
    cmd!("goto", 2, RANGE | NOTADR | COUNT | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("grep", 2, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("grepadd", 5, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("gui", 2, BANG | FILES | EDITCMD | ARGOPT | TRLBAR | CMDWIN, Common),
    cmd!("gvim", 2, BANG | FILES | EDITCMD | ARGOPT | TRLBAR | CMDWIN, Common),
    cmd!("help", 1, BANG | EXTRA | NOTRLCOM, Common),
    cmd!("helpfind", 5, EXTRA | NOTRLCOM, Common),
    cmd!("helpgrep", 5, EXTRA | NOTRLCOM | NEEDARG, Common),
    cmd!("helptags", 5, NEEDARG | FILES | TRLBAR | CMDWIN, Common),
    cmd!("highlight", 2, BANG | EXTRA | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("hide", 3, BANG | RANGE | NOTADR | COUNT | EXTRA | TRLBAR, Common),
    cmd!("history", 3, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("insert", 1, BANG | RANGE | TRLBAR | CMDWIN, Append),
    cmd!("iabbrev", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("iabclear", 4, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("if", 2, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, If),
    cmd!("ijump", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA, Common),
    cmd!("ilist", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("imap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("imapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("imenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("inoremap", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("inoreabbrev", 6, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("inoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("intro", 3, TRLBAR, Common),
    cmd!("isearch", 2, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("isplit", 3, BANG | RANGE | DFLALL | WHOLEFOLD | EXTRA, Common),
    cmd!("iunmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("iunabbrev", 4, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("iunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("join", 1, BANG | RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("jumps", 2, TRLBAR | CMDWIN, Common),
    cmd!("k", 1, RANGE | WORD1 | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("keepmarks", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("keepalt", 5, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("keepjumps", 5, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("keeppatterns", 5, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("list", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("lNext", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("lNfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("last", 2, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("language", 3, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("laddexpr", 3, NEEDARG | WORD1 | NOTRLCOM | TRLBAR, Common),
    cmd!("laddbuffer", 5, RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("laddfile", 5, TRLBAR | FILE1, Common),
    cmd!("later", 3, TRLBAR | EXTRA | NOSPC | CMDWIN, Common),
    cmd!("lbuffer", 2, BANG | RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("lcd", 2, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("lchdir", 3, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("lclose", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("lcscope", 3, EXTRA | NOTRLCOM | XFILE, Common),
    cmd!("left", 2, TRLBAR | RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("leftabove", 5, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("let", 3, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Let),
    cmd!("lexpr", 3, NEEDARG | WORD1 | NOTRLCOM | TRLBAR | BANG, Common),
    cmd!("lfile", 2, TRLBAR | FILE1 | BANG, Common),
    cmd!("lfirst", 4, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("lgetbuffer", 5, RANGE | NOTADR | WORD1 | TRLBAR, Common),
    cmd!("lgetexpr", 5, NEEDARG | WORD1 | NOTRLCOM | TRLBAR, Common),
    cmd!("lgetfile", 2, TRLBAR | FILE1, Common),
    cmd!("lgrep", 3, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("lgrepadd", 6, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("lhelpgrep", 2, EXTRA | NOTRLCOM | NEEDARG, Common),
    cmd!("ll", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("llast", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("llist", 3, BANG | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("lmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("lmapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("lmake", 4, BANG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("lnoremap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("lnext", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("lnewer", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("lnfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("loadview", 2, FILE1 | TRLBAR, Common),
    cmd!("loadkeymap", 5, CMDWIN, LoadKeymap),
    cmd!("lockmarks", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("lockvar", 5, BANG | EXTRA | NEEDARG | SBOXOK | CMDWIN, LockVar),
    cmd!("lolder", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("lopen", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("lprevious", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("lpfile", 3, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("lrewind", 2, RANGE | NOTADR | COUNT | TRLBAR | BANG, Common),
    cmd!("ls", 2, BANG | TRLBAR | CMDWIN, Common),
    cmd!("ltag", 2, NOTADR | TRLBAR | BANG | WORD1, Common),
    cmd!("lunmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("lua", 3, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("luado", 4, RANGE | DFLALL | EXTRA | NEEDARG | CMDWIN, Common),
    cmd!("luafile", 4, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("lvimgrep", 2, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("lvimgrepadd", 9, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("lwindow", 2, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("move", 1, RANGE | WHOLEFOLD | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("mark", 2, RANGE | WORD1 | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("make", 3, BANG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("map", 3, BANG | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("mapclear", 4, EXTRA | BANG | TRLBAR | CMDWIN, Common),
    cmd!("marks", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("match", 3, RANGE | NOTADR | EXTRA | CMDWIN, Common),
    cmd!("menu", 2, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("menutranslate", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("messages", 3, TRLBAR | CMDWIN, Common),
    cmd!("mkexrc", 2, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("mksession", 3, BANG | FILE1 | TRLBAR, Common),
    cmd!("mkspell", 4, BANG | EXTRA | NOTRLCOM | TRLBAR, Common),
    cmd!("mkvimrc", 3, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("mkview", 5, BANG | FILE1 | TRLBAR, Common),
    cmd!("mode", 3, WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("mzscheme", 2, RANGE | EXTRA | DFLALL | NEEDARG | CMDWIN | SBOXOK, Script),
    cmd!("mzfile", 3, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("next", 1, RANGE | NOTADR | BANG | FILES | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("nbclose", 3, TRLBAR | CMDWIN, Common),
    cmd!("nbkey", 2, EXTRA | NOTADR | NEEDARG, Common),
    cmd!("nbstart", 3, WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("new", 3, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("nmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("nmapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("nmenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("nnoremap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("nnoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("noautocmd", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("noremap", 2, BANG | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("nohlsearch", 3, TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("noreabbrev", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("noremenu", 6, RANGE | NOTADR | ZEROR | BANG | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("normal", 4, RANGE | BANG | EXTRA | NEEDARG | NOTRLCOM | USECTRLV | SBOXOK | CMDWIN, Common),
    cmd!("noswapfile", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("number", 2, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("nunmap", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("nunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("open", 1, RANGE | BANG | EXTRA, Common),
    cmd!("oldfiles", 2, BANG | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("omap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("omapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("omenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("only", 2, BANG | TRLBAR, Common),
    cmd!("onoremap", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("onoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("options", 3, TRLBAR, Common),
    cmd!("ounmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("ounmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("ownsyntax", 2, EXTRA | NOTRLCOM, Common),
    cmd!("print", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN | SBOXOK, Common),
    cmd!("pclose", 2, BANG | TRLBAR, Common),
    cmd!("pedit", 3, BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("perl", 2, RANGE | EXTRA | DFLALL | NEEDARG | SBOXOK | CMDWIN, Script),
    cmd!("perldo", 5, RANGE | EXTRA | DFLALL | NEEDARG | CMDWIN, Common),
    cmd!("pop", 2, RANGE | NOTADR | BANG | COUNT | TRLBAR | ZEROR, Common),
    cmd!("popup", 4, NEEDARG | EXTRA | BANG | TRLBAR | NOTRLCOM | CMDWIN, Common),
    cmd!("ppop", 2, RANGE | NOTADR | BANG | COUNT | TRLBAR | ZEROR, Common),
    cmd!("preserve", 3, TRLBAR, Common),
    cmd!("previous", 4, EXTRA | RANGE | NOTADR | COUNT | BANG | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("promptfind", 3, EXTRA | NOTRLCOM | CMDWIN, Common),
    cmd!("promptrepl", 7, EXTRA | NOTRLCOM | CMDWIN, Common),
    cmd!("profile", 4, BANG | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("profdel", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("psearch", 2, BANG | RANGE | WHOLEFOLD | DFLALL | EXTRA, Common),
    cmd!("ptag", 2, RANGE | NOTADR | BANG | WORD1 | TRLBAR | ZEROR, Common),
    cmd!("ptNext", 3, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("ptfirst", 3, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("ptjump", 3, BANG | TRLBAR | WORD1, Common),
    cmd!("ptlast", 3, BANG | TRLBAR, Common),
    cmd!("ptnext", 3, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("ptprevious", 3, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("ptrewind", 3, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("ptselect", 3, BANG | TRLBAR | WORD1, Common),
    cmd!("put", 2, RANGE | WHOLEFOLD | BANG | REGSTR | TRLBAR | ZEROR | CMDWIN | MODIFY, Common),
    cmd!("pwd", 2, TRLBAR | CMDWIN, Common),
    cmd!("py3", 3, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("python3", 7, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("py3file", 4, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("py3do", 4, RANGE | DFLALL | EXTRA | NEEDARG | CMDWIN, Common),
    cmd!("python", 2, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("pyfile", 3, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("pydo", 3, RANGE | DFLALL | EXTRA | NEEDARG | CMDWIN, Common),
    cmd!("quit", 1, BANG | RANGE | COUNT | NOTADR | TRLBAR | CMDWIN, Common),
    cmd!("quitall", 5, BANG | TRLBAR, Common),
    cmd!("qall", 2, BANG | TRLBAR | CMDWIN, Common),
    cmd!("read", 1, BANG | RANGE | WHOLEFOLD | FILE1 | ARGOPT | TRLBAR | ZEROR | CMDWIN | MODIFY, Common),
    cmd!("recover", 3, BANG | FILE1 | TRLBAR, Common),
    cmd!("redo", 3, TRLBAR | CMDWIN, Common),
    cmd!("redir", 4, BANG | FILES | TRLBAR | CMDWIN, Common),
    cmd!("redraw", 4, BANG | TRLBAR | CMDWIN, Common),
    cmd!("redrawstatus", 7, BANG | TRLBAR | CMDWIN, Common),
    cmd!("registers", 3, EXTRA | NOTRLCOM | TRLBAR | CMDWIN, Common),
    cmd!("resize", 3, RANGE | NOTADR | TRLBAR | WORD1 | CMDWIN, Common),
    cmd!("retab", 3, TRLBAR | RANGE | WHOLEFOLD | DFLALL | BANG | WORD1 | CMDWIN | MODIFY, Common),
    cmd!("return", 4, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Return),
    cmd!("rewind", 3, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("right", 2, TRLBAR | RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("rightbelow", 6, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("ruby", 3, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("rubydo", 5, RANGE | DFLALL | EXTRA | NEEDARG | CMDWIN, Common),
    cmd!("rubyfile", 5, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("rundo", 4, NEEDARG | FILE1, Common),
    cmd!("runtime", 2, BANG | NEEDARG | FILES | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("rviminfo", 2, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("substitute", 1, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("sNext", 2, EXTRA | RANGE | NOTADR | COUNT | BANG | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("sandbox", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("sargument", 2, BANG | RANGE | NOTADR | COUNT | EXTRA | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("sall", 3, BANG | RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("saveas", 3, BANG | DFLALL | FILE1 | ARGOPT | CMDWIN | TRLBAR, Common),
    cmd!("sbuffer", 2, BANG | RANGE | NOTADR | BUFNAME | BUFUNL | COUNT | EXTRA | TRLBAR, Common),
    cmd!("sbNext", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sball", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sbfirst", 3, TRLBAR, Common),
    cmd!("sblast", 3, TRLBAR, Common),
    cmd!("sbmodified", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sbnext", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sbprevious", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sbrewind", 3, TRLBAR, Common),
    cmd!("scriptnames", 3, BANG | RANGE | NOTADR | COUNT | TRLBAR | CMDWIN, Common),
    cmd!("scriptencoding", 7, WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("scscope", 3, EXTRA | NOTRLCOM, Common),
    cmd!("set", 2, TRLBAR | EXTRA | CMDWIN | SBOXOK, Common),
    cmd!("setfiletype", 4, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("setglobal", 4, TRLBAR | EXTRA | CMDWIN | SBOXOK, Common),
    cmd!("setlocal", 4, TRLBAR | EXTRA | CMDWIN | SBOXOK, Common),
    cmd!("sfind", 2, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("sfirst", 4, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("shell", 2, TRLBAR | CMDWIN, Common),
    cmd!("simalt", 3, NEEDARG | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("sign", 3, NEEDARG | RANGE | NOTADR | EXTRA | CMDWIN, Common),
    cmd!("silent", 3, NEEDARG | EXTRA | BANG | NOTRLCOM | SBOXOK | CMDWIN, Common),
    cmd!("sleep", 2, RANGE | NOTADR | COUNT | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("slast", 3, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("smagic", 2, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("smap", 4, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("smapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("smenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("smile", 3, TRLBAR | CMDWIN | SBOXOK, Common),
    cmd!("snext", 2, RANGE | NOTADR | BANG | FILES | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("sniff", 3, EXTRA | TRLBAR, Common),
    cmd!("snomagic", 3, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("snoremap", 4, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("snoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("sort", 3, RANGE | DFLALL | WHOLEFOLD | BANG | EXTRA | NOTRLCOM | MODIFY, Common),
    cmd!("source", 2, BANG | FILE1 | TRLBAR | SBOXOK | CMDWIN, Common),
    cmd!("spelldump", 6, BANG | TRLBAR, Common),
    cmd!("spellgood", 3, BANG | RANGE | NOTADR | NEEDARG | EXTRA | TRLBAR, Common),
    cmd!("spellinfo", 6, TRLBAR, Common),
    cmd!("spellrepall", 6, TRLBAR, Common),
    cmd!("spellundo", 6, BANG | RANGE | NOTADR | NEEDARG | EXTRA | TRLBAR, Common),
    cmd!("spellwrong", 6, BANG | RANGE | NOTADR | NEEDARG | EXTRA | TRLBAR, Common),
    cmd!("split", 2, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("sprevious", 3, EXTRA | RANGE | NOTADR | COUNT | BANG | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("srewind", 3, EXTRA | BANG | EDITCMD | TRLBAR, Common),
    cmd!("stop", 2, TRLBAR | BANG | CMDWIN, Common),
    cmd!("stag", 3, RANGE | NOTADR | BANG | WORD1 | TRLBAR | ZEROR, Common),
    cmd!("startinsert", 4, BANG | TRLBAR | CMDWIN, Common),
    cmd!("startgreplace", 6, BANG | TRLBAR | CMDWIN, Common),
    cmd!("startreplace", 6, BANG | TRLBAR | CMDWIN, Common),
    cmd!("stopinsert", 5, BANG | TRLBAR | CMDWIN, Common),
    cmd!("stjump", 3, BANG | TRLBAR | WORD1, Common),
    cmd!("stselect", 3, BANG | TRLBAR | WORD1, Common),
    cmd!("sunhide", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("sunmap", 4, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("sunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("suspend", 3, TRLBAR | BANG | CMDWIN, Common),
    cmd!("sview", 2, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("swapname", 2, TRLBAR | CMDWIN, Common),
    cmd!("syntax", 2, EXTRA | NOTRLCOM | CMDWIN, Syntax),
    cmd!("syntime", 7, NEEDARG | WORD1 | TRLBAR | CMDWIN, Common),
    cmd!("syncbind", 4, TRLBAR, Common),
    cmd!("t", 1, RANGE | WHOLEFOLD | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("tNext", 2, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("tabNext", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("tabclose", 4, RANGE | NOTADR | COUNT | BANG | TRLBAR, Common),
    cmd!("tabdo", 4, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("tabedit", 4, BANG | FILE1 | RANGE | NOTADR | ZEROR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("tabfind", 4, BANG | FILE1 | RANGE | NOTADR | ZEROR | EDITCMD | ARGOPT | NEEDARG | TRLBAR, Common),
    cmd!("tabfirst", 6, TRLBAR, Common),
    cmd!("tablast", 4, TRLBAR, Common),
    cmd!("tabmove", 4, RANGE | NOTADR | ZEROR | EXTRA | NOSPC | TRLBAR, Common),
    cmd!("tabnew", 6, BANG | FILE1 | RANGE | NOTADR | ZEROR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("tabnext", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("tabonly", 4, BANG | TRLBAR, Common),
    cmd!("tabprevious", 4, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("tabrewind", 4, TRLBAR, Common),
    cmd!("tabs", 4, TRLBAR | CMDWIN, Common),
    cmd!("tab", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("tag", 2, RANGE | NOTADR | BANG | WORD1 | TRLBAR | ZEROR, Common),
    cmd!("tags", 4, TRLBAR | CMDWIN, Common),
    cmd!("tcl", 2, RANGE | EXTRA | NEEDARG | CMDWIN, Script),
    cmd!("tcldo", 4, RANGE | DFLALL | EXTRA | NEEDARG | CMDWIN, Common),
    cmd!("tclfile", 4, RANGE | FILE1 | NEEDARG | CMDWIN, Common),
    cmd!("tearoff", 2, NEEDARG | EXTRA | TRLBAR | NOTRLCOM | CMDWIN, Common),
    cmd!("tfirst", 2, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("throw", 2, EXTRA | NEEDARG | SBOXOK | CMDWIN, Throw),
    cmd!("tjump", 2, BANG | TRLBAR | WORD1, Common),
    cmd!("tlast", 2, BANG | TRLBAR, Common),
    cmd!("tmenu", 2, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("tnext", 2, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("topleft", 2, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("tprevious", 2, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("trewind", 2, RANGE | NOTADR | BANG | TRLBAR | ZEROR, Common),
    cmd!("try", 3, TRLBAR | SBOXOK | CMDWIN, Try),
    cmd!("tselect", 2, BANG | TRLBAR | WORD1, Common),
    cmd!("tunmenu", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("undo", 1, RANGE | NOTADR | COUNT | ZEROR | TRLBAR | CMDWIN, Common),
    cmd!("undojoin", 5, TRLBAR | CMDWIN, Common),
    cmd!("undolist", 5, TRLBAR | CMDWIN, Common),
    cmd!("unabbreviate", 3, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("unhide", 3, RANGE | NOTADR | COUNT | TRLBAR, Common),
    cmd!("unlet", 3, BANG | EXTRA | NEEDARG | SBOXOK | CMDWIN, UnLet),
    cmd!("unlockvar", 4, BANG | EXTRA | NEEDARG | SBOXOK | CMDWIN, UnLockVar),
    cmd!("unmap", 3, BANG | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("unmenu", 4, BANG | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("unsilent", 3, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("update", 2, RANGE | WHOLEFOLD | BANG | FILE1 | ARGOPT | DFLALL | TRLBAR, Common),
    cmd!("vglobal", 1, RANGE | WHOLEFOLD | EXTRA | DFLALL | CMDWIN, Common),
    cmd!("version", 2, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("verbose", 4, NEEDARG | RANGE | NOTADR | EXTRA | NOTRLCOM | SBOXOK | CMDWIN, Common),
    cmd!("vertical", 4, NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("vimgrep", 3, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("vimgrepadd", 8, RANGE | NOTADR | BANG | NEEDARG | EXTRA | NOTRLCOM | TRLBAR | XFILE, Common),
    cmd!("visual", 2, BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("viusage", 3, TRLBAR, Common),
    cmd!("view", 3, BANG | FILE1 | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("vmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("vmapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("vmenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("vnew", 3, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("vnoremap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("vnoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("vsplit", 2, BANG | FILE1 | RANGE | NOTADR | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("vunmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("vunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("write", 1, RANGE | WHOLEFOLD | BANG | FILE1 | ARGOPT | DFLALL | TRLBAR | CMDWIN, Common),
    cmd!("wNext", 2, RANGE | WHOLEFOLD | NOTADR | BANG | FILE1 | ARGOPT | TRLBAR, Common),
    cmd!("wall", 2, BANG | TRLBAR | CMDWIN, Common),
    cmd!("while", 2, EXTRA | NOTRLCOM | SBOXOK | CMDWIN, While),
    cmd!("winsize", 2, EXTRA | NEEDARG | TRLBAR, Common),
    cmd!("wincmd", 4, NEEDARG | WORD1 | RANGE | NOTADR, Wincmd),
    cmd!("windo", 5, BANG | NEEDARG | EXTRA | NOTRLCOM, Common),
    cmd!("winpos", 4, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("wnext", 2, RANGE | NOTADR | BANG | FILE1 | ARGOPT | TRLBAR, Common),
    cmd!("wprevious", 2, RANGE | NOTADR | BANG | FILE1 | ARGOPT | TRLBAR, Common),
    cmd!("wq", 2, RANGE | WHOLEFOLD | BANG | FILE1 | ARGOPT | DFLALL | TRLBAR, Common),
    cmd!("wqall", 3, BANG | FILE1 | ARGOPT | DFLALL | TRLBAR, Common),
    cmd!("wsverb", 2, EXTRA | NOTADR | NEEDARG, Common),
    cmd!("wundo", 2, BANG | NEEDARG | FILE1, Common),
    cmd!("wviminfo", 2, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("xit", 1, RANGE | WHOLEFOLD | BANG | FILE1 | ARGOPT | DFLALL | TRLBAR, Common),
    cmd!("xall", 2, BANG | TRLBAR, Common),
    cmd!("xmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("xmapclear", 5, EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("xmenu", 3, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("xnoremap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("xnoremenu", 7, RANGE | NOTADR | ZEROR | EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("xunmap", 2, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("xunmenu", 5, EXTRA | TRLBAR | NOTRLCOM | USECTRLV | CMDWIN, Common),
    cmd!("yank", 1, RANGE | WHOLEFOLD | REGSTR | COUNT | TRLBAR | CMDWIN, Common),
    cmd!("z", 1, RANGE | WHOLEFOLD | EXTRA | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("!", 1, RANGE | WHOLEFOLD | BANG | FILES | CMDWIN, Common),
    cmd!("#", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("&", 1, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("*", 1, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
    cmd!("<", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("=", 1, RANGE | TRLBAR | DFLALL | EXFLAGS | CMDWIN, Common),
    cmd!(">", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("@", 1, RANGE | WHOLEFOLD | EXTRA | TRLBAR | CMDWIN, Common),
    cmd!("Next", 1, EXTRA | RANGE | NOTADR | COUNT | BANG | EDITCMD | ARGOPT | TRLBAR, Common),
    cmd!("Print", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("X", 1, TRLBAR, Common),
    cmd!("~", 1, RANGE | WHOLEFOLD | EXTRA | CMDWIN, Common),
];

/// Commands only present in the neovim dialect.
#[rustfmt::skip]
pub static NEOVIM_ADDITIONAL_COMMANDS: &[CommandEntry] = &[
    cmd!("rshada", 3, BANG | FILE1 | TRLBAR | CMDWIN, Common),
    cmd!("wshada", 3, BANG | FILE1 | TRLBAR | CMDWIN, Common),
];

/// Commands removed from the neovim dialect.
#[rustfmt::skip]
pub static NEOVIM_REMOVED_COMMANDS: &[CommandEntry] = &[
    cmd!("Print", 1, RANGE | WHOLEFOLD | COUNT | EXFLAGS | TRLBAR | CMDWIN, Common),
    cmd!("fixdel", 3, TRLBAR | CMDWIN, Common),
    cmd!("helpfind", 5, EXTRA | NOTRLCOM, Common),
    cmd!("open", 1, RANGE | BANG | EXTRA, Common),
    cmd!("shell", 2, TRLBAR | CMDWIN, Common),
    cmd!("smile", 3, TRLBAR | CMDWIN | SBOXOK, Common),
    cmd!("tearoff", 2, NEEDARG | EXTRA | TRLBAR | NOTRLCOM | CMDWIN, Common),
];

lazy_static! {
    /// Exact full-name index over the builtin table.
    static ref COMMAND_INDEX: HashMap<&'static str, &'static CommandEntry> = {
        let mut m = HashMap::new();
        for entry in BUILTIN_COMMANDS {
            m.insert(entry.name, entry);
        }
        m
    };
}

/// Outcome of resolving a command word against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(&'static CommandEntry),
    /// Two entries accept the prefix and neither is an exact match.
    Ambiguous(&'static str, &'static str),
    NotFound,
}

fn accepts(entry: &CommandEntry, name: &str) -> bool {
    entry.name.starts_with(name) && name.len() >= entry.minlen
}

/// Resolve a command word. An exact full-name match is preferred over any
/// abbreviation; otherwise the prefix must satisfy exactly one entry.
pub fn lookup(name: &str, neovim: bool) -> Lookup {
    if name.is_empty() {
        return Lookup::NotFound;
    }
    let mut found = if let Some(entry) = COMMAND_INDEX.get(name) {
        Lookup::Found(entry)
    } else {
        let mut candidates = BUILTIN_COMMANDS.iter().filter(|e| accepts(e, name));
        match (candidates.next(), candidates.next()) {
            (Some(a), Some(b)) => Lookup::Ambiguous(a.name, b.name),
            (Some(a), None) => Lookup::Found(a),
            (None, _) => Lookup::NotFound,
        }
    };
    if neovim {
        if let Some(entry) = NEOVIM_ADDITIONAL_COMMANDS.iter().find(|e| accepts(e, name)) {
            found = Lookup::Found(entry);
        }
        if NEOVIM_REMOVED_COMMANDS.iter().any(|e| accepts(e, name)) {
            found = Lookup::NotFound;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins() {
        match lookup("for", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "for"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn test_abbreviation() {
        match lookup("fu", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "function"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
        match lookup("ec", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "echo"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn test_below_minlen_not_accepted() {
        // "endwhile" needs at least "endw"
        assert_ne!(
            lookup("end", false),
            Lookup::Found(COMMAND_INDEX["endwhile"]),
        );
        match lookup("end", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "endif"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn test_endf_prefers_endfunction() {
        match lookup("endf", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "endfunction"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
        match lookup("endfo", false) {
            Lookup::Found(entry) => assert_eq!(entry.name, "endfor"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown() {
        assert_eq!(lookup("hoge", false), Lookup::NotFound);
        assert_eq!(lookup("", false), Lookup::NotFound);
    }

    #[test]
    fn test_neovim_dialect() {
        assert_eq!(lookup("rshada", false), Lookup::NotFound);
        match lookup("rshada", true) {
            Lookup::Found(entry) => assert_eq!(entry.name, "rshada"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
        assert!(matches!(lookup("smile", false), Lookup::Found(_)));
        assert_eq!(lookup("smile", true), Lookup::NotFound);
    }

    #[test]
    fn test_minlens_are_unambiguous() {
        // every prefix of every command name resolves to at most one entry
        for entry in BUILTIN_COMMANDS {
            for len in entry.minlen..=entry.name.len() {
                let prefix = &entry.name[..len];
                match lookup(prefix, false) {
                    Lookup::Found(_) => {}
                    other => panic!("{:?} for prefix {:?}", other, prefix),
                }
            }
        }
    }
}
