//! Canonical Serializer
//!
//! Renders an AST into the deterministic parenthesized form used for
//! verification and tooling: one s-expression-like form per statement,
//! nested block bodies indented by two spaces, expressions as prefix forms.
//! Output depends only on the tree shape, never on the original source
//! formatting. `let x = 1` serializes to `(let = x 1)`.

use std::io;

use thiserror::Error;

use crate::ast::types::*;
use crate::ast::walk::NodeRef;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The node kind has no defined canonical form. This is a defect in the
    /// caller, never a problem with parsed input.
    #[error("unsupported node")]
    UnsupportedNode,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Serialize `node` into `out`. Fails only if the sink fails or the node
/// kind has no mapping.
pub fn compile<W: io::Write>(out: &mut W, node: NodeRef) -> Result<(), CompileError> {
    let text = compile_to_string(node)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Serialize `node` to a string.
pub fn compile_to_string(node: NodeRef) -> Result<String, CompileError> {
    let mut c = Compiler::new();
    match node {
        NodeRef::File(file) => {
            for stmt in &file.body {
                c.compile_stmt(stmt);
            }
            Ok(c.lines.join("\n"))
        }
        NodeRef::Stmt(stmt) => {
            c.compile_stmt(stmt);
            Ok(c.lines.join("\n"))
        }
        NodeRef::Expr(expr) => Ok(c.compile_expr(expr)),
        _ => Err(CompileError::UnsupportedNode),
    }
}

struct Compiler {
    lines: Vec<String>,
    indent: Vec<String>,
}

impl Compiler {
    fn new() -> Self {
        Self { lines: Vec::new(), indent: vec![String::new()] }
    }

    /// Emit one line at the current indent. A lone `)` is glued onto the
    /// previous line instead.
    fn out(&mut self, line: String) {
        if line.starts_with(')') {
            match self.lines.last_mut() {
                Some(last) => last.push_str(&line),
                None => self.lines.push(line),
            }
        } else {
            let prefix = self.indent.last().cloned().unwrap_or_default();
            self.lines.push(format!("{}{}", prefix, line));
        }
    }

    fn incindent(&mut self) {
        let next = format!("{}  ", self.indent.last().cloned().unwrap_or_default());
        self.indent.push(next);
    }

    fn decindent(&mut self) {
        self.indent.pop();
    }

    fn compile_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.compile_stmt(stmt);
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Comment(n) => self.out(format!(";{}", n.text)),
            Stmt::Excmd(n) => self.out(format!("(excmd \"{}\")", escape(&n.command))),
            Stmt::Function(n) => self.compile_function(n),
            Stmt::DelFunction(n) => {
                let name = self.compile_expr(&n.name);
                self.out(format!("(delfunction {})", name));
            }
            Stmt::Return(n) => match &n.result {
                Some(expr) => {
                    let expr = self.compile_expr(expr);
                    self.out(format!("(return {})", expr));
                }
                None => self.out("(return)".to_string()),
            },
            Stmt::ExCall(n) => {
                let call = self.compile_call(&n.call);
                self.out(format!("(call {})", call));
            }
            Stmt::Let(n) => {
                let lhs = self.compile_lhs(&n.lhs);
                let right = self.compile_expr(&n.right);
                self.out(format!("(let {} {} {})", n.op, lhs, right));
            }
            Stmt::UnLet(n) => {
                let list = self.compile_exprs(&n.list);
                self.out(format!("(unlet {})", list));
            }
            Stmt::LockVar(n) => {
                let list = self.compile_exprs(&n.list);
                match n.depth {
                    Some(depth) => self.out(format!("(lockvar {} {})", depth, list)),
                    None => self.out(format!("(lockvar {})", list)),
                }
            }
            Stmt::UnLockVar(n) => {
                let list = self.compile_exprs(&n.list);
                match n.depth {
                    Some(depth) => self.out(format!("(unlockvar {} {})", depth, list)),
                    None => self.out(format!("(unlockvar {})", list)),
                }
            }
            Stmt::If(n) => self.compile_if(n),
            Stmt::While(n) => {
                let cond = self.compile_expr(&n.cond);
                self.out(format!("(while {}", cond));
                self.incindent();
                self.compile_body(&n.body);
                self.out(")".to_string());
                self.decindent();
            }
            Stmt::For(n) => {
                let lhs = self.compile_lhs(&n.lhs);
                let right = self.compile_expr(&n.right);
                self.out(format!("(for {} {}", lhs, right));
                self.incindent();
                self.compile_body(&n.body);
                self.out(")".to_string());
                self.decindent();
            }
            Stmt::Continue(_) => self.out("(continue)".to_string()),
            Stmt::Break(_) => self.out("(break)".to_string()),
            Stmt::Try(n) => self.compile_try(n),
            Stmt::Throw(n) => {
                let expr = self.compile_expr(&n.expr);
                self.out(format!("(throw {})", expr));
            }
            Stmt::Echo(n) => {
                if n.exprs.is_empty() {
                    self.out(format!("({})", n.cmd.as_str()));
                } else {
                    let exprs = self.compile_exprs(&n.exprs);
                    self.out(format!("({} {})", n.cmd.as_str(), exprs));
                }
            }
            Stmt::Echohl(n) => self.out(format!("(echohl \"{}\")", escape(&n.name))),
            Stmt::Execute(n) => {
                if n.exprs.is_empty() {
                    self.out("(execute)".to_string());
                } else {
                    let exprs = self.compile_exprs(&n.exprs);
                    self.out(format!("(execute {})", exprs));
                }
            }
        }
    }

    fn compile_function(&mut self, n: &Function) {
        let name = self.compile_expr(&n.name);
        let mut params: Vec<String> = n.params.iter().map(|p| p.name.clone()).collect();
        if params.last().map(|p| p == "...").unwrap_or(false) {
            let last = params.len() - 1;
            params[last] = ". ...".to_string();
        }
        if params.is_empty() {
            self.out(format!("(function ({})", name));
        } else {
            self.out(format!("(function ({} {})", name, params.join(" ")));
        }
        self.incindent();
        self.compile_body(&n.body);
        self.out(")".to_string());
        self.decindent();
    }

    fn compile_if(&mut self, n: &If) {
        let cond = self.compile_expr(&n.cond);
        self.out(format!("(if {}", cond));
        self.incindent();
        self.compile_body(&n.body);
        self.decindent();
        for clause in &n.elseifs {
            let cond = self.compile_expr(&clause.cond);
            self.out(format!(" elseif {}", cond));
            self.incindent();
            self.compile_body(&clause.body);
            self.decindent();
        }
        if let Some(clause) = &n.else_clause {
            self.out(" else".to_string());
            self.incindent();
            self.compile_body(&clause.body);
            self.decindent();
        }
        self.incindent();
        self.out(")".to_string());
        self.decindent();
    }

    fn compile_try(&mut self, n: &Try) {
        self.out("(try".to_string());
        self.incindent();
        self.compile_body(&n.body);
        for clause in &n.catches {
            self.decindent();
            match &clause.pattern {
                Some(pattern) => self.out(format!(" catch /{}/", pattern)),
                None => self.out(" catch".to_string()),
            }
            self.incindent();
            self.compile_body(&clause.body);
        }
        if let Some(clause) = &n.finally {
            self.decindent();
            self.out(" finally".to_string());
            self.incindent();
            self.compile_body(&clause.body);
        }
        self.out(")".to_string());
        self.decindent();
    }

    fn compile_lhs(&mut self, lhs: &LetLhs) -> String {
        match lhs {
            LetLhs::Single(expr) => self.compile_expr(expr),
            LetLhs::List { items, rest } => {
                let items = self.compile_exprs(items);
                match rest {
                    Some(rest) => {
                        let rest = self.compile_expr(rest);
                        format!("({} . {})", items, rest)
                    }
                    None => format!("({})", items),
                }
            }
        }
    }

    fn compile_exprs(&mut self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| self.compile_expr(e))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn compile_call(&mut self, call: &Call) -> String {
        let fun = self.compile_expr(&call.fun);
        if call.args.is_empty() {
            format!("({})", fun)
        } else {
            let args = self.compile_exprs(&call.args);
            format!("({} {})", fun, args)
        }
    }

    fn compile_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Ternary(n) => {
                let cond = self.compile_expr(&n.cond);
                let left = self.compile_expr(&n.left);
                let right = self.compile_expr(&n.right);
                format!("(?: {} {} {})", cond, left, right)
            }
            Expr::Binary(n) => {
                let op = match n.op {
                    BinaryOp::Concat => "concat",
                    other => other.as_str(),
                };
                let left = self.compile_expr(&n.left);
                let right = self.compile_expr(&n.right);
                format!("({} {} {})", op, left, right)
            }
            Expr::Unary(n) => {
                let expr = self.compile_expr(&n.expr);
                format!("({} {})", n.op.as_str(), expr)
            }
            Expr::Subscript(n) => {
                let left = self.compile_expr(&n.left);
                let right = self.compile_expr(&n.right);
                format!("(subscript {} {})", left, right)
            }
            Expr::Slice(n) => {
                let left = self.compile_expr(&n.left);
                let low = match &n.low {
                    Some(low) => self.compile_expr(low),
                    None => "nil".to_string(),
                };
                let high = match &n.high {
                    Some(high) => self.compile_expr(high),
                    None => "nil".to_string(),
                };
                format!("(slice {} {} {})", left, low, high)
            }
            Expr::Call(n) => self.compile_call(n),
            Expr::Dot(n) => {
                let left = self.compile_expr(&n.left);
                format!("(dot {} {})", left, n.right.name)
            }
            Expr::Lit(n) => n.value.clone(),
            Expr::Ident(n) => n.name.clone(),
            Expr::CurlyName(n) => {
                let mut s = String::new();
                for part in &n.parts {
                    match part {
                        CurlyNamePart::Lit(lit) => s.push_str(&lit.value),
                        CurlyNamePart::Expr(e) => {
                            let inner = self.compile_expr(&e.expr);
                            s.push('{');
                            s.push_str(&inner);
                            s.push('}');
                        }
                    }
                }
                s
            }
            Expr::List(n) => {
                if n.items.is_empty() {
                    "(list)".to_string()
                } else {
                    let items = self.compile_exprs(&n.items);
                    format!("(list {})", items)
                }
            }
            Expr::Dict(n) => {
                if n.entries.is_empty() {
                    "(dict)".to_string()
                } else {
                    let entries = n
                        .entries
                        .iter()
                        .map(|kv| {
                            let key = self.compile_expr(&kv.key);
                            let value = self.compile_expr(&kv.value);
                            format!("({} {})", key, value)
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("(dict {})", entries)
                }
            }
            Expr::Lambda(n) => {
                let params: Vec<String> = n.params.iter().map(|p| p.name.clone()).collect();
                let expr = self.compile_expr(&n.expr);
                format!("(lambda ({}) {})", params.join(" "), expr)
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_expr, ParseOption};

    fn compile_src(src: &str) -> String {
        let file = parse(src, &ParseOption::default()).unwrap();
        compile_to_string(NodeRef::File(&file)).unwrap()
    }

    fn compile_expr_src(src: &str) -> String {
        let expr = parse_expr(src).unwrap();
        compile_to_string(NodeRef::Expr(&expr)).unwrap()
    }

    #[test]
    fn test_let_canonical_form() {
        assert_eq!(compile_src("let x = 1"), "(let = x 1)");
    }

    #[test]
    fn test_expr_canonical_form() {
        assert_eq!(compile_expr_src("x + 1"), "(+ x 1)");
    }

    #[test]
    fn test_operator_forms() {
        assert_eq!(compile_expr_src("a . b"), "(concat a b)");
        assert_eq!(compile_expr_src("a ==# b"), "(==# a b)");
        assert_eq!(compile_expr_src("a =~? b"), "(=~? a b)");
        assert_eq!(compile_expr_src("a isnot b"), "(isnot a b)");
        assert_eq!(compile_expr_src("a ? b : c"), "(?: a b c)");
        assert_eq!(compile_expr_src("!a"), "(! a)");
        assert_eq!(compile_expr_src("1 + 2 * 3"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn test_postfix_forms() {
        assert_eq!(compile_expr_src("x[1]"), "(subscript x 1)");
        assert_eq!(compile_expr_src("x[1 : 2]"), "(slice x 1 2)");
        assert_eq!(compile_expr_src("x[: 2]"), "(slice x nil 2)");
        assert_eq!(compile_expr_src("x[1 :]"), "(slice x 1 nil)");
        assert_eq!(compile_expr_src("f(1, 2)"), "(f 1 2)");
        assert_eq!(compile_expr_src("f()"), "(f)");
        assert_eq!(compile_expr_src("d.key"), "(dot d key)");
    }

    #[test]
    fn test_container_forms() {
        assert_eq!(compile_expr_src("[1, 2]"), "(list 1 2)");
        assert_eq!(compile_expr_src("[]"), "(list)");
        assert_eq!(compile_expr_src("{'a': 1}"), "(dict ('a' 1))");
        assert_eq!(compile_expr_src("{}"), "(dict)");
        assert_eq!(compile_expr_src("{x -> x + 1}"), "(lambda (x) (+ x 1))");
        assert_eq!(compile_expr_src("foo_{bar}"), "foo_{bar}");
    }

    #[test]
    fn test_literals_preserved() {
        assert_eq!(compile_expr_src("0x1F"), "0x1F");
        assert_eq!(compile_expr_src("007"), "007");
        assert_eq!(compile_expr_src("'it''s'"), "'it''s'");
        assert_eq!(compile_expr_src("\"a\\tb\""), "\"a\\tb\"");
        assert_eq!(compile_expr_src("&l:number"), "&l:number");
        assert_eq!(compile_expr_src("$HOME"), "$HOME");
        assert_eq!(compile_expr_src("@a"), "@a");
    }

    #[test]
    fn test_statement_forms() {
        assert_eq!(compile_src("unlet x y"), "(unlet x y)");
        assert_eq!(compile_src("lockvar 2 x"), "(lockvar 2 x)");
        assert_eq!(compile_src("throw 'err'"), "(throw 'err')");
        assert_eq!(compile_src("echo a b"), "(echo a b)");
        assert_eq!(compile_src("echomsg a"), "(echomsg a)");
        assert_eq!(compile_src("echohl WarningMsg"), "(echohl \"WarningMsg\")");
        assert_eq!(compile_src("execute a"), "(execute a)");
        assert_eq!(compile_src("call f(1)"), "(call (f 1))");
        assert_eq!(compile_src("let [a, b; c] = d"), "(let = (a b . c) d)");
        assert_eq!(compile_src("\" note"), "; note");
    }

    #[test]
    fn test_if_block_form() {
        let got = compile_src("if a\nlet x = 1\nelseif b\nlet x = 2\nelse\nlet x = 3\nendif");
        let want = "(if a\n  (let = x 1)\n elseif b\n  (let = x 2)\n else\n  (let = x 3))";
        assert_eq!(got, want);
    }

    #[test]
    fn test_while_block_form() {
        let got = compile_src("while a\ncall f()\nendwhile");
        assert_eq!(got, "(while a\n  (call (f)))");
    }

    #[test]
    fn test_try_block_form() {
        let got = compile_src("try\ncall f()\ncatch /E484/\necho 1\nfinally\necho 2\nendtry");
        let want = "(try\n  (call (f))\n catch /E484/\n  (echo 1)\n finally\n  (echo 2))";
        assert_eq!(got, want);
    }

    #[test]
    fn test_function_form() {
        let got = compile_src("function! F(a, ...)\nreturn a:a\nendfunction");
        assert_eq!(got, "(function (F a . ...)\n  (return a:a))");
    }

    #[test]
    fn test_excmd_escaped() {
        assert_eq!(compile_src("normal! \"xp"), "(excmd \"normal! \\\"xp\")");
    }

    #[test]
    fn test_deterministic() {
        let src = "if a\nlet x = [1, 2]\nendif\nlet y = x[0]";
        assert_eq!(compile_src(src), compile_src(src));
    }

    #[test]
    fn test_hand_built_tree_matches_parsed() {
        // serialization depends only on the tree shape, not on how the tree
        // was built
        let pos = Position::new(1, 1, 0);
        let stmt = Stmt::Let(Box::new(Let {
            pos,
            ea: ExArg::default(),
            op: "=".to_string(),
            lhs: LetLhs::Single(Expr::Ident(Ident { pos, name: "x".to_string() })),
            right: Expr::Lit(Lit {
                pos: Position::new(1, 9, 8),
                kind: LitKind::Number,
                value: "1".to_string(),
            }),
        }));
        let hand = compile_to_string(NodeRef::Stmt(&stmt)).unwrap();
        assert_eq!(hand, compile_src("let x = 1"));
    }

    #[test]
    fn test_unsupported_node() {
        let endif = EndIf { pos: Position::new(1, 1, 0), ea: ExArg::default() };
        assert!(matches!(
            compile_to_string(NodeRef::EndIf(&endif)),
            Err(CompileError::UnsupportedNode)
        ));
    }

    #[test]
    fn test_compile_writes_to_sink() {
        let file = parse("let x = 1", &ParseOption::default()).unwrap();
        let mut buf = Vec::new();
        compile(&mut buf, NodeRef::File(&file)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "(let = x 1)");
    }
}
