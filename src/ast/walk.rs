//! Generic AST traversal.
//!
//! `walk` visits every node in source order: statements in sequence order,
//! sub-expressions left to right, block bodies before their terminator. The
//! visitor returns `true` to descend into the node's children or `false` to
//! skip them. This mirrors how symbol indexing walks a file without the
//! parser knowing anything about symbols.

use crate::ast::types::*;

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    File(&'a File),
    Stmt(&'a Stmt),
    ElseIf(&'a ElseIf),
    Else(&'a Else),
    EndIf(&'a EndIf),
    EndWhile(&'a EndWhile),
    EndFor(&'a EndFor),
    EndFunction(&'a EndFunction),
    Catch(&'a Catch),
    Finally(&'a Finally),
    EndTry(&'a EndTry),
    Expr(&'a Expr),
    Ident(&'a Ident),
}

/// Walk `node` in source order, calling `visit` on every node. When `visit`
/// returns `false` the node's children are skipped.
pub fn walk<'a, F>(node: NodeRef<'a>, visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    if !visit(node) {
        return;
    }
    match node {
        NodeRef::File(file) => walk_body(&file.body, visit),
        NodeRef::Stmt(stmt) => walk_stmt(stmt, visit),
        NodeRef::ElseIf(clause) => {
            walk(NodeRef::Expr(&clause.cond), visit);
            walk_body(&clause.body, visit);
        }
        NodeRef::Else(clause) => walk_body(&clause.body, visit),
        NodeRef::Catch(clause) => walk_body(&clause.body, visit),
        NodeRef::Finally(clause) => walk_body(&clause.body, visit),
        NodeRef::EndIf(_)
        | NodeRef::EndWhile(_)
        | NodeRef::EndFor(_)
        | NodeRef::EndFunction(_)
        | NodeRef::EndTry(_)
        | NodeRef::Ident(_) => {}
        NodeRef::Expr(expr) => walk_expr(expr, visit),
    }
}

fn walk_body<'a, F>(body: &'a [Stmt], visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    for stmt in body {
        walk(NodeRef::Stmt(stmt), visit);
    }
}

fn walk_stmt<'a, F>(stmt: &'a Stmt, visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    match stmt {
        Stmt::Comment(_) | Stmt::Excmd(_) | Stmt::Continue(_) | Stmt::Break(_) => {}
        Stmt::Function(f) => {
            walk(NodeRef::Expr(&f.name), visit);
            for param in &f.params {
                walk(NodeRef::Ident(param), visit);
            }
            walk_body(&f.body, visit);
            walk(NodeRef::EndFunction(&f.endfunction), visit);
        }
        Stmt::DelFunction(d) => walk(NodeRef::Expr(&d.name), visit),
        Stmt::Return(r) => {
            if let Some(result) = &r.result {
                walk(NodeRef::Expr(result), visit);
            }
        }
        Stmt::ExCall(c) => {
            walk(NodeRef::Expr(&c.call.fun), visit);
            for arg in &c.call.args {
                walk(NodeRef::Expr(arg), visit);
            }
        }
        Stmt::Let(l) => {
            walk_lhs(&l.lhs, visit);
            walk(NodeRef::Expr(&l.right), visit);
        }
        Stmt::UnLet(u) => walk_exprs(&u.list, visit),
        Stmt::LockVar(l) => walk_exprs(&l.list, visit),
        Stmt::UnLockVar(u) => walk_exprs(&u.list, visit),
        Stmt::If(i) => {
            walk(NodeRef::Expr(&i.cond), visit);
            walk_body(&i.body, visit);
            for clause in &i.elseifs {
                walk(NodeRef::ElseIf(clause), visit);
            }
            if let Some(clause) = &i.else_clause {
                walk(NodeRef::Else(clause), visit);
            }
            walk(NodeRef::EndIf(&i.endif), visit);
        }
        Stmt::While(w) => {
            walk(NodeRef::Expr(&w.cond), visit);
            walk_body(&w.body, visit);
            walk(NodeRef::EndWhile(&w.endwhile), visit);
        }
        Stmt::For(f) => {
            walk_lhs(&f.lhs, visit);
            walk(NodeRef::Expr(&f.right), visit);
            walk_body(&f.body, visit);
            walk(NodeRef::EndFor(&f.endfor), visit);
        }
        Stmt::Try(t) => {
            walk_body(&t.body, visit);
            for clause in &t.catches {
                walk(NodeRef::Catch(clause), visit);
            }
            if let Some(clause) = &t.finally {
                walk(NodeRef::Finally(clause), visit);
            }
            walk(NodeRef::EndTry(&t.endtry), visit);
        }
        Stmt::Throw(t) => walk(NodeRef::Expr(&t.expr), visit),
        Stmt::Echo(e) => walk_exprs(&e.exprs, visit),
        Stmt::Echohl(_) => {}
        Stmt::Execute(e) => walk_exprs(&e.exprs, visit),
    }
}

fn walk_lhs<'a, F>(lhs: &'a LetLhs, visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    match lhs {
        LetLhs::Single(expr) => walk(NodeRef::Expr(expr), visit),
        LetLhs::List { items, rest } => {
            walk_exprs(items, visit);
            if let Some(rest) = rest {
                walk(NodeRef::Expr(rest), visit);
            }
        }
    }
}

fn walk_exprs<'a, F>(exprs: &'a [Expr], visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    for expr in exprs {
        walk(NodeRef::Expr(expr), visit);
    }
}

fn walk_expr<'a, F>(expr: &'a Expr, visit: &mut F)
where
    F: FnMut(NodeRef<'a>) -> bool,
{
    match expr {
        Expr::Ternary(t) => {
            walk(NodeRef::Expr(&t.cond), visit);
            walk(NodeRef::Expr(&t.left), visit);
            walk(NodeRef::Expr(&t.right), visit);
        }
        Expr::Binary(b) => {
            walk(NodeRef::Expr(&b.left), visit);
            walk(NodeRef::Expr(&b.right), visit);
        }
        Expr::Unary(u) => walk(NodeRef::Expr(&u.expr), visit),
        Expr::Subscript(s) => {
            walk(NodeRef::Expr(&s.left), visit);
            walk(NodeRef::Expr(&s.right), visit);
        }
        Expr::Slice(s) => {
            walk(NodeRef::Expr(&s.left), visit);
            if let Some(low) = &s.low {
                walk(NodeRef::Expr(low), visit);
            }
            if let Some(high) = &s.high {
                walk(NodeRef::Expr(high), visit);
            }
        }
        Expr::Call(c) => {
            walk(NodeRef::Expr(&c.fun), visit);
            walk_exprs(&c.args, visit);
        }
        Expr::Dot(d) => {
            walk(NodeRef::Expr(&d.left), visit);
            walk(NodeRef::Ident(&d.right), visit);
        }
        Expr::Lit(_) | Expr::Ident(_) => {}
        Expr::CurlyName(c) => {
            for part in &c.parts {
                if let CurlyNamePart::Expr(e) = part {
                    walk(NodeRef::Expr(&e.expr), visit);
                }
            }
        }
        Expr::List(l) => walk_exprs(&l.items, visit),
        Expr::Dict(d) => {
            for entry in &d.entries {
                walk(NodeRef::Expr(&entry.key), visit);
                walk(NodeRef::Expr(&entry.value), visit);
            }
        }
        Expr::Lambda(l) => {
            for param in &l.params {
                walk(NodeRef::Ident(param), visit);
            }
            walk(NodeRef::Expr(&l.expr), visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident { pos: Position::new(1, 1, 0), name: name.to_string() })
    }

    #[test]
    fn test_walk_expr_order() {
        // a + b visits binary, then a, then b
        let expr = Expr::Binary(Binary {
            pos: Position::new(1, 3, 2),
            op: BinaryOp::Add,
            left: Box::new(ident("a")),
            right: Box::new(ident("b")),
        });
        let mut names = Vec::new();
        walk(NodeRef::Expr(&expr), &mut |node| {
            if let NodeRef::Expr(Expr::Ident(id)) = node {
                names.push(id.name.clone());
            }
            true
        });
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_walk_skip_children() {
        let expr = Expr::Binary(Binary {
            pos: Position::new(1, 3, 2),
            op: BinaryOp::Add,
            left: Box::new(ident("a")),
            right: Box::new(ident("b")),
        });
        let mut count = 0;
        walk(NodeRef::Expr(&expr), &mut |_| {
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }
}
