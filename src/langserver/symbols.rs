//! Document symbols: top-level function definitions in a parsed file.

use crate::ast::types::{Expr, File, Stmt};
use crate::ast::walk::{walk, NodeRef};
use crate::langserver::{DocPosition, Location, Range, SymbolInformation, SymbolKind};

/// Collect `(name, kind, location)` for every named function definition,
/// outermost only: once a function is recorded its body is not descended
/// into. The range end column is start + name length; no attempt is made to
/// locate the true token span.
pub fn document_symbols(uri: &str, file: &File) -> Vec<SymbolInformation> {
    let mut symbols = Vec::new();
    walk(NodeRef::File(file), &mut |node| {
        if let NodeRef::Stmt(Stmt::Function(func)) = node {
            if let Expr::Ident(id) = &func.name {
                symbols.push(SymbolInformation {
                    name: id.name.clone(),
                    kind: SymbolKind::FUNCTION,
                    location: Location {
                        uri: uri.to_string(),
                        range: Range {
                            start: DocPosition {
                                line: id.pos.line - 1,
                                character: id.pos.column - 1,
                            },
                            end: DocPosition {
                                line: id.pos.line - 1,
                                character: id.pos.column + id.name.len() - 1,
                            },
                        },
                    },
                });
                return false;
            }
        }
        true
    });
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOption};

    fn symbols_of(src: &str) -> Vec<SymbolInformation> {
        let file = parse(src, &ParseOption::default()).unwrap();
        document_symbols("file:///t.vim", &file)
    }

    #[test]
    fn test_function_symbols() {
        let syms = symbols_of("function! Foo()\nendfunction\nfunction s:bar()\nendfunction");
        let names: Vec<&str> = syms.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "s:bar"]);
        assert!(syms.iter().all(|s| s.kind == SymbolKind::FUNCTION));
    }

    #[test]
    fn test_range_is_zero_based_and_name_sized() {
        let syms = symbols_of("function! Foo()\nendfunction");
        let range = syms[0].location.range;
        assert_eq!(range.start, DocPosition { line: 0, character: 10 });
        assert_eq!(range.end, DocPosition { line: 0, character: 13 });
    }

    #[test]
    fn test_nested_functions_not_listed() {
        let src = "function! Outer()\nfunction! Inner()\nendfunction\nendfunction";
        let syms = symbols_of(src);
        let names: Vec<&str> = syms.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Outer"]);
    }

    #[test]
    fn test_curly_name_functions_skipped() {
        let syms = symbols_of("function! s:f_{g:name}()\nendfunction");
        assert!(syms.is_empty());
    }
}
