//! Scope resolution (pass 2): undefined-identifier detection

use std::collections::HashSet;

use super::scope::{ScopeCursor, ScopeId, ScopeTree};
use super::shape;
use crate::common::{AnalyzeError, AnalyzeResult};
use crate::tree::{NodeId, ParseTree, Production};

/// Re-walks the parse tree in lock-step with the scope tree and checks
/// every variable reference against the visible symbol chain
///
/// Undefined names are recorded once per distinct name, in first-occurrence
/// order; resolution failures never stop the traversal. Running out of
/// child scopes at a scope-introducing node means the tree does not match
/// the one the builder saw and is a hard error.
pub struct ScopeResolver<'t> {
    tree: &'t ParseTree,
    scopes: &'t ScopeTree,
    cursor: ScopeCursor,
    seen: HashSet<String>,
    undefined: Vec<String>,
}

impl<'t> ScopeResolver<'t> {
    pub fn run(tree: &'t ParseTree, scopes: &'t ScopeTree) -> AnalyzeResult<Vec<String>> {
        let mut resolver = Self {
            tree,
            scopes,
            cursor: ScopeCursor::new(scopes),
            seen: HashSet::new(),
            undefined: Vec::new(),
        };
        if let Some(root) = tree.root() {
            resolver.walk(root, ScopeId::ROOT)?;
        }
        Ok(resolver.undefined)
    }

    fn walk(&mut self, node: NodeId, scope: ScopeId) -> AnalyzeResult<()> {
        let mut next = scope;
        match self.tree.production_of(node) {
            Some(Production::FuncDef) => {
                next = self
                    .cursor
                    .descend(self.scopes, scope)
                    .ok_or(AnalyzeError::ScopeDesync { construct: "func_def" })?;
            }
            Some(Production::Clause) if shape::clause_has_body(self.tree, node) => {
                next = self
                    .cursor
                    .descend(self.scopes, scope)
                    .ok_or(AnalyzeError::ScopeDesync { construct: "clause" })?;
            }
            Some(Production::Variable) => {
                if let Some(name) = shape::variable_name(self.tree, node) {
                    if self.scopes.lookup(scope, name).is_none()
                        && self.seen.insert(name.to_owned())
                    {
                        self.undefined.push(name.to_owned());
                    }
                }
            }
            _ => {}
        }
        for &child in self.tree.children(node) {
            self.walk(child, next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::ScopeTreeBuilder;
    use pretty_assertions::assert_eq;

    fn resolve(source: &str) -> Vec<String> {
        let tree = ParseTree::from_sexpr(source).unwrap();
        let (scopes, errors) = ScopeTreeBuilder::build(&tree);
        assert!(errors.is_empty());
        ScopeResolver::run(&tree, &scopes).unwrap()
    }

    #[test]
    fn test_declared_names_resolve() {
        let undefined = resolve(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (assign_stmt (variable ID:x) OP_ASSIGN:= \
                 (al_expr (value (number NUM:1)))) SEMICOLON))",
        );
        assert!(undefined.is_empty());
    }

    #[test]
    fn test_undefined_name_reported_once() {
        let undefined = resolve(
            "(body \
               (statement (assign_stmt (variable ID:z) OP_ASSIGN:= \
                 (al_expr (variable ID:z))) SEMICOLON) \
               (statement (inc_expr (variable ID:w)) SEMICOLON))",
        );
        assert_eq!(undefined, vec!["z".to_owned(), "w".to_owned()]);
    }

    #[test]
    fn test_outer_declaration_visible_in_nested_scope() {
        let undefined = resolve(
            "(program \
               (define_header KW:define ID:LIMIT (number NUM:8)) \
               (func_def (type VOID) ID:main LPAREN (func_arg_dec) RPAREN LBRACE \
                 (body (clause KW:while LPAREN (test_expr (rel_expr (value (variable ID:LIMIT)))) \
                   RPAREN LBRACE (body (statement (inc_expr (variable ID:LIMIT)) SEMICOLON)) RBRACE)) \
                 RBRACE))",
        );
        assert!(undefined.is_empty());
    }

    #[test]
    fn test_inner_scope_names_not_visible_outside() {
        // i lives in the while-block scope; the second statement sits after
        // the clause, back in the function body scope
        let undefined = resolve(
            "(func_def (type VOID) ID:f LPAREN (func_arg_dec) RPAREN LBRACE \
               (body \
                 (clause KW:while LPAREN (test_expr) RPAREN LBRACE \
                   (body (statement (decl_list (decl_init (type INT) (variable ID:i))) SEMICOLON)) \
                 RBRACE) \
                 (statement (inc_expr (variable ID:i)) SEMICOLON)) \
             RBRACE)",
        );
        assert_eq!(undefined, vec!["i".to_owned()]);
    }

    #[test]
    fn test_rerun_with_fresh_cursor_is_idempotent() {
        let tree = ParseTree::from_sexpr(
            "(func_def (type VOID) ID:f LPAREN (func_arg_dec) RPAREN LBRACE \
               (body (statement (inc_expr (variable ID:ghost)) SEMICOLON)) RBRACE)",
        )
        .unwrap();
        let (scopes, _) = ScopeTreeBuilder::build(&tree);

        let first = ScopeResolver::run(&tree, &scopes).unwrap();
        let second = ScopeResolver::run(&tree, &scopes).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["ghost".to_owned()]);
    }

    #[test]
    fn test_foreign_tree_desynchronizes_cursor() {
        let built_from = ParseTree::from_sexpr("(body (statement))").unwrap();
        let (scopes, _) = ScopeTreeBuilder::build(&built_from);

        let foreign = ParseTree::from_sexpr(
            "(func_def (type VOID) ID:f LPAREN (func_arg_dec) RPAREN LBRACE (body) RBRACE)",
        )
        .unwrap();
        let err = ScopeResolver::run(&foreign, &scopes).unwrap_err();
        assert!(matches!(err, AnalyzeError::ScopeDesync { construct: "func_def" }));
    }
}
