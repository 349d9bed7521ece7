//! Type checking (pass 3): expression type inference and incompatibility checks

use thiserror::Error;

use super::scope::{ScopeCursor, ScopeId, ScopeTree, TypeCode};
use super::shape;
use crate::common::{AnalyzeError, AnalyzeResult};
use crate::tree::{NodeId, NodeLabel, ParseTree, Production, Terminal};

/// A type incompatibility found by the checker
///
/// The `Display` form is the user-facing message; repeated errors of the
/// same shape are all kept, in traversal order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("{rhs} number cannot be stored in {lhs} variable!")]
    IncompatibleAssignment { lhs: TypeCode, rhs: TypeCode },

    #[error("void type cannot be added or multiplied")]
    VoidOperand,

    #[error("{0} and {1} cannot be compared together")]
    IncomparableOperands(TypeCode, TypeCode),

    #[error("cannot increment or decrement 'void' type")]
    VoidIncrement,

    #[error("array index is not an integer")]
    NonIntegerIndex,
}

/// Infer the primitive type of an expression subtree
///
/// Pure function of the scope tree and the subtree: no analyzer state
/// changes, so check sites may re-infer the same node freely.
pub fn infer_type(tree: &ParseTree, scopes: &ScopeTree, scope: ScopeId, node: NodeId) -> TypeCode {
    match tree.label(node) {
        NodeLabel::Terminal(Terminal::Num(_) | Terminal::NumBin(_) | Terminal::NumHex(_)) => {
            TypeCode::Int
        }
        NodeLabel::Terminal(_) => TypeCode::Unknown,
        NodeLabel::Production(production) => match production {
            Production::Variable => shape::variable_name(tree, node)
                .and_then(|name| scopes.lookup(scope, name))
                .map_or(TypeCode::Unknown, super::scope::Symbol::first_type),
            // number -> NUM | NUM_BIN | NUM_HEX: int either way
            Production::Number => TypeCode::Int,
            Production::Value => first_child_type(tree, scopes, scope, node),
            Production::ArithExpr => {
                let kids = tree.children(node);
                if kids.len() > 1 {
                    let lhs = infer_type(tree, scopes, scope, kids[0]);
                    let rhs = operand_type(tree, scopes, scope, kids.get(2));
                    promote(lhs, rhs)
                } else {
                    first_child_type(tree, scopes, scope, node)
                }
            }
            Production::RelExpr => {
                let kids = tree.children(node);
                if kids.len() > 1 {
                    let lhs = infer_type(tree, scopes, scope, kids[0]);
                    let rhs = operand_type(tree, scopes, scope, kids.get(2));
                    if lhs == TypeCode::Void || rhs == TypeCode::Void {
                        TypeCode::Unknown
                    } else {
                        TypeCode::Int
                    }
                } else {
                    // A bare value in boolean context
                    TypeCode::Int
                }
            }
            Production::IncExpr => first_child_type(tree, scopes, scope, node),
            _ => TypeCode::Unknown,
        },
    }
}

/// Arithmetic promotion: float wins, int + int stays int, anything
/// involving void or unknown stays undetermined (flagged at check sites)
fn promote(lhs: TypeCode, rhs: TypeCode) -> TypeCode {
    if lhs == TypeCode::Float || rhs == TypeCode::Float {
        TypeCode::Float
    } else if lhs == TypeCode::Int && rhs == TypeCode::Int {
        TypeCode::Int
    } else {
        TypeCode::Unknown
    }
}

fn first_child_type(tree: &ParseTree, scopes: &ScopeTree, scope: ScopeId, node: NodeId) -> TypeCode {
    tree.children(node)
        .first()
        .map_or(TypeCode::Unknown, |&child| infer_type(tree, scopes, scope, child))
}

/// Second operand of a binary node (`lhs OP rhs` puts it at index 2)
fn operand_type(
    tree: &ParseTree,
    scopes: &ScopeTree,
    scope: ScopeId,
    node: Option<&NodeId>,
) -> TypeCode {
    node.map_or(TypeCode::Unknown, |&id| infer_type(tree, scopes, scope, id))
}

/// Assignment compatibility: int←int, float←float, and the int→float
/// widening. Everything else (float into int included) is an error.
fn assignable(lhs: TypeCode, rhs: TypeCode) -> bool {
    matches!(
        (lhs, rhs),
        (TypeCode::Int, TypeCode::Int)
            | (TypeCode::Float, TypeCode::Float)
            | (TypeCode::Float, TypeCode::Int)
    )
}

/// Re-walks the parse tree with the same cursor discipline as the resolver
/// and records a [`TypeError`] for every incompatibility
pub struct TypeChecker<'t> {
    tree: &'t ParseTree,
    scopes: &'t ScopeTree,
    cursor: ScopeCursor,
    errors: Vec<TypeError>,
}

impl<'t> TypeChecker<'t> {
    pub fn run(tree: &'t ParseTree, scopes: &'t ScopeTree) -> AnalyzeResult<Vec<TypeError>> {
        let mut checker = Self {
            tree,
            scopes,
            cursor: ScopeCursor::new(scopes),
            errors: Vec::new(),
        };
        if let Some(root) = tree.root() {
            checker.walk(root, ScopeId::ROOT)?;
        }
        Ok(checker.errors)
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
            Some(Production::AssignStmt) => self.check_assignment(node, next),
            Some(Production::ArithExpr) => self.check_arithmetic(node, next),
            Some(Production::RelExpr) => self.check_comparison(node, next),
            Some(Production::IncExpr) => self.check_increment(node, next),
            Some(Production::Variable) => self.check_array_index(node, next),
            _ => {}
        }
        for &child in self.tree.children(node) {
            self.walk(child, next)?;
        }
        Ok(())
    }

    /// `assign_stmt -> variable OP_ASSIGN al_expr`
    fn check_assignment(&mut self, node: NodeId, scope: ScopeId) {
        let kids = self.tree.children(node);
        let Some(&target) = kids.first() else { return };
        let lhs = infer_type(self.tree, self.scopes, scope, target);
        let rhs = operand_type(self.tree, self.scopes, scope, kids.get(2));
        if !assignable(lhs, rhs) {
            self.errors.push(TypeError::IncompatibleAssignment { lhs, rhs });
        }
    }

    fn check_arithmetic(&mut self, node: NodeId, scope: ScopeId) {
        let kids = self.tree.children(node);
        if kids.len() > 1 {
            let lhs = infer_type(self.tree, self.scopes, scope, kids[0]);
            let rhs = operand_type(self.tree, self.scopes, scope, kids.get(2));
            // int + float is allowed (promotes); only void operands are errors
            if lhs == TypeCode::Void || rhs == TypeCode::Void {
                self.errors.push(TypeError::VoidOperand);
            }
        }
    }

    fn check_comparison(&mut self, node: NodeId, scope: ScopeId) {
        let kids = self.tree.children(node);
        if kids.len() > 1 {
            let lhs = infer_type(self.tree, self.scopes, scope, kids[0]);
            let rhs = operand_type(self.tree, self.scopes, scope, kids.get(2));
            if lhs != rhs {
                self.errors.push(TypeError::IncomparableOperands(lhs, rhs));
            }
        }
    }

    fn check_increment(&mut self, node: NodeId, scope: ScopeId) {
        if first_child_type(self.tree, self.scopes, scope, node) == TypeCode::Void {
            self.errors.push(TypeError::VoidIncrement);
        }
    }

    /// `variable -> variable LBRACKET al_expr RBRACKET`: the index must be int
    fn check_array_index(&mut self, node: NodeId, scope: ScopeId) {
        if let Some(index) = shape::array_index(self.tree, node) {
            if infer_type(self.tree, self.scopes, scope, index) != TypeCode::Int {
                self.errors.push(TypeError::NonIntegerIndex);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::ScopeTreeBuilder;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> Vec<TypeError> {
        let tree = ParseTree::from_sexpr(source).unwrap();
        let (scopes, errors) = ScopeTreeBuilder::build(&tree);
        assert!(errors.is_empty());
        TypeChecker::run(&tree, &scopes).unwrap()
    }

    fn infer(source: &str) -> TypeCode {
        let tree = ParseTree::from_sexpr(source).unwrap();
        let scopes = ScopeTree::new();
        infer_type(&tree, &scopes, ScopeId::ROOT, tree.root().unwrap())
    }

    #[test]
    fn test_promotion_table() {
        assert_eq!(
            infer("(al_expr (value (number NUM:1)) OP_ADD:+ (value (number NUM:2)))"),
            TypeCode::Int
        );
        assert_eq!(promote(TypeCode::Int, TypeCode::Float), TypeCode::Float);
        assert_eq!(promote(TypeCode::Float, TypeCode::Float), TypeCode::Float);
        assert_eq!(promote(TypeCode::Void, TypeCode::Int), TypeCode::Unknown);
        assert_eq!(promote(TypeCode::Unknown, TypeCode::Int), TypeCode::Unknown);
    }

    #[test]
    fn test_literal_forms_are_int() {
        assert_eq!(infer("(number NUM_BIN:0b101)"), TypeCode::Int);
        assert_eq!(infer("(value (number NUM_HEX:0x1f))"), TypeCode::Int);
    }

    #[test]
    fn test_unary_rel_expr_is_int() {
        assert_eq!(infer("(rel_expr (value (number NUM:1)))"), TypeCode::Int);
    }

    #[test]
    fn test_unresolved_variable_is_unknown() {
        assert_eq!(infer("(variable ID:nowhere)"), TypeCode::Unknown);
    }

    #[test]
    fn test_float_into_int_assignment() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (statement (assign_stmt (variable ID:x) OP_ASSIGN:= \
                 (al_expr (variable ID:y))) SEMICOLON))",
        );
        assert_eq!(
            errors,
            vec![TypeError::IncompatibleAssignment {
                lhs: TypeCode::Int,
                rhs: TypeCode::Float,
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "float number cannot be stored in int variable!"
        );
    }

    #[test]
    fn test_int_into_float_assignment_is_fine() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (statement (assign_stmt (variable ID:y) OP_ASSIGN:= \
                 (al_expr (value (number NUM:3)))) SEMICOLON))",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_void_operand_in_arithmetic() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type VOID) (variable ID:v))) SEMICOLON) \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (assign_stmt (variable ID:x) OP_ASSIGN:= \
                 (al_expr (variable ID:v) OP_ADD:+ (variable ID:x))) SEMICOLON))",
        );
        // The void operand is flagged, and the promoted unknown result also
        // fails the assignment check
        assert_eq!(
            errors,
            vec![
                TypeError::IncompatibleAssignment {
                    lhs: TypeCode::Int,
                    rhs: TypeCode::Unknown,
                },
                TypeError::VoidOperand,
            ]
        );
    }

    #[test]
    fn test_mismatched_comparison() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (clause KW:if LPAREN (test_expr (rel_expr \
                 (rel_expr (value (variable ID:x))) OP_REL:< \
                 (rel_expr (value (variable ID:y))))) RPAREN))",
        );
        // Both nested rel_exprs are unary (int); the mismatch shows only if
        // the operands themselves differ, so compare values directly
        assert!(errors.is_empty());

        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (clause KW:if LPAREN (test_expr (rel_expr \
                 (value (variable ID:x)) OP_REL:< \
                 (value (variable ID:y)))) RPAREN))",
        );
        assert_eq!(
            errors,
            vec![TypeError::IncomparableOperands(TypeCode::Int, TypeCode::Float)]
        );
        assert_eq!(
            errors[0].to_string(),
            "int and float cannot be compared together"
        );
    }

    #[test]
    fn test_void_increment() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type VOID) (variable ID:v))) SEMICOLON) \
               (statement (inc_expr (variable ID:v) OP_INC:++) SEMICOLON))",
        );
        assert_eq!(errors, vec![TypeError::VoidIncrement]);
    }

    #[test]
    fn test_non_integer_array_index() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable (variable ID:a) \
                 LBRACKET (al_expr (value (number NUM:3))) RBRACKET))) SEMICOLON) \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (statement (inc_expr (variable (variable ID:a) \
                 LBRACKET (al_expr (variable ID:y)) RBRACKET)) SEMICOLON))",
        );
        assert_eq!(errors, vec![TypeError::NonIntegerIndex]);
        assert_eq!(errors[0].to_string(), "array index is not an integer");
    }

    #[test]
    fn test_repeated_type_errors_are_all_recorded() {
        let errors = check(
            "(body \
               (statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON) \
               (statement (decl_list (decl_init (type FLOAT) (variable ID:y))) SEMICOLON) \
               (statement (assign_stmt (variable ID:x) OP_ASSIGN:= \
                 (al_expr (variable ID:y))) SEMICOLON) \
               (statement (assign_stmt (variable ID:x) OP_ASSIGN:= \
                 (al_expr (variable ID:y))) SEMICOLON))",
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], errors[1]);
    }
}
