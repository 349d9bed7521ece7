//! Scope tree construction (pass 1)

use super::scope::{ScopeId, ScopeTree, SymbolKind, TypeCode};
use super::shape;
use crate::common::AnalyzeError;
use crate::tree::{NodeId, ParseTree, Production, Terminal};

/// Builds the scope tree in a single traversal of the parse tree
///
/// Scope-introducing constructs (`func_def`, `clause` with a body) append a
/// child scope in visitation order; the re-traversal passes later replay
/// that order through their own cursor. Malformed declarations are recorded
/// as construction errors and skipped; construction always continues with
/// the remaining siblings.
pub struct ScopeTreeBuilder<'t> {
    tree: &'t ParseTree,
    scopes: ScopeTree,
    errors: Vec<AnalyzeError>,
}

impl<'t> ScopeTreeBuilder<'t> {
    pub fn build(tree: &'t ParseTree) -> (ScopeTree, Vec<AnalyzeError>) {
        let mut builder = Self {
            tree,
            scopes: ScopeTree::new(),
            errors: Vec::new(),
        };
        if let Some(root) = tree.root() {
            builder.walk(root, ScopeId::ROOT);
        }
        (builder.scopes, builder.errors)
    }

    fn walk(&mut self, node: NodeId, scope: ScopeId) {
        let mut next = scope;
        match self.tree.production_of(node) {
            Some(Production::DefineHeader) => self.define_header(node, scope),
            Some(Production::FuncDef) => next = self.func_def(node, scope),
            Some(Production::Clause) if shape::clause_has_body(self.tree, node) => {
                next = self.scopes.add_scope(scope);
            }
            Some(Production::Statement | Production::InitStmt | Production::UpdateStmt) => {
                if let Some(&first) = self.tree.children(node).first() {
                    if self.tree.is_production(first, Production::DeclList) {
                        self.declarations(first, scope, SymbolKind::Variable, None);
                    }
                }
            }
            _ => {}
        }
        // Children under the (possibly new) scope; the sibling loop of the
        // enclosing call keeps using the original scope
        for &child in self.tree.children(node) {
            self.walk(child, next);
        }
    }

    /// `define_header -> DEFINE ID number`: the constant is an int variable
    fn define_header(&mut self, node: NodeId, scope: ScopeId) {
        let ident = self.tree.children(node).iter().find_map(|&child| {
            match self.tree.terminal_of(child) {
                Some(Terminal::Ident(name)) => Some(name.clone()),
                _ => None,
            }
        });
        match ident {
            Some(name) => {
                self.scopes
                    .insert(scope, &name, SymbolKind::Variable, vec![TypeCode::Int]);
            }
            None => {
                self.errors
                    .push(AnalyzeError::construction("define directive missing identifier"));
            }
        }
    }

    /// `func_def -> type ID LPAREN func_arg_dec RPAREN LBRACE body RBRACE`
    ///
    /// The function symbol (`[return, params...]`) goes into the enclosing
    /// scope; the parameters go into a fresh child scope that also hosts the
    /// body. The child scope is created even for malformed definitions so
    /// the cursor order of later passes stays intact.
    fn func_def(&mut self, node: NodeId, scope: ScopeId) -> ScopeId {
        let kids = self.tree.children(node);

        let return_type = kids
            .iter()
            .find(|&&k| self.tree.is_production(k, Production::Type))
            .map_or(TypeCode::Unknown, |&k| shape::declared_type(self.tree, k));
        let name = kids.iter().find_map(|&k| match self.tree.terminal_of(k) {
            Some(Terminal::Ident(name)) => Some(name.clone()),
            _ => None,
        });

        let body_scope = self.scopes.add_scope(scope);

        let mut func_types = vec![return_type];
        let arg_list = kids
            .iter()
            .find(|&&k| self.tree.is_production(k, Production::FuncArgDec))
            .and_then(|&args| self.tree.children(args).first().copied());
        if let Some(list) = arg_list {
            if self.tree.is_production(list, Production::DeclList) {
                self.declarations(list, body_scope, SymbolKind::Parameter, Some(&mut func_types));
            }
        }

        match name {
            Some(name) => {
                self.scopes
                    .insert(scope, &name, SymbolKind::Function, func_types);
            }
            None => {
                self.errors
                    .push(AnalyzeError::construction("function definition missing name"));
            }
        }
        body_scope
    }

    /// `decl_list -> decl_init | decl_list COMMA variable | decl_list COMMA decl_init`
    ///
    /// Returns the base type threaded left-to-right: a bare `variable`
    /// continuation inherits the type of the nearest preceding typed
    /// declaration in the same list.
    fn declarations(
        &mut self,
        list: NodeId,
        scope: ScopeId,
        kind: SymbolKind,
        mut func_types: Option<&mut Vec<TypeCode>>,
    ) -> TypeCode {
        let kids = self.tree.children(list);
        let Some(&first) = kids.first() else {
            return TypeCode::Unknown;
        };

        if self.tree.is_production(first, Production::DeclInit) {
            return self.decl_init(first, scope, kind, func_types);
        }
        if self.tree.is_production(first, Production::DeclList) {
            let base = self.declarations(first, scope, kind, func_types.as_mut().map(|t| &mut **t));
            // Past the comma: a bare variable or a fresh decl_init
            let Some(&cont) = kids.get(2) else {
                self.errors
                    .push(AnalyzeError::construction("declaration list missing continuation"));
                return TypeCode::Unknown;
            };
            if self.tree.is_production(cont, Production::Variable) {
                if self.declare(cont, base, scope, kind, func_types) {
                    return base;
                }
                return TypeCode::Unknown;
            }
            if self.tree.is_production(cont, Production::DeclInit) {
                return self.decl_init(cont, scope, kind, func_types);
            }
        }
        TypeCode::Unknown
    }

    /// `decl_init -> type variable (OP_ASSIGN value)?`
    fn decl_init(
        &mut self,
        init: NodeId,
        scope: ScopeId,
        kind: SymbolKind,
        func_types: Option<&mut Vec<TypeCode>>,
    ) -> TypeCode {
        let kids = self.tree.children(init);
        let ty = match kids.first() {
            Some(&t) if self.tree.is_production(t, Production::Type) => {
                shape::declared_type(self.tree, t)
            }
            _ => TypeCode::Unknown,
        };
        match kids.get(1) {
            Some(&var) => {
                if self.declare(var, ty, scope, kind, func_types) {
                    ty
                } else {
                    TypeCode::Unknown
                }
            }
            None => {
                self.errors
                    .push(AnalyzeError::construction("declaration missing variable name"));
                TypeCode::Unknown
            }
        }
    }

    /// Register one declared name; false if the variable node carries no
    /// identifier (malformed shape)
    fn declare(
        &mut self,
        var: NodeId,
        ty: TypeCode,
        scope: ScopeId,
        kind: SymbolKind,
        func_types: Option<&mut Vec<TypeCode>>,
    ) -> bool {
        match shape::variable_name(self.tree, var) {
            Some(name) => {
                let name = name.to_owned();
                self.scopes.insert(scope, &name, kind, vec![ty]);
                if let Some(types) = func_types {
                    types.push(ty);
                }
                true
            }
            None => {
                self.errors
                    .push(AnalyzeError::construction("declaration missing variable name"));
                false
            }
        }
    }
}
