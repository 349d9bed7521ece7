//! Symbol table: the scope tree, its symbols, and the traversal cursor

use std::fmt;

use string_interner::{DefaultBackend, StringInterner};

/// Interned symbol name
pub type NameId = string_interner::DefaultSymbol;

/// Index of a scope in a [`ScopeTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global scope; always present
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Parameter,
    Variable,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "func",
            SymbolKind::Parameter => "param",
            SymbolKind::Variable => "var",
        }
    }
}

/// Primitive type of a MiniC expression or declaration
///
/// `Unknown` is an internal sentinel for types that could not be determined
/// (an unresolved identifier, an ill-typed operand). It is never a valid
/// promotion result; check sites treat it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Void,
    Int,
    Float,
    Unknown,
}

impl TypeCode {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeCode::Void => "void",
            TypeCode::Int => "int",
            TypeCode::Float => "float",
            TypeCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol table entry
///
/// `types` has length 1 for parameters and variables. For functions the
/// first entry is the return type, followed by the parameter types in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: NameId,
    pub kind: SymbolKind,
    pub types: Vec<TypeCode>,
}

impl Symbol {
    /// The declared type of a variable/parameter, or a function's return type
    pub fn first_type(&self) -> TypeCode {
        self.types.first().copied().unwrap_or(TypeCode::Unknown)
    }
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    symbols: Vec<Symbol>,
}

/// The scope tree built by the first analysis pass
///
/// Built once, then read-only: the re-traversal passes carry their own
/// [`ScopeCursor`] instead of mutating the tree.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    names: StringInterner<DefaultBackend>,
}

impl ScopeTree {
    /// Create a tree holding only the root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            names: StringInterner::default(),
        }
    }

    /// Append a new child scope under `parent`, preserving creation order
    pub fn add_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            children: Vec::new(),
            symbols: Vec::new(),
        });
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Insert a symbol declared directly in `scope`
    pub fn insert(&mut self, scope: ScopeId, name: &str, kind: SymbolKind, types: Vec<TypeCode>) {
        let name = self.names.get_or_intern(name);
        self.scopes[scope.index()].symbols.push(Symbol { name, kind, types });
    }

    /// Look up `name` starting at `scope` and walking outward through
    /// enclosing scopes. Within a scope the earliest matching entry wins;
    /// across scopes the innermost declaration shadows outer ones.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let name = self.names.get(name)?;
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.symbols.iter().find(|s| s.name == name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        &self.scopes[scope.index()].children
    }

    pub fn symbols(&self, scope: ScopeId) -> &[Symbol] {
        &self.scopes[scope.index()].symbols
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Resolve an interned name for display
    pub fn name(&self, id: NameId) -> &str {
        self.names.resolve(id).unwrap_or("?")
    }

    fn write_scope(&self, f: &mut fmt::Formatter<'_>, id: ScopeId) -> fmt::Result {
        let symbols = self.symbols(id);
        if !symbols.is_empty() {
            writeln!(f, "{:<10} | {:<7} | {}", "name", "kind", "type")?;
            writeln!(f, "-----------|---------|----------------------------------")?;
            for symbol in symbols {
                write!(f, "{:<10} | {:<7} | ", self.name(symbol.name), symbol.kind.as_str())?;
                if symbol.kind == SymbolKind::Function {
                    write!(f, "{} /", symbol.first_type())?;
                    for ty in symbol.types.iter().skip(1) {
                        write!(f, " {}", ty)?;
                    }
                } else {
                    write!(f, "{}", symbol.first_type())?;
                }
                writeln!(f)?;
            }
            writeln!(f, "-----------|---------|----------------------------------")?;
        }
        for &child in self.children(id) {
            self.write_scope(f, child)?;
        }
        Ok(())
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// One block of name/kind/type rows per non-empty scope, root first, then
/// child scopes recursively in creation order
impl fmt::Display for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_scope(f, ScopeId::ROOT)
    }
}

/// Per-pass cursor over a [`ScopeTree`]
///
/// Each re-traversal pass builds a fresh cursor at entry, so the
/// reset-between-passes protocol is structural: cursor state never outlives
/// a pass and never leaks into the next one.
#[derive(Debug)]
pub struct ScopeCursor {
    next_child: Vec<usize>,
}

impl ScopeCursor {
    pub fn new(scopes: &ScopeTree) -> Self {
        Self {
            next_child: vec![0; scopes.scope_count()],
        }
    }

    /// Advance to the next unvisited child of `scope`, in builder creation
    /// order. `None` means the walk has requested more child scopes than the
    /// builder created there — an internal-consistency failure for callers
    /// to surface.
    pub fn descend(&mut self, scopes: &ScopeTree, scope: ScopeId) -> Option<ScopeId> {
        let slot = &mut self.next_child[scope.index()];
        let child = scopes.children(scope).get(*slot).copied()?;
        *slot += 1;
        Some(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_enclosing_scopes() {
        let mut scopes = ScopeTree::new();
        scopes.insert(ScopeId::ROOT, "x", SymbolKind::Variable, vec![TypeCode::Int]);
        let inner = scopes.add_scope(ScopeId::ROOT);

        let found = scopes.lookup(inner, "x").unwrap();
        assert_eq!(found.kind, SymbolKind::Variable);
        assert_eq!(found.first_type(), TypeCode::Int);
        assert!(scopes.lookup(inner, "y").is_none());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let mut scopes = ScopeTree::new();
        scopes.insert(ScopeId::ROOT, "x", SymbolKind::Variable, vec![TypeCode::Int]);
        let inner = scopes.add_scope(ScopeId::ROOT);
        scopes.insert(inner, "x", SymbolKind::Variable, vec![TypeCode::Float]);

        assert_eq!(scopes.lookup(inner, "x").unwrap().first_type(), TypeCode::Float);
        assert_eq!(scopes.lookup(ScopeId::ROOT, "x").unwrap().first_type(), TypeCode::Int);
    }

    #[test]
    fn test_cursor_follows_creation_order_then_exhausts() {
        let mut scopes = ScopeTree::new();
        let a = scopes.add_scope(ScopeId::ROOT);
        let b = scopes.add_scope(ScopeId::ROOT);

        let mut cursor = ScopeCursor::new(&scopes);
        assert_eq!(cursor.descend(&scopes, ScopeId::ROOT), Some(a));
        assert_eq!(cursor.descend(&scopes, ScopeId::ROOT), Some(b));
        assert_eq!(cursor.descend(&scopes, ScopeId::ROOT), None);

        // A fresh cursor starts over
        let mut cursor = ScopeCursor::new(&scopes);
        assert_eq!(cursor.descend(&scopes, ScopeId::ROOT), Some(a));
    }

    #[test]
    fn test_table_prints_function_type_sequence() {
        let mut scopes = ScopeTree::new();
        scopes.insert(
            ScopeId::ROOT,
            "add",
            SymbolKind::Function,
            vec![TypeCode::Int, TypeCode::Int, TypeCode::Float],
        );
        let body = scopes.add_scope(ScopeId::ROOT);
        scopes.insert(body, "a", SymbolKind::Parameter, vec![TypeCode::Int]);

        let table = scopes.to_string();
        assert!(table.contains("add        | func    | int / int float"));
        assert!(table.contains("a          | param   | int"));
    }

    #[test]
    fn test_empty_scope_block_skipped_but_children_printed() {
        let mut scopes = ScopeTree::new();
        let empty = scopes.add_scope(ScopeId::ROOT);
        let inner = scopes.add_scope(empty);
        scopes.insert(inner, "i", SymbolKind::Variable, vec![TypeCode::Int]);

        let table = scopes.to_string();
        assert!(table.contains("i          | var     | int"));
    }
}
