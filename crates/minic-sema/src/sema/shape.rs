//! Shape helpers over MiniC parse-tree fragments
//!
//! All three passes agree on these, which is what keeps their scope
//! descents aligned: a `clause` either has a body for every pass or for
//! none of them.

use super::scope::TypeCode;
use crate::tree::{NodeId, ParseTree, Production, Terminal};

/// The identifier terminal of a `variable` node, unwrapping nested
/// `variable` layers (array forms like `a[i]` nest the bare name)
pub(crate) fn variable_ident(tree: &ParseTree, var: NodeId) -> Option<NodeId> {
    let first = *tree.children(var).first()?;
    if matches!(tree.terminal_of(first), Some(Terminal::Ident(_))) {
        return Some(first);
    }
    if tree.is_production(first, Production::Variable) {
        return variable_ident(tree, first);
    }
    None
}

/// The identifier text of a `variable` node
pub(crate) fn variable_name(tree: &ParseTree, var: NodeId) -> Option<&str> {
    match tree.terminal_of(variable_ident(tree, var)?) {
        Some(Terminal::Ident(name)) => Some(name),
        _ => None,
    }
}

/// The type keyword under a `type` production node
pub(crate) fn declared_type(tree: &ParseTree, type_node: NodeId) -> TypeCode {
    let Some(&keyword) = tree.children(type_node).first() else {
        return TypeCode::Unknown;
    };
    match tree.terminal_of(keyword) {
        Some(Terminal::Void) => TypeCode::Void,
        Some(Terminal::Int) => TypeCode::Int,
        Some(Terminal::Float) => TypeCode::Float,
        _ => TypeCode::Unknown,
    }
}

/// Whether a `clause` node syntactically contains a body section; only then
/// does it introduce a scope
pub(crate) fn clause_has_body(tree: &ParseTree, clause: NodeId) -> bool {
    tree.children(clause)
        .iter()
        .any(|&child| tree.is_production(child, Production::Body))
}

/// The index subexpression of a subscripted `variable` node (`a[expr]`);
/// `None` for bare names and empty subscripts (`a[]` in declarations)
pub(crate) fn array_index(tree: &ParseTree, var: NodeId) -> Option<NodeId> {
    let kids = tree.children(var);
    if tree.terminal_of(*kids.get(1)?) != Some(&Terminal::LBracket) {
        return None;
    }
    let index = *kids.get(2)?;
    if tree.terminal_of(index) == Some(&Terminal::RBracket) {
        return None;
    }
    Some(index)
}
