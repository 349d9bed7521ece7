//! Semantic analysis: three passes over one parse tree
//!
//! 1. [`ScopeTreeBuilder`] constructs the scope tree and its symbols.
//! 2. [`ScopeResolver`] re-walks the parse tree and flags undefined
//!    variable references.
//! 3. [`TypeChecker`] re-walks it again, inferring expression types and
//!    flagging incompatibilities.
//!
//! The parse tree is read-only throughout; the scope tree is mutated only
//! by the builder. Passes 2 and 3 each own a fresh [`ScopeCursor`] so they
//! revisit the builder's child scopes in creation order without sharing
//! traversal state.

mod builder;
mod resolver;
mod scope;
mod shape;
mod types;

pub use builder::ScopeTreeBuilder;
pub use resolver::ScopeResolver;
pub use scope::{NameId, ScopeCursor, ScopeId, ScopeTree, Symbol, SymbolKind, TypeCode};
pub use types::{infer_type, TypeChecker, TypeError};

use crate::common::{AnalyzeError, AnalyzeResult};
use crate::tree::ParseTree;

/// Result of a full analysis run
///
/// Empty error collections are the sole success signal; the scope tree is
/// valid and printable either way.
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
    /// Malformed declaration shapes found during construction
    pub construction_errors: Vec<AnalyzeError>,
    /// Distinct undefined identifier names, in first-occurrence order
    pub undefined: Vec<String>,
    /// Type incompatibilities, in traversal order, not deduplicated
    pub type_errors: Vec<TypeError>,
}

impl Analysis {
    pub fn is_clean(&self) -> bool {
        self.construction_errors.is_empty()
            && self.undefined.is_empty()
            && self.type_errors.is_empty()
    }

    /// Formatted type-error messages in discovery order
    pub fn type_error_messages(&self) -> Vec<String> {
        self.type_errors.iter().map(ToString::to_string).collect()
    }
}

/// Run all three passes over `tree`
///
/// Semantic problems land in the [`Analysis`] collections; the only hard
/// error is a scope-cursor desynchronization, which means the parse tree
/// changed between passes.
pub fn analyze(tree: &ParseTree) -> AnalyzeResult<Analysis> {
    let (scopes, construction_errors) = ScopeTreeBuilder::build(tree);
    let undefined = ScopeResolver::run(tree, &scopes)?;
    let type_errors = TypeChecker::run(tree, &scopes)?;
    Ok(Analysis {
        scopes,
        construction_errors,
        undefined,
        type_errors,
    })
}
